pub mod error;
pub mod page;
pub mod sources;

pub use error::RenderError;
pub use page::{ScalarPage, operations_sorter_js};
pub use sources::{ReferenceSource, build_sources};
