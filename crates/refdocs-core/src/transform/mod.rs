pub mod annotate;
pub mod casing;
pub mod samples;
pub mod servers;

pub use annotate::{Annotator, OperationVisitor, walk_operations};
pub use casing::{to_camel_case, to_snake_case};
pub use samples::{CodeSample, SampleGenerator, main_path_segment};
pub use servers::{ServerEntry, build_servers};
