pub mod aggregate;
pub mod error;
pub mod source;

pub use aggregate::{AggregateReport, Aggregator, FetchFailure};
pub use error::{AggregateError, FetchError};
pub use source::{DocumentSource, HttpSource, StaticSource};
