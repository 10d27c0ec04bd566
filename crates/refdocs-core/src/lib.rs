pub mod config;
pub mod error;
pub mod transform;

pub use config::{Environment, RefdocsConfig, ServiceDescriptor};
pub use transform::{Annotator, CodeSample, ServerEntry};

/// An OpenAPI document that has been fetched and annotated for one service.
#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    pub service: ServiceDescriptor,
    pub document: serde_json::Value,
}

/// A generated file with path and content.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}
