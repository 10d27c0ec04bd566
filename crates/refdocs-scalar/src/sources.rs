use refdocs_core::AnnotatedDocument;
use serde::Serialize;

use crate::error::RenderError;

/// One entry of the renderer's `sources` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceSource {
    pub title: String,
    /// The annotated OpenAPI document, serialized to JSON.
    pub content: String,
}

/// Serialize annotated documents into renderer sources, keeping their order.
pub fn build_sources(documents: &[AnnotatedDocument]) -> Result<Vec<ReferenceSource>, RenderError> {
    documents
        .iter()
        .map(|doc| {
            let content =
                serde_json::to_string(&doc.document).map_err(|source| RenderError::Serialize {
                    service: doc.service.service.clone(),
                    source,
                })?;
            Ok(ReferenceSource {
                title: doc.service.title.clone(),
                content,
            })
        })
        .collect()
}
