use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize document for `{service}`: {source}")]
    Serialize {
        service: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize renderer config: {0}")]
    Config(#[source] serde_json::Error),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}
