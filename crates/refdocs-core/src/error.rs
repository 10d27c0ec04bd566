use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown environment `{0}` (expected one of: local, dev, prod)")]
    UnknownEnvironment(String),

    #[error("no environment selected: pass --env, set REFDOCS_API_ENV, or add `env:` to the config")]
    MissingEnvironment,

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}
