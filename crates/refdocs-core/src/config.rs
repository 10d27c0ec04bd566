use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level project configuration loaded from `.refdocs.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefdocsConfig {
    /// Raw environment selector. Validated by [`resolve_environment`].
    pub env: Option<String>,
    pub output: String,
    pub base_urls: BaseUrls,
    pub services: Vec<ServiceDescriptor>,
    pub sdk: SdkConfig,
    pub renderer: RendererConfig,
    pub fetch: FetchConfig,
}

impl Default for RefdocsConfig {
    fn default() -> Self {
        Self {
            env: None,
            output: "dist".to_string(),
            base_urls: BaseUrls::default(),
            services: default_services(),
            sdk: SdkConfig::default(),
            renderer: RendererConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

/// Deployment context controlling which server URLs are exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Dev,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Local, Environment::Dev, Environment::Prod];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }

    /// Human-readable label used as the server description.
    pub fn description(self) -> &'static str {
        match self {
            Environment::Local => "Local",
            Environment::Dev => "Development",
            Environment::Prod => "Production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "local" => Ok(Environment::Local),
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Pick the environment: an explicit selector (CLI flag or env var) wins over
/// the config file. Having neither is an error, never a default.
pub fn resolve_environment(
    selector: Option<&str>,
    config: &RefdocsConfig,
) -> Result<Environment, ConfigError> {
    match selector.or(config.env.as_deref()) {
        Some(raw) => raw.parse(),
        None => Err(ConfigError::MissingEnvironment),
    }
}

/// Base URL of each deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BaseUrls {
    pub local: String,
    pub dev: String,
    pub prod: String,
}

impl BaseUrls {
    pub fn get(&self, env: Environment) -> &str {
        match env {
            Environment::Local => &self.local,
            Environment::Dev => &self.dev,
            Environment::Prod => &self.prod,
        }
    }
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self {
            local: "http://localhost".to_string(),
            dev: "https://api.crypticorn.dev".to_string(),
            prod: "https://api.crypticorn.com".to_string(),
        }
    }
}

/// One backend API whose OpenAPI document is aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub service: String,
    pub title: String,
    #[serde(default = "default_version")]
    pub version: String,
}

impl ServiceDescriptor {
    pub fn new(service: &str, title: &str, version: &str) -> Self {
        Self {
            service: service.to_string(),
            title: title.to_string(),
            version: version.to_string(),
        }
    }

    /// `/{version}/{service}`, the prefix shared by the document URL and the server URLs.
    pub fn path_prefix(&self) -> String {
        format!("/{}/{}", self.version, self.service)
    }

    pub fn document_url(&self, base_url: &str) -> String {
        format!(
            "{}{}/openapi.json",
            base_url.trim_end_matches('/'),
            self.path_prefix()
        )
    }
}

fn default_version() -> String {
    "v1".to_string()
}

/// The service registry used when the config file doesn't list any.
pub fn default_services() -> Vec<ServiceDescriptor> {
    vec![
        ServiceDescriptor::new("hive", "Hive AI API", "v1"),
        ServiceDescriptor::new("klines", "Klines API", "v1"),
        ServiceDescriptor::new("metrics", "Metrics API", "v1"),
        ServiceDescriptor::new("trade", "Trading API", "v1"),
        ServiceDescriptor::new("pay", "Payment API", "v1"),
        ServiceDescriptor::new("auth", "Auth API", "v1"),
    ]
}

/// Client libraries named in code samples and installation instructions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub python_package: String,
    pub npm_package: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            python_package: "crypticorn".to_string(),
            npm_package: "@crypticorn-ai/api-client".to_string(),
        }
    }
}

/// Options passed through to the API reference renderer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub preferred_security_scheme: Option<String>,
    pub operations_sorter: OperationsSorter,
    pub hide_client_button: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            preferred_security_scheme: Some("HTTPBearer".to_string()),
            operations_sorter: OperationsSorter::IdentifierLength,
            hide_client_button: true,
        }
    }
}

/// How operations are ordered inside each tag of the rendered reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationsSorter {
    /// Shortest `operationId` first.
    #[default]
    IdentifierLength,
    Alpha,
    Method,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout. No timeout when unset.
    pub timeout_secs: Option<u64>,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".refdocs.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<RefdocsConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RefdocsConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# refdocs configuration
# env: dev              # local | dev | prod (or pass --env / set REFDOCS_API_ENV)
output: dist

base_urls:
  local: http://localhost
  dev: https://api.crypticorn.dev
  prod: https://api.crypticorn.com

services:
  - { service: hive, title: Hive AI API, version: v1 }
  - { service: klines, title: Klines API, version: v1 }
  - { service: metrics, title: Metrics API, version: v1 }
  - { service: trade, title: Trading API, version: v1 }
  - { service: pay, title: Payment API, version: v1 }
  - { service: auth, title: Auth API, version: v1 }

sdk:
  python_package: crypticorn
  npm_package: "@crypticorn-ai/api-client"

renderer:
  preferred_security_scheme: HTTPBearer
  operations_sorter: identifier_length   # identifier_length | alpha | method
  hide_client_button: true

fetch: {}                # e.g. { timeout_secs: 10 }
"#
}
