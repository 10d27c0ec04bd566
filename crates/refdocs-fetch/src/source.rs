use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use refdocs_core::ServiceDescriptor;
use serde_json::Value;

use crate::error::FetchError;

/// Where raw OpenAPI documents come from.
pub trait DocumentSource {
    fn fetch(
        &self,
        service: &ServiceDescriptor,
    ) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// Fetches `{base_url}/{version}/{service}/openapi.json` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn document_url(&self, service: &ServiceDescriptor) -> String {
        service.document_url(&self.base_url)
    }
}

impl DocumentSource for HttpSource {
    async fn fetch(&self, service: &ServiceDescriptor) -> Result<Value, FetchError> {
        let url = self.document_url(service);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.clone(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| FetchError::InvalidJson { url, source })
    }
}

/// In-memory documents keyed by service name. Services recorded as
/// unreadable fail with [`FetchError::Unreadable`], services without any entry
/// with [`FetchError::Missing`].
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<String, Value>,
    unreadable: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<service>.json` for each service from `dir`.
    ///
    /// Absent files are skipped; files that can't be read or parsed are kept
    /// as failures carrying the reason.
    pub fn from_dir(dir: &Path, services: &[ServiceDescriptor]) -> Self {
        let mut source = Self::new();
        for service in services {
            let path = dir.join(format!("{}.json", service.service));
            if !path.exists() {
                log::debug!("no document at {}", path.display());
                continue;
            }
            let loaded = fs::read_to_string(&path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))
                .and_then(|content| {
                    serde_json::from_str(&content)
                        .map_err(|e| format!("failed to parse {}: {e}", path.display()))
                });
            source = match loaded {
                Ok(document) => source.with_document(&service.service, document),
                Err(reason) => source.with_failure(&service.service, reason),
            };
        }
        source
    }

    pub fn with_document(mut self, service: &str, document: Value) -> Self {
        self.unreadable.remove(service);
        self.documents.insert(service.to_string(), document);
        self
    }

    pub fn with_failure(mut self, service: &str, reason: impl Into<String>) -> Self {
        self.documents.remove(service);
        self.unreadable.insert(service.to_string(), reason.into());
        self
    }
}

impl DocumentSource for StaticSource {
    async fn fetch(&self, service: &ServiceDescriptor) -> Result<Value, FetchError> {
        if let Some(document) = self.documents.get(&service.service) {
            return Ok(document.clone());
        }
        Err(match self.unreadable.get(&service.service) {
            Some(reason) => FetchError::Unreadable {
                service: service.service.clone(),
                reason: reason.clone(),
            },
            None => FetchError::Missing {
                service: service.service.clone(),
            },
        })
    }
}
