use futures::future::join_all;
use refdocs_core::{AnnotatedDocument, Annotator, ServiceDescriptor};
use serde_json::Value;

use crate::error::{AggregateError, FetchError};
use crate::source::DocumentSource;

/// A service whose document could not be loaded this run.
#[derive(Debug)]
pub struct FetchFailure {
    pub service: ServiceDescriptor,
    pub error: FetchError,
}

/// Outcome of a run with at least one successful service.
#[derive(Debug)]
pub struct AggregateReport {
    /// Annotated documents in registry order.
    pub documents: Vec<AnnotatedDocument>,
    pub failures: Vec<FetchFailure>,
}

/// Fetches and annotates one document per configured service.
pub struct Aggregator<S> {
    services: Vec<ServiceDescriptor>,
    annotator: Annotator,
    source: S,
}

impl<S: DocumentSource> Aggregator<S> {
    pub fn new(services: Vec<ServiceDescriptor>, annotator: Annotator, source: S) -> Self {
        Self {
            services,
            annotator,
            source,
        }
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    /// Fetch every service concurrently and annotate each success.
    ///
    /// Returns exactly one outcome per service, in registry order.
    pub async fn fetch_all(&self) -> Vec<(ServiceDescriptor, Result<Value, FetchError>)> {
        let pending = self.services.iter().map(|service| async move {
            let outcome = self.fetch_one(service).await;
            (service.clone(), outcome)
        });
        join_all(pending).await
    }

    async fn fetch_one(&self, service: &ServiceDescriptor) -> Result<Value, FetchError> {
        let mut document = self.source.fetch(service).await?;
        if !document.is_object() {
            return Err(FetchError::NotAnObject {
                service: service.service.clone(),
            });
        }
        self.annotator.annotate(&mut document, service);
        Ok(document)
    }

    /// Fetch everything and split successes from failures.
    ///
    /// Each failure is logged as a warning. Fails only when nothing succeeded.
    pub async fn aggregate(&self) -> Result<AggregateReport, AggregateError> {
        if self.services.is_empty() {
            log::error!("no services configured, nothing to render");
            return Err(AggregateError::NoServices);
        }

        let mut documents = Vec::new();
        let mut failures = Vec::new();
        for (service, outcome) in self.fetch_all().await {
            match outcome {
                Ok(document) => documents.push(AnnotatedDocument { service, document }),
                Err(error) => {
                    log::warn!("skipping {} ({}): {}", service.title, service.service, error);
                    failures.push(FetchFailure { service, error });
                }
            }
        }

        if documents.is_empty() {
            log::error!(
                "failed to load any of the {} API documents, nothing to render",
                failures.len()
            );
            return Err(AggregateError::AllFailed {
                attempted: failures.len(),
            });
        }

        log::info!(
            "loaded {} of {} API documents ({})",
            documents.len(),
            self.services.len(),
            self.annotator.environment()
        );
        Ok(AggregateReport {
            documents,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use futures::executor::block_on;
    use refdocs_core::config::{BaseUrls, Environment, SdkConfig};
    use serde_json::json;

    fn services() -> Vec<ServiceDescriptor> {
        vec![
            ServiceDescriptor::new("hive", "Hive AI API", "v1"),
            ServiceDescriptor::new("trade", "Trading API", "v1"),
            ServiceDescriptor::new("pay", "Payment API", "v1"),
        ]
    }

    fn annotator() -> Annotator {
        Annotator::new(Environment::Prod, BaseUrls::default(), SdkConfig::default())
    }

    fn doc(operation_id: &str) -> Value {
        json!({ "paths": { "/items": { "get": { "operationId": operation_id } } } })
    }

    #[test]
    fn test_one_outcome_per_service_in_order() {
        let source = StaticSource::new()
            .with_document("hive", doc("listItems"))
            .with_document("pay", doc("listPayments"));
        let aggregator = Aggregator::new(services(), annotator(), source);

        let outcomes = block_on(aggregator.fetch_all());
        let names: Vec<&str> = outcomes.iter().map(|(s, _)| s.service.as_str()).collect();
        assert_eq!(names, vec!["hive", "trade", "pay"]);
        assert!(outcomes[0].1.is_ok());
        assert!(matches!(outcomes[1].1, Err(FetchError::Missing { .. })));
        assert!(outcomes[2].1.is_ok());
    }

    #[test]
    fn test_partial_failure_is_isolated() {
        let source = StaticSource::new()
            .with_document("hive", doc("listItems"))
            .with_document("pay", doc("listPayments"));
        let aggregator = Aggregator::new(services(), annotator(), source);

        let report = block_on(aggregator.aggregate()).unwrap();
        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].service.service, "trade");

        let pay = &report.documents[1];
        assert_eq!(pay.service.service, "pay");
        assert_eq!(
            pay.document["servers"][0]["url"],
            "https://api.crypticorn.com/v1/pay"
        );
        assert_eq!(
            pay.document["paths"]["/items"]["get"]["x-codeSamples"]
                .as_array()
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn test_all_failed() {
        let aggregator = Aggregator::new(services(), annotator(), StaticSource::new());
        let err = block_on(aggregator.aggregate()).unwrap_err();
        assert!(matches!(err, AggregateError::AllFailed { attempted: 3 }));
    }

    #[test]
    fn test_no_services() {
        let aggregator = Aggregator::new(Vec::new(), annotator(), StaticSource::new());
        let err = block_on(aggregator.aggregate()).unwrap_err();
        assert!(matches!(err, AggregateError::NoServices));
    }

    #[test]
    fn test_non_object_document_is_a_failure() {
        let source = StaticSource::new()
            .with_document("hive", json!("openapi"))
            .with_document("trade", doc("getOrders"));
        let aggregator = Aggregator::new(services()[..2].to_vec(), annotator(), source);

        let report = block_on(aggregator.aggregate()).unwrap();
        assert_eq!(report.documents.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            FetchError::NotAnObject { ref service } if service == "hive"
        ));
    }

    #[test]
    fn test_unreadable_document_reports_reason() {
        let source = StaticSource::new()
            .with_document("hive", doc("listItems"))
            .with_failure("trade", "failed to parse trade.json: expected value");
        let aggregator = Aggregator::new(services()[..2].to_vec(), annotator(), source);

        let report = block_on(aggregator.aggregate()).unwrap();
        assert_eq!(report.documents.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.service.service, "trade");
        assert!(matches!(failure.error, FetchError::Unreadable { .. }));
        assert!(failure.error.to_string().contains("failed to parse trade.json"));
    }
}
