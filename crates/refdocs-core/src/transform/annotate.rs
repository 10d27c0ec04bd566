use serde_json::{Map, Value, json};

use crate::config::{BaseUrls, Environment, RefdocsConfig, SdkConfig, ServiceDescriptor};
use crate::transform::samples::{SampleGenerator, main_path_segment};
use crate::transform::servers::build_servers;

/// Vendor extension holding per-operation usage snippets.
pub const CODE_SAMPLES_KEY: &str = "x-codeSamples";

/// Vendor extension on `info` listing SDK install commands.
pub const SDK_INSTALLATION_KEY: &str = "x-scalar-sdk-installation";

/// Path item keys that hold operations.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace", "query",
];

/// Receives every operation object found under `paths`.
pub trait OperationVisitor {
    fn visit_operation(&mut self, path: &str, method: &str, operation: &mut Map<String, Value>);
}

/// Walk `paths → path → method → operation`, calling the visitor for each
/// operation object. Entries that aren't objects are skipped.
pub fn walk_operations<V: OperationVisitor>(document: &mut Value, visitor: &mut V) {
    let Some(paths) = document.get_mut("paths").and_then(Value::as_object_mut) else {
        return;
    };

    for (path, path_item) in paths.iter_mut() {
        let Some(path_item) = path_item.as_object_mut() else {
            continue;
        };
        for (method, operation) in path_item.iter_mut() {
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            if let Some(operation) = operation.as_object_mut() {
                visitor.visit_operation(path, method, operation);
            }
        }
    }
}

/// Attaches servers, code samples and SDK installation metadata to documents.
pub struct Annotator {
    env: Environment,
    base_urls: BaseUrls,
    sdk: SdkConfig,
    samples: SampleGenerator,
}

impl Annotator {
    pub fn new(env: Environment, base_urls: BaseUrls, sdk: SdkConfig) -> Self {
        let samples = SampleGenerator::new(sdk.clone());
        Self {
            env,
            base_urls,
            sdk,
            samples,
        }
    }

    pub fn from_config(env: Environment, config: &RefdocsConfig) -> Self {
        Self::new(env, config.base_urls.clone(), config.sdk.clone())
    }

    pub fn environment(&self) -> Environment {
        self.env
    }

    /// Annotate `document` in place for `service` and return it for chaining.
    ///
    /// Operations without an `operationId` are left untouched. A document
    /// with no `paths` only gets the installation metadata.
    pub fn annotate<'a>(
        &self,
        document: &'a mut Value,
        service: &ServiceDescriptor,
    ) -> &'a mut Value {
        let Some(root) = document.as_object_mut() else {
            log::warn!(
                "{}: document is not a JSON object, skipping annotation",
                service.service
            );
            return document;
        };

        let info = root
            .entry("info")
            .or_insert_with(|| Value::Object(Map::new()));
        if !info.is_object() {
            *info = Value::Object(Map::new());
        }
        if let Some(info) = info.as_object_mut() {
            info.insert(SDK_INSTALLATION_KEY.to_string(), self.installation_entries());
        }

        let mut visitor = SampleVisitor {
            annotator: self,
            service,
            servers: None,
            annotated: 0,
        };
        walk_operations(document, &mut visitor);

        let SampleVisitor {
            servers, annotated, ..
        } = visitor;
        if let (Some(servers), Some(root)) = (servers, document.as_object_mut()) {
            root.insert("servers".to_string(), servers);
        }

        log::debug!(
            "{}: annotated {} operations ({})",
            service.service,
            annotated,
            self.env
        );
        document
    }

    fn installation_entries(&self) -> Value {
        json!([
            {
                "lang": "Python",
                "description": "Install our **Python SDK** from PyPI:",
                "source": format!("pip install {}", self.sdk.python_package),
            },
            {
                "lang": "Node",
                "description": "Install our **TypeScript/JavaScript SDK** from npm:",
                "source": format!("npm install {}", self.sdk.npm_package),
            },
        ])
    }
}

struct SampleVisitor<'a> {
    annotator: &'a Annotator,
    service: &'a ServiceDescriptor,
    /// Computed on the first identified operation, then reused.
    servers: Option<Value>,
    annotated: usize,
}

impl OperationVisitor for SampleVisitor<'_> {
    fn visit_operation(&mut self, path: &str, _method: &str, operation: &mut Map<String, Value>) {
        let operation_id = match operation.get("operationId").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return,
        };

        if self.servers.is_none() {
            let servers = build_servers(
                &self.service.path_prefix(),
                self.annotator.env,
                &self.annotator.base_urls,
            );
            self.servers = Some(json!(servers));
        }

        let samples = self.annotator.samples.build_samples(
            &self.service.service,
            main_path_segment(path),
            &operation_id,
        );

        let existing = operation
            .entry(CODE_SAMPLES_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));
        if !existing.is_array() {
            log::warn!(
                "{}: replacing non-array {} on {}",
                self.service.service,
                CODE_SAMPLES_KEY,
                operation_id
            );
            *existing = Value::Array(Vec::new());
        }
        if let Some(list) = existing.as_array_mut() {
            list.extend(samples.iter().map(|sample| json!(sample)));
        }
        self.annotated += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotator(env: Environment) -> Annotator {
        Annotator::new(env, BaseUrls::default(), SdkConfig::default())
    }

    fn trade() -> ServiceDescriptor {
        ServiceDescriptor::new("trade", "Trading API", "v1")
    }

    #[derive(Default)]
    struct Collect(Vec<(String, String)>);

    impl OperationVisitor for Collect {
        fn visit_operation(&mut self, path: &str, method: &str, _op: &mut Map<String, Value>) {
            self.0.push((path.to_string(), method.to_string()));
        }
    }

    #[test]
    fn test_walk_skips_non_operation_keys() {
        let mut doc = json!({
            "paths": {
                "/a": {
                    "summary": "A",
                    "parameters": [{"name": "x"}],
                    "servers": [],
                    "get": {},
                    "post": {}
                },
                "/b": "not an object",
                "/c": { "delete": null, "patch": {} }
            }
        });
        let mut collect = Collect::default();
        walk_operations(&mut doc, &mut collect);
        assert_eq!(
            collect.0,
            vec![
                ("/a".to_string(), "get".to_string()),
                ("/a".to_string(), "post".to_string()),
                ("/c".to_string(), "patch".to_string()),
            ]
        );
    }

    #[test]
    fn test_annotate_operation_with_id() {
        let mut doc = json!({
            "paths": { "/orders/{id}": { "get": { "operationId": "getOrderById" } } }
        });
        annotator(Environment::Prod).annotate(&mut doc, &trade());

        let samples = doc["paths"]["/orders/{id}"]["get"][CODE_SAMPLES_KEY]
            .as_array()
            .unwrap();
        assert_eq!(samples.len(), 3);
        assert!(
            samples[0]["source"]
                .as_str()
                .unwrap()
                .contains("client.trade.orders.get_order_by_id(")
        );
        assert_eq!(
            doc["servers"],
            json!([{ "url": "https://api.crypticorn.com/v1/trade", "description": "Production" }])
        );
    }

    #[test]
    fn test_operation_without_id_is_skipped() {
        let mut doc = json!({ "paths": { "/": { "get": {} } } });
        annotator(Environment::Dev).annotate(&mut doc, &trade());
        assert!(doc["paths"]["/"]["get"].get(CODE_SAMPLES_KEY).is_none());
        assert!(doc.get("servers").is_none());
    }

    #[test]
    fn test_empty_operation_id_is_skipped() {
        let mut doc = json!({ "paths": { "/x": { "get": { "operationId": "" } } } });
        annotator(Environment::Dev).annotate(&mut doc, &trade());
        assert!(doc["paths"]["/x"]["get"].get(CODE_SAMPLES_KEY).is_none());
    }

    #[test]
    fn test_missing_paths_still_injects_installation() {
        let mut doc = json!({ "openapi": "3.1.0" });
        annotator(Environment::Prod).annotate(&mut doc, &trade());
        let install = doc["info"][SDK_INSTALLATION_KEY].as_array().unwrap();
        assert_eq!(install.len(), 2);
        assert_eq!(install[0]["source"], "pip install crypticorn");
        assert_eq!(install[1]["lang"], "Node");
        assert_eq!(install[1]["source"], "npm install @crypticorn-ai/api-client");
    }

    #[test]
    fn test_info_fields_are_kept() {
        let mut doc = json!({ "info": { "title": "Trading API", "version": "1.0.0" } });
        annotator(Environment::Prod).annotate(&mut doc, &trade());
        assert_eq!(doc["info"]["title"], "Trading API");
        assert!(doc["info"][SDK_INSTALLATION_KEY].is_array());
    }

    #[test]
    fn test_existing_samples_are_preserved_and_appended() {
        let mut doc = json!({
            "paths": { "/bots": { "post": {
                "operationId": "create_bot",
                "x-codeSamples": [{ "label": "curl", "lang": "Shell", "source": "curl ..." }]
            } } }
        });
        annotator(Environment::Local).annotate(&mut doc, &trade());
        let samples = doc["paths"]["/bots"]["post"][CODE_SAMPLES_KEY]
            .as_array()
            .unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0]["label"], "curl");
        assert_eq!(samples[1]["label"], "Python Sync SDK");
        assert_eq!(samples[3]["label"], "TypeScript SDK");
        assert!(
            samples[3]["source"]
                .as_str()
                .unwrap()
                .contains("client.trade.createBot(...args)")
        );
    }

    #[test]
    fn test_root_path_uses_status_segment() {
        let mut doc = json!({ "paths": { "/": { "get": { "operationId": "ping" } } } });
        annotator(Environment::Local).annotate(&mut doc, &trade());
        let source = doc["paths"]["/"]["get"][CODE_SAMPLES_KEY][0]["source"]
            .as_str()
            .unwrap();
        assert!(source.contains("client.trade.status.ping("));
        assert_eq!(doc["servers"][0]["description"], "Local");
        assert_eq!(doc["servers"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_duplicate_operation_ids_are_not_deduplicated() {
        let mut doc = json!({
            "paths": {
                "/a": { "get": { "operationId": "list" } },
                "/b": { "get": { "operationId": "list" } }
            }
        });
        annotator(Environment::Prod).annotate(&mut doc, &trade());
        assert_eq!(doc["paths"]["/a"]["get"][CODE_SAMPLES_KEY].as_array().unwrap().len(), 3);
        assert_eq!(doc["paths"]["/b"]["get"][CODE_SAMPLES_KEY].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_non_object_document_is_returned_unchanged() {
        let mut doc = json!(["not", "a", "document"]);
        let before = doc.clone();
        annotator(Environment::Prod).annotate(&mut doc, &trade());
        assert_eq!(doc, before);
    }
}
