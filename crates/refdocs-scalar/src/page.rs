use minijinja::{Environment, context};
use refdocs_core::config::{OperationsSorter, RendererConfig};
use refdocs_core::{AnnotatedDocument, GeneratedFile};
use serde_json::{Map, Value, json};

use crate::error::RenderError;
use crate::sources::{ReferenceSource, build_sources};

pub const SCALAR_CDN_URL: &str = "https://cdn.jsdelivr.net/npm/@scalar/api-reference";

/// JavaScript value for Scalar's `operationsSorter` option.
///
/// `IdentifierLength` orders by the character length of the `operationId`,
/// shortest first, which keeps simple operations ahead of complex ones.
pub fn operations_sorter_js(sorter: OperationsSorter) -> &'static str {
    match sorter {
        OperationsSorter::IdentifierLength => {
            "(a, b) => operationId(a).length - operationId(b).length"
        }
        OperationsSorter::Alpha => "\"alpha\"",
        OperationsSorter::Method => "\"method\"",
    }
}

/// Static HTML host page that loads the Scalar API reference with all sources.
pub struct ScalarPage {
    pub title: String,
    pub renderer: RendererConfig,
    pub cdn_url: String,
}

impl ScalarPage {
    pub fn new(title: impl Into<String>, renderer: RendererConfig) -> Self {
        Self {
            title: title.into(),
            renderer,
            cdn_url: SCALAR_CDN_URL.to_string(),
        }
    }

    /// Renderer configuration, minus the sorter (a JS function, not JSON).
    pub fn config(&self, sources: &[ReferenceSource]) -> Value {
        let mut config = Map::new();
        config.insert("sources".to_string(), json!(sources));
        if let Some(ref scheme) = self.renderer.preferred_security_scheme {
            config.insert(
                "authentication".to_string(),
                json!({ "preferredSecurityScheme": scheme }),
            );
        }
        config.insert(
            "hideClientButton".to_string(),
            Value::Bool(self.renderer.hide_client_button),
        );
        Value::Object(config)
    }

    /// Render `index.html` for the given sources.
    pub fn render(&self, sources: &[ReferenceSource]) -> Result<String, RenderError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template("index.html.j2", include_str!("../templates/index.html.j2"))?;
        let tmpl = env.get_template("index.html.j2")?;

        let config = serde_json::to_string(&self.config(sources)).map_err(RenderError::Config)?;

        let html = tmpl.render(context! {
            title => &self.title,
            cdn_url => &self.cdn_url,
            config => script_safe(&config),
            operations_sorter => operations_sorter_js(self.renderer.operations_sorter),
        })?;
        Ok(html)
    }

    /// `index.html` plus each annotated document under `openapi/`.
    pub fn emit(&self, documents: &[AnnotatedDocument]) -> Result<Vec<GeneratedFile>, RenderError> {
        let sources = build_sources(documents)?;
        let mut files = vec![GeneratedFile {
            path: "index.html".to_string(),
            content: self.render(&sources)?,
        }];

        for doc in documents {
            let content = serde_json::to_string_pretty(&doc.document).map_err(|source| {
                RenderError::Serialize {
                    service: doc.service.service.clone(),
                    source,
                }
            })?;
            files.push(GeneratedFile {
                path: format!("openapi/{}.json", doc.service.service),
                content,
            });
        }

        log::debug!("rendered {} sources into {}", sources.len(), files[0].path);
        Ok(files)
    }
}

/// Escape `<` so embedded JSON can't close the surrounding `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
}
