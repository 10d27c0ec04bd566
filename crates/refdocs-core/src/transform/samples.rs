use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

use crate::config::SdkConfig;
use crate::transform::casing::{to_camel_case, to_snake_case};

/// Fallback client namespace for operations mounted at the service root.
pub const ROOT_PATH_SEGMENT: &str = "status";

/// A language-tagged usage snippet shown next to an operation (`x-codeSamples`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSample {
    pub label: String,
    pub lang: String,
    pub source: String,
}

/// A client library a sample is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleTarget {
    PythonSync,
    PythonAsync,
    TypeScript,
}

impl SampleTarget {
    /// Display order in the rendered reference.
    pub const ALL: [SampleTarget; 3] = [
        SampleTarget::PythonSync,
        SampleTarget::PythonAsync,
        SampleTarget::TypeScript,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SampleTarget::PythonSync => "Python Sync SDK",
            SampleTarget::PythonAsync => "Python Async SDK",
            SampleTarget::TypeScript => "TypeScript SDK",
        }
    }

    pub fn lang(self) -> &'static str {
        match self {
            SampleTarget::PythonSync | SampleTarget::PythonAsync => "Python",
            SampleTarget::TypeScript => "TypeScript",
        }
    }

    fn template_name(self) -> &'static str {
        match self {
            SampleTarget::PythonSync => "python_sync.py.j2",
            SampleTarget::PythonAsync => "python_async.py.j2",
            SampleTarget::TypeScript => "typescript.ts.j2",
        }
    }

    /// Method name as the target client library spells it.
    fn method_name(self, operation_id: &str) -> String {
        match self {
            SampleTarget::PythonSync | SampleTarget::PythonAsync => to_snake_case(operation_id),
            SampleTarget::TypeScript => to_camel_case(operation_id),
        }
    }
}

/// First non-empty segment of an operation path, e.g. `/orders/{id}` → `orders`.
pub fn main_path_segment(path: &str) -> &str {
    path.split('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(ROOT_PATH_SEGMENT)
}

/// Renders code samples from the bundled templates.
pub struct SampleGenerator {
    env: Environment<'static>,
    sdk: SdkConfig,
}

impl SampleGenerator {
    pub fn new(sdk: SdkConfig) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_template(
            "python_sync.py.j2",
            include_str!("../../templates/python_sync.py.j2"),
        )
        .expect("template should be valid");
        env.add_template(
            "python_async.py.j2",
            include_str!("../../templates/python_async.py.j2"),
        )
        .expect("template should be valid");
        env.add_template(
            "typescript.ts.j2",
            include_str!("../../templates/typescript.ts.j2"),
        )
        .expect("template should be valid");
        Self { env, sdk }
    }

    /// Build the sync, async and typed samples for one operation, in display order.
    pub fn build_samples(
        &self,
        service_root: &str,
        main_path: &str,
        operation_id: &str,
    ) -> Vec<CodeSample> {
        SampleTarget::ALL
            .into_iter()
            .map(|target| CodeSample {
                label: target.label().to_string(),
                lang: target.lang().to_string(),
                source: self.render(target, service_root, main_path, operation_id),
            })
            .collect()
    }

    fn render(
        &self,
        target: SampleTarget,
        service_root: &str,
        main_path: &str,
        operation_id: &str,
    ) -> String {
        let tmpl = self
            .env
            .get_template(target.template_name())
            .expect("template should be registered");
        tmpl.render(context! {
            python_package => &self.sdk.python_package,
            npm_package => &self.sdk.npm_package,
            service_root => service_root,
            main_path => main_path,
            method_name => target.method_name(operation_id),
        })
        .expect("render should succeed")
    }
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self::new(SdkConfig::default())
    }
}
