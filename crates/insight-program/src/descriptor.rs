//! Single-source descriptor parsing.

use crate::loader::{DescriptorSource, load_raw};
use crate::normalize::normalize_program;
use crate::options::InsightOptions;
use insight_rules::{Diagnostics, Failure, Normalized, Warning};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw and normalized views of one JSON source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub raw: Value,
    pub normalized: Map<String, Value>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    #[serde(default)]
    pub errors: Vec<Failure>,
}

impl Descriptor {
    fn empty() -> Self {
        Self {
            raw: Value::Object(Map::new()),
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Warnings and errors as one accumulator.
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            warnings: self.warnings.clone(),
            errors: self.errors.clone(),
        }
    }

    fn apply(&mut self, result: Normalized) {
        self.normalized = result.normalized;
        self.warnings = result.diagnostics.warnings;
        self.errors = result.diagnostics.errors;
    }
}

/// Re-run the program rules over `descriptor.raw`, replacing `normalized`,
/// `warnings` and `errors`.
pub fn normalize(source_path: Option<&str>, descriptor: &mut Descriptor, options: &InsightOptions) {
    let result = normalize_program(source_path, &descriptor.raw, options);
    descriptor.apply(result);
}

/// Load and normalize one descriptor.
///
/// A missing file is an empty descriptor. Read and JSON failures are recorded
/// in `errors` rather than returned.
pub async fn parse_descriptor(
    source: impl Into<DescriptorSource>,
    options: &InsightOptions,
) -> Descriptor {
    let source = source.into();
    parse_existing(&source, options)
        .await
        .unwrap_or_else(Descriptor::empty)
}

/// Like [`parse_descriptor`], but `None` when a path source does not exist.
pub(crate) async fn parse_existing(
    source: &DescriptorSource,
    options: &InsightOptions,
) -> Option<Descriptor> {
    let raw = match load_raw(source, options.root_path.as_deref()).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(error) => {
            let mut descriptor = Descriptor::empty();
            descriptor
                .errors
                .push(Failure::from_error(error.stage(), &error));
            return Some(descriptor);
        }
    };
    let mut descriptor = Descriptor {
        raw,
        ..Descriptor::default()
    };
    normalize(source.path(), &mut descriptor, options);
    Some(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn in_memory_source_needs_no_io() {
        let options = InsightOptions::default().with_root_path("/definitely/not/here");
        let descriptor =
            parse_descriptor(json!({"name": "app", "extra": 1}), &options).await;
        assert_eq!(descriptor.raw, json!({"name": "app", "extra": 1}));
        assert_eq!(Value::Object(descriptor.normalized), json!({"name": "app"}));
        assert_eq!(descriptor.warnings.len(), 1);
        assert_eq!(descriptor.warnings[0].message, "Property 'extra' was ignored");
        assert!(descriptor.errors.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_descriptor() {
        let options = InsightOptions::default().with_root_path("/definitely/not/here");
        let descriptor = parse_descriptor("program.json", &options).await;
        assert_eq!(descriptor.raw, json!({}));
        assert!(descriptor.normalized.is_empty());
        assert!(descriptor.warnings.is_empty());
        assert!(!descriptor.has_errors());
    }

    #[tokio::test]
    async fn non_object_value_is_a_normalize_failure() {
        let descriptor = parse_descriptor(json!([1, 2]), &InsightOptions::default()).await;
        assert_eq!(descriptor.errors.len(), 1);
        assert_eq!(descriptor.errors[0].stage, "normalize");
        assert_eq!(
            descriptor.errors[0].message,
            "descriptor must be a JSON object, found array"
        );
    }

    #[test]
    fn renormalizing_is_idempotent() {
        let options = InsightOptions::default();
        let mut descriptor = Descriptor {
            raw: json!({"package": "./pkg", "mappings": {"a": "a"}}),
            ..Descriptor::default()
        };
        normalize(None, &mut descriptor, &options);
        let first = descriptor.normalized.clone();
        let mut again = Descriptor {
            raw: descriptor.raw.clone(),
            ..Descriptor::default()
        };
        normalize(None, &mut again, &options);
        assert_eq!(first, again.normalized);
        assert_eq!(descriptor.warnings, again.warnings);
    }

    #[test]
    fn normalizing_the_same_descriptor_twice_replaces_diagnostics() {
        let options = InsightOptions::default();
        let mut descriptor = Descriptor {
            raw: json!({"name": "app", "scripts": {}, "mappings": {"a": 3}}),
            ..Descriptor::default()
        };
        normalize(None, &mut descriptor, &options);
        let first = descriptor.clone();
        normalize(None, &mut descriptor, &options);
        assert_eq!(descriptor, first);
        assert_eq!(descriptor.warnings.len(), 1);
        assert_eq!(descriptor.errors.len(), 1);
    }

    #[test]
    fn descriptor_serializes_camel_case_without_empty_context() {
        let descriptor = Descriptor {
            raw: json!({}),
            normalized: Map::new(),
            warnings: vec![Warning::new("normalize", "Property 'x' was ignored")],
            errors: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&descriptor).expect("descriptor serializes"),
            json!({
                "raw": {},
                "normalized": {},
                "warnings": [{"stage": "normalize", "message": "Property 'x' was ignored"}],
                "errors": []
            })
        );
    }
}
