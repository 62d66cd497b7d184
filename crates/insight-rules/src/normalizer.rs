//! Rule-table interpreter.

use crate::diagnostic::{Diagnostics, Failure};
use crate::error::{RuleError, value_kind};
use crate::rule::{Rule, RuleContext, RuleKind};
use crate::target::TargetPath;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Stage name used for every diagnostic this module emits.
pub const NORMALIZE_STAGE: &str = "normalize";

/// Result of normalizing one raw object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub normalized: Map<String, Value>,
    /// Raw keys consumed by some rule.
    pub copied: BTreeSet<String>,
    pub diagnostics: Diagnostics,
}

/// Applies rules to one raw object, tracking consumed keys.
#[derive(Debug)]
pub struct Normalizer<'a> {
    raw: &'a Map<String, Value>,
    context: RuleContext<'a>,
    normalized: Map<String, Value>,
    copied: BTreeSet<String>,
    diagnostics: Diagnostics,
}

impl<'a> Normalizer<'a> {
    pub fn new(raw: &'a Map<String, Value>, context: RuleContext<'a>) -> Self {
        Self {
            raw,
            context,
            normalized: Map::new(),
            copied: BTreeSet::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn context(&self) -> &RuleContext<'a> {
        &self.context
    }

    pub fn normalized(&self) -> &Map<String, Value> {
        &self.normalized
    }

    /// Post-passes may rewrite normalized values in place.
    pub fn normalized_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.normalized
    }

    pub fn is_copied(&self, key: &str) -> bool {
        self.copied.contains(key)
    }

    /// Apply every rule in table order, stopping at the first failure.
    pub fn apply_all(&mut self, rules: &[Rule]) -> Result<(), RuleError> {
        rules.iter().try_for_each(|rule| self.apply(rule))
    }

    pub fn apply(&mut self, rule: &Rule) -> Result<(), RuleError> {
        let raw = self.raw;
        let key = rule.source_key;
        let Some(value) = raw.get(key) else {
            if rule.kind == RuleKind::Remove {
                self.consume(key);
            }
            return Ok(());
        };
        let target = rule.target_path();

        match rule.kind {
            RuleKind::String => {
                if value.is_string() {
                    self.write(rule, target, value)?;
                    self.consume(key);
                }
            }
            RuleKind::Array | RuleKind::ArrayToObject => {
                if let Value::Array(items) = value {
                    if !items.is_empty() {
                        self.write(rule, target, value)?;
                    }
                    self.consume(key);
                }
            }
            RuleKind::Object | RuleKind::ObjectToObject => {
                if let Value::Object(entries) = value {
                    if !entries.is_empty() {
                        self.write(rule, target, value)?;
                    }
                    self.consume(key);
                }
            }
            RuleKind::StringToArray => {
                if value.is_string() {
                    self.unshift(rule, target, value)?;
                    self.consume(key);
                }
            }
            RuleKind::AnyToArray => {
                self.unshift(rule, target, value)?;
                self.consume(key);
            }
            RuleKind::BooleanToObject => {
                if value.is_boolean() {
                    self.write(rule, target, value)?;
                    self.consume(key);
                }
            }
            RuleKind::StringToObject => {
                if value.is_string() {
                    self.write(rule, target, value)?;
                    self.consume(key);
                }
            }
            RuleKind::AnyToObject => {
                self.write(rule, target, value)?;
                self.consume(key);
            }
            RuleKind::MergeObjectTo => {
                if let Value::Object(entries) = value {
                    self.merge(rule, target, entries)?;
                    self.consume(key);
                }
            }
            RuleKind::RemoveIfMatch(literal) => {
                if literal.matches(value) {
                    self.consume(key);
                }
            }
            RuleKind::Remove => self.consume(key),
        }
        Ok(())
    }

    /// Warn about every raw key no rule consumed and hand back the result.
    pub fn finish(mut self) -> Normalized {
        for key in self.raw.keys() {
            if !self.copied.contains(key) {
                self.diagnostics
                    .warn(NORMALIZE_STAGE, format!("Property '{key}' was ignored"));
            }
        }
        self.into_normalized()
    }

    /// Record `error` and keep whatever was normalized before it.
    pub fn abort(mut self, error: RuleError) -> Normalized {
        self.diagnostics
            .fail(Failure::from_error(NORMALIZE_STAGE, &error));
        self.into_normalized()
    }

    fn into_normalized(self) -> Normalized {
        Normalized {
            normalized: self.normalized,
            copied: self.copied,
            diagnostics: self.diagnostics,
        }
    }

    fn consume(&mut self, key: &str) {
        self.copied.insert(key.to_string());
    }

    fn write(&mut self, rule: &Rule, target: TargetPath<'_>, value: &Value) -> Result<(), RuleError> {
        let value = rule.transform_value(value, &self.context)?;
        let (parent, last) = target.parent_mut(&mut self.normalized)?;
        parent.insert(last.to_string(), value);
        Ok(())
    }

    fn unshift(
        &mut self,
        rule: &Rule,
        target: TargetPath<'_>,
        value: &Value,
    ) -> Result<(), RuleError> {
        let value = rule.transform_value(value, &self.context)?;
        let (parent, last) = target.parent_mut(&mut self.normalized)?;
        match parent
            .entry(last)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => {
                items.insert(0, value);
                Ok(())
            }
            _ => Err(RuleError::TargetNotArray {
                path: target.to_string(),
            }),
        }
    }

    fn merge(
        &mut self,
        rule: &Rule,
        target: TargetPath<'_>,
        entries: &Map<String, Value>,
    ) -> Result<(), RuleError> {
        let context = self.context;
        let container = target.object_mut(&mut self.normalized)?;
        for (name, incoming) in entries {
            let incoming = rule.transform_value(incoming, &context)?;
            let conflict = container
                .get(name)
                .is_some_and(|existing| *existing != incoming);
            if conflict {
                self.diagnostics.warn(
                    NORMALIZE_STAGE,
                    format!(
                        "Found existing value at '{target}.{name}' while trying to merge from '{}.{name}'",
                        rule.source_key
                    ),
                );
            } else {
                container.insert(name.clone(), incoming);
            }
        }
        Ok(())
    }
}

/// Normalize `raw` with `rules` in one call.
///
/// A raw value that is not an object yields a single structural failure and
/// an empty normalized object.
pub fn normalize_with(rules: &[Rule], raw: &Value, context: RuleContext<'_>) -> Normalized {
    let Value::Object(raw) = raw else {
        let error = RuleError::NotAnObject {
            found: value_kind(raw),
        };
        let mut diagnostics = Diagnostics::new();
        diagnostics.fail(Failure::from_error(NORMALIZE_STAGE, &error));
        return Normalized {
            diagnostics,
            ..Normalized::default()
        };
    };
    let mut normalizer = Normalizer::new(raw, context);
    match normalizer.apply_all(rules) {
        Ok(()) => normalizer.finish(),
        Err(error) => normalizer.abort(error),
    }
}
