//! Declarative rule records.
//!
//! A descriptor normalizer is a `&[Rule]` table. Rules are plain data so a
//! table can be inspected, tested and extended without touching the
//! interpreter in [`crate::normalizer`].

use crate::error::RuleError;
use crate::target::TargetPath;
use serde_json::Value;
use std::path::Path;

/// Value rewrite applied before a rule writes into the normalized object.
pub type Transform = fn(&Value, &RuleContext<'_>) -> Result<Value, RuleError>;

/// Where the descriptor being normalized came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleContext<'a> {
    /// Path of the source file as given by the caller, `None` for in-memory
    /// descriptors.
    pub source_path: Option<&'a str>,
    pub root_path: Option<&'a Path>,
}

/// Literal compared against a raw value by [`RuleKind::RemoveIfMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Null,
    Bool(bool),
    Str(&'static str),
}

impl Literal {
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Literal::Null, Value::Null) => true,
            (Literal::Bool(expected), Value::Bool(actual)) => expected == actual,
            (Literal::Str(expected), Value::String(actual)) => expected == actual,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Copy when the raw value is a string.
    String,
    /// Copy when the raw value is a non-empty array; empty arrays are consumed.
    Array,
    /// Copy when the raw value is a non-empty object; empty objects are consumed.
    Object,
    /// Unshift a string into the array at the target.
    StringToArray,
    /// Unshift any value into the array at the target.
    AnyToArray,
    /// Write a boolean at a nested target, turning a flag into an object.
    BooleanToObject,
    /// Write a string at a nested target.
    StringToObject,
    /// Write a non-empty object at the target.
    ObjectToObject,
    /// Write a non-empty array at the target.
    ArrayToObject,
    /// Write any value at the target.
    AnyToObject,
    /// Merge every entry of a raw object into the object at the target.
    /// Existing different values win and produce a warning.
    MergeObjectTo,
    /// Consume the key without copying when it equals the literal.
    RemoveIfMatch(Literal),
    /// Consume the key without copying.
    Remove,
}

/// One recognized raw key and what to do with it.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub source_key: &'static str,
    /// `None` writes to `source_key` itself.
    pub target: Option<TargetPath<'static>>,
    pub kind: RuleKind,
    pub transform: Option<Transform>,
}

impl Rule {
    const fn build(
        source_key: &'static str,
        target: Option<TargetPath<'static>>,
        kind: RuleKind,
    ) -> Self {
        Self {
            source_key,
            target,
            kind,
            transform: None,
        }
    }

    const fn to(
        source_key: &'static str,
        target: &'static [&'static str],
        kind: RuleKind,
    ) -> Self {
        Self::build(source_key, Some(TargetPath::new(target)), kind)
    }

    pub const fn string(key: &'static str) -> Self {
        Self::build(key, None, RuleKind::String)
    }

    pub const fn array(key: &'static str) -> Self {
        Self::build(key, None, RuleKind::Array)
    }

    pub const fn object(key: &'static str) -> Self {
        Self::build(key, None, RuleKind::Object)
    }

    pub const fn string_to_array(key: &'static str, target: &'static [&'static str]) -> Self {
        Self::to(key, target, RuleKind::StringToArray)
    }

    pub const fn any_to_array(key: &'static str, target: &'static [&'static str]) -> Self {
        Self::to(key, target, RuleKind::AnyToArray)
    }

    pub const fn boolean_to_object(key: &'static str, target: &'static [&'static str]) -> Self {
        Self::to(key, target, RuleKind::BooleanToObject)
    }

    pub const fn string_to_object(key: &'static str, target: &'static [&'static str]) -> Self {
        Self::to(key, target, RuleKind::StringToObject)
    }

    pub const fn object_to_object(key: &'static str, target: &'static [&'static str]) -> Self {
        Self::to(key, target, RuleKind::ObjectToObject)
    }

    pub const fn array_to_object(key: &'static str, target: &'static [&'static str]) -> Self {
        Self::to(key, target, RuleKind::ArrayToObject)
    }

    pub const fn any_to_object(key: &'static str, target: &'static [&'static str]) -> Self {
        Self::to(key, target, RuleKind::AnyToObject)
    }

    pub const fn merge_object_to(key: &'static str, target: &'static [&'static str]) -> Self {
        Self::to(key, target, RuleKind::MergeObjectTo)
    }

    pub const fn remove_if_match(key: &'static str, literal: Literal) -> Self {
        Self::build(key, None, RuleKind::RemoveIfMatch(literal))
    }

    pub const fn remove(key: &'static str) -> Self {
        Self::build(key, None, RuleKind::Remove)
    }

    pub const fn with_transform(self, transform: Transform) -> Self {
        Self {
            transform: Some(transform),
            ..self
        }
    }

    /// Effective target location.
    pub fn target_path(&self) -> TargetPath<'_> {
        match self.target {
            Some(target) => target,
            None => TargetPath::from_key(&self.source_key),
        }
    }

    /// Run the transform, if any, over one value.
    pub fn transform_value(
        &self,
        value: &Value,
        context: &RuleContext<'_>,
    ) -> Result<Value, RuleError> {
        match self.transform {
            Some(transform) => transform(value, context),
            None => Ok(value.clone()),
        }
    }
}
