//! Warnings and failures collected while normalizing descriptors.
//!
//! Diagnostics are data, not control flow. Every stage hands back a
//! [`Diagnostics`] accumulator and callers merge it into their own, tagging
//! entries with provenance as they go. A caller that receives a value without
//! an `Err` must still look at `errors`.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

/// A non-fatal observation about a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub stage: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl Warning {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Append provenance entries (e.g. `["descriptor", "program.json"]`).
    pub fn with_context<I, S>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.extend(context.into_iter().map(Into::into));
        self
    }
}

/// A structural failure scoped to one descriptor.
///
/// `detail` holds the chain of underlying causes, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub stage: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl Failure {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            detail: String::new(),
            context: Vec::new(),
        }
    }

    /// Capture an error and its `source()` chain.
    pub fn from_error(stage: impl Into<String>, error: &(dyn StdError + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        Self {
            stage: stage.into(),
            message: error.to_string(),
            detail: causes.join("\n"),
            context: Vec::new(),
        }
    }

    pub fn with_context<I, S>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.extend(context.into_iter().map(Into::into));
        self
    }
}

/// Ordered warnings and errors produced by one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub warnings: Vec<Warning>,
    pub errors: Vec<Failure>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, stage: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Warning::new(stage, message));
    }

    pub fn fail(&mut self, failure: Failure) {
        self.errors.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Move all entries of `other` into `self`, appending `context` to each.
    pub fn absorb(&mut self, other: Diagnostics, context: &[&str]) {
        self.warnings.extend(
            other
                .warnings
                .into_iter()
                .map(|warning| warning.with_context(context.iter().copied())),
        );
        self.errors.extend(
            other
                .errors
                .into_iter()
                .map(|failure| failure.with_context(context.iter().copied())),
        );
    }
}
