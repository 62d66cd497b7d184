//! Candidate descriptor locations.
//!
//! Templates are listed in processing order: sources later in the list are
//! merged on top of earlier ones, so base files come first and the most
//! specific overrides come last.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Variable the combiner sets to the program path before expansion.
pub const PROGRAM_DIR_VAR: &str = "PROGRAM_DIR";

/// Path of a parent program descriptor. Only the top-level program sees it;
/// packages are combined without it.
pub const PROGRAM_PARENT_VAR: &str = "PINF_PROGRAM_PARENT";

pub const DEFAULT_LOOKUP_TEMPLATES: &[&str] = &[
    "${PINF_PROGRAM_PARENT}",
    "program.json",
    ".program.json",
    "${PINF_RUNTIME}",
    "program.${PINF_MODE}.json",
];

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex must compile")
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupPaths {
    templates: Vec<String>,
}

impl Default for LookupPaths {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_TEMPLATES.iter().copied())
    }
}

impl LookupPaths {
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Expand every template against `env`, in order.
    ///
    /// Templates that mention an unset or empty variable are skipped, and a
    /// candidate produced twice is only kept the first time.
    pub fn expand(&self, env: &BTreeMap<String, String>) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.templates
            .iter()
            .filter_map(|template| expand_template(template, env))
            .filter(|candidate| seen.insert(candidate.clone()))
            .collect()
    }
}

fn expand_template(template: &str, env: &BTreeMap<String, String>) -> Option<String> {
    let mut expanded = String::with_capacity(template.len());
    let mut last = 0;
    for captures in placeholder_re().captures_iter(template) {
        let whole = captures.get(0)?;
        let name = captures.get(1)?.as_str();
        let value = env.get(name).filter(|value| !value.is_empty())?;
        expanded.push_str(&template[last..whole.start()]);
        expanded.push_str(value);
        last = whole.end();
    }
    expanded.push_str(&template[last..]);
    (!expanded.trim().is_empty()).then_some(expanded)
}
