//! Dotted target locations inside a normalized object.

use crate::error::RuleError;
use serde_json::{Map, Value};
use std::fmt;

/// Deepest location a rule may write to (`a.b.c`).
pub const MAX_TARGET_DEPTH: usize = 3;

/// A location of one to three segments inside the normalized object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPath<'a>(&'a [&'a str]);

impl<'a> TargetPath<'a> {
    pub const fn new(segments: &'a [&'a str]) -> Self {
        assert!(
            !segments.is_empty() && segments.len() <= MAX_TARGET_DEPTH,
            "target paths have one to three segments"
        );
        Self(segments)
    }

    /// Single-segment path naming `key` itself.
    pub fn from_key(key: &'a &'a str) -> Self {
        Self(std::slice::from_ref(key))
    }

    pub fn segments(&self) -> &'a [&'a str] {
        self.0
    }

    /// Object at this path, creating empty objects along the way.
    pub fn object_mut<'m>(
        &self,
        root: &'m mut Map<String, Value>,
    ) -> Result<&'m mut Map<String, Value>, RuleError> {
        descend(root, self.0, self.0)
    }

    /// Parent object of the last segment, together with that segment.
    pub fn parent_mut<'m>(
        &self,
        root: &'m mut Map<String, Value>,
    ) -> Result<(&'m mut Map<String, Value>, &'a str), RuleError> {
        let Some((last, parents)) = self.0.split_last() else {
            return Ok((root, ""));
        };
        Ok((descend(root, parents, self.0)?, *last))
    }

    /// Value currently stored at this path, if any.
    pub fn get<'m>(&self, root: &'m Map<String, Value>) -> Option<&'m Value> {
        let (first, rest) = self.0.split_first()?;
        rest.iter()
            .try_fold(root.get(*first)?, |value, segment| value.get(*segment))
    }
}

fn descend<'m>(
    root: &'m mut Map<String, Value>,
    segments: &[&str],
    full: &[&str],
) -> Result<&'m mut Map<String, Value>, RuleError> {
    let mut current = root;
    for (depth, segment) in segments.iter().enumerate() {
        let entry = current
            .entry(*segment)
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(RuleError::TargetNotObject {
                    path: full[..=depth].join("."),
                });
            }
        };
    }
    Ok(current)
}

impl fmt::Display for TargetPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_mut_creates_intermediate_objects() {
        let mut root = Map::new();
        let target = TargetPath::new(&["dependencies", "bundled"]);
        target
            .object_mut(&mut root)
            .expect("target should be created")
            .insert("a".to_string(), json!("./a"));
        assert_eq!(
            Value::Object(root),
            json!({"dependencies": {"bundled": {"a": "./a"}}})
        );
    }

    #[test]
    fn object_mut_rejects_scalar_on_the_way() {
        let mut root = Map::new();
        root.insert("boot".to_string(), json!("main.js"));
        let error = TargetPath::new(&["boot", "config"])
            .object_mut(&mut root)
            .expect_err("scalar should block descent");
        assert_eq!(
            error,
            RuleError::TargetNotObject {
                path: "boot".to_string()
            }
        );
    }

    #[test]
    fn get_reads_nested_values() {
        let root = json!({"boot": {"package": "./pkg"}});
        let root = root.as_object().expect("fixture is an object");
        assert_eq!(
            TargetPath::new(&["boot", "package"]).get(root),
            Some(&json!("./pkg"))
        );
        assert_eq!(TargetPath::new(&["boot", "missing"]).get(root), None);
    }

    #[test]
    fn display_joins_segments_with_dots() {
        assert_eq!(
            TargetPath::new(&["a", "b", "c"]).to_string(),
            "a.b.c".to_string()
        );
    }
}
