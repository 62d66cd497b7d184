//! Program descriptor normalization.
//!
//! The rule table below extends the package-level primitives with the keys a
//! program descriptor understands. Table order matters: the `package`
//! shorthand is applied before `boot` is merged, and `mappings` before
//! `bundleDependencies`, so the earlier key wins any conflict.

use crate::options::InsightOptions;
use crate::paths::{is_relative_reference, join_lexical, source_dir};
use insight_rules::{
    Literal, Normalized, Normalizer, Rule, RuleContext, RuleError, TargetPath, normalize_with,
    value_kind,
};
use serde_json::{Map, Value};

pub const BOOT_PACKAGE: TargetPath<'static> = TargetPath::new(&["boot", "package"]);
pub const BUNDLED: TargetPath<'static> = TargetPath::new(&["dependencies", "bundled"]);

pub const PROGRAM_RULES: &[Rule] = &[
    Rule::remove("$schema"),
    Rule::string("uid"),
    Rule::string("name"),
    Rule::string("description"),
    Rule::string("version"),
    Rule::string_to_object("package", &["boot", "package"]),
    Rule::merge_object_to("boot", &["boot"]),
    Rule::merge_object_to("dependencies", &["dependencies"]),
    Rule::merge_object_to("mappings", &["dependencies", "bundled"])
        .with_transform(prefix_relative_path),
    Rule::merge_object_to("bundleDependencies", &["dependencies", "bundled"])
        .with_transform(prefix_relative_path),
    Rule::object("config"),
    Rule::remove_if_match("config", Literal::Null),
    Rule::merge_object_to("env", &["env"]),
    Rule::string_to_array("extends", &["extends"]),
    Rule::array("extends"),
    Rule::boolean_to_object("debug", &["debug", "enabled"]),
    Rule::merge_object_to("debug", &["debug"]),
];

/// `pkg` becomes `./pkg`; dotted and absolute paths are left alone.
fn prefix_relative_path(value: &Value, _context: &RuleContext<'_>) -> Result<Value, RuleError> {
    let Some(path) = value.as_str() else {
        return Err(RuleError::InvalidValue {
            key: BUNDLED.to_string(),
            reason: format!("expected a path string, found {}", value_kind(value)),
        });
    };
    if path.starts_with('.') || path.starts_with('/') {
        return Ok(value.clone());
    }
    Ok(Value::String(format!("./{path}")))
}

/// Rebase a relative `boot.package` onto the directory of the descriptor
/// that declared it.
fn rebase_boot_package(
    normalized: &mut Map<String, Value>,
    context: &RuleContext<'_>,
) -> Result<(), RuleError> {
    let Some(source_path) = context.source_path else {
        return Ok(());
    };
    let Some(Value::Object(boot)) = normalized.get_mut("boot") else {
        return Ok(());
    };
    let Some(package) = boot.get_mut("package") else {
        return Ok(());
    };
    let reference = match package {
        Value::String(reference) => reference,
        other => {
            return Err(RuleError::InvalidValue {
                key: BOOT_PACKAGE.to_string(),
                reason: format!("expected a string, found {}", value_kind(other)),
            });
        }
    };
    if !is_relative_reference(reference) {
        return Ok(());
    }
    let rebased = join_lexical(&source_dir(source_path, context.root_path), reference);
    *reference = rebased;
    Ok(())
}

/// Every `dependencies.bundled` entry must be a path string. Offending
/// entries are dropped from the normalized object before the error is
/// reported, so the walker never sees them.
fn check_bundled_paths(normalized: &mut Map<String, Value>) -> Result<(), RuleError> {
    let Some(Value::Object(dependencies)) = normalized.get_mut("dependencies") else {
        return Ok(());
    };
    let bundled = match dependencies.get_mut("bundled") {
        None => return Ok(()),
        Some(Value::Object(bundled)) => bundled,
        Some(other) => {
            let found = value_kind(other);
            dependencies.remove("bundled");
            return Err(RuleError::InvalidValue {
                key: BUNDLED.to_string(),
                reason: format!("expected an object, found {found}"),
            });
        }
    };
    let mut first_invalid = None;
    bundled.retain(|alias, path| {
        if path.is_string() {
            return true;
        }
        first_invalid.get_or_insert_with(|| (alias.clone(), value_kind(path)));
        false
    });
    match first_invalid {
        None => Ok(()),
        Some((alias, found)) => Err(RuleError::InvalidValue {
            key: format!("{BUNDLED}.{alias}"),
            reason: format!("expected a path string, found {found}"),
        }),
    }
}

/// Normalize one raw program descriptor.
pub fn normalize_program(
    source_path: Option<&str>,
    raw: &Value,
    options: &InsightOptions,
) -> Normalized {
    let context = options.rule_context(source_path);
    let Value::Object(entries) = raw else {
        return normalize_with(PROGRAM_RULES, raw, context);
    };
    let mut normalizer = Normalizer::new(entries, context);
    let applied = normalizer
        .apply_all(PROGRAM_RULES)
        .and_then(|()| rebase_boot_package(normalizer.normalized_mut(), &context))
        .and_then(|()| check_bundled_paths(normalizer.normalized_mut()));
    match applied {
        Ok(()) => normalizer.finish(),
        Err(error) => normalizer.abort(error),
    }
}
