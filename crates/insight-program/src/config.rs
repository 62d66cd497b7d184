//! TOML configuration file for resolve options.
//!
//! ```toml
//! root = "assets"
//! include_packages = true
//! lookup = ["program.json", "program.${PINF_MODE}.json"]
//!
//! [env]
//! PINF_MODE = "dev"
//! ```

use crate::error::ConfigError;
use crate::lookup::LookupPaths;
use crate::options::InsightOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsightConfig {
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub include_packages: Option<bool>,
    #[serde(default)]
    pub optional_packages: Option<bool>,
    #[serde(default)]
    pub debug: Option<bool>,
    #[serde(default)]
    pub lookup: Option<Vec<String>>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl InsightConfig {
    pub fn from_toml_str(text: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: path.to_string(),
            source,
        })
    }

    /// Read a config file. A relative `root` is taken relative to the
    /// directory holding the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text, &path.display().to_string())?;
        if let Some(root) = config.root.take() {
            config.root = Some(match path.parent() {
                Some(parent) if root.is_relative() => parent.join(root),
                _ => root,
            });
        }
        Ok(config)
    }

    /// Overlay the values present in this file onto `options`.
    pub fn apply_to(&self, mut options: InsightOptions) -> InsightOptions {
        if let Some(root) = &self.root {
            options.root_path = Some(root.clone());
        }
        if let Some(include_packages) = self.include_packages {
            options.include_packages = include_packages;
        }
        if let Some(optional_packages) = self.optional_packages {
            options.optional_packages = optional_packages;
        }
        if let Some(debug) = self.debug {
            options.debug = debug;
        }
        if let Some(lookup) = &self.lookup {
            options.lookup_paths = LookupPaths::new(lookup.iter().cloned());
        }
        options
            .env
            .extend(self.env.iter().map(|(key, value)| (key.clone(), value.clone())));
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_fields() {
        let config = InsightConfig::from_toml_str(
            r#"
root = "/srv/assets"
include_packages = true
optional_packages = false
debug = true
lookup = ["program.json", "program.${PINF_MODE}.json"]

[env]
PINF_MODE = "dev"
"#,
            "insight.toml",
        )
        .expect("config should parse");

        let options = config.apply_to(InsightOptions::default());
        assert_eq!(options.root_path, Some(PathBuf::from("/srv/assets")));
        assert!(options.include_packages);
        assert!(!options.optional_packages);
        assert!(options.debug);
        assert_eq!(
            options.lookup_paths.templates(),
            &["program.json".to_string(), "program.${PINF_MODE}.json".to_string()]
        );
        assert_eq!(options.env.get("PINF_MODE").map(String::as_str), Some("dev"));
    }

    #[test]
    fn absent_fields_keep_existing_options() {
        let config = InsightConfig::from_toml_str("", "empty.toml").expect("empty config parses");
        let base = InsightOptions::default()
            .with_include_packages(true)
            .with_var("A", "1");
        assert_eq!(config.apply_to(base.clone()), base);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = InsightConfig::from_toml_str("rootpath = \"x\"", "bad.toml")
            .expect_err("unknown field should fail");
        assert!(matches!(error, ConfigError::ParseToml { .. }));
    }
}
