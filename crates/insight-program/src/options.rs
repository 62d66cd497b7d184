//! Options for one resolve call.

use crate::lookup::LookupPaths;
use crate::paths::resolve_path;
use insight_rules::RuleContext;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightOptions {
    /// Prefix for relative paths. Absolute paths bypass it.
    pub root_path: Option<PathBuf>,
    /// Variables used to expand lookup templates. Copied before use.
    pub env: BTreeMap<String, String>,
    /// Follow bundled dependencies of discovered packages, not just the boot
    /// package.
    pub include_packages: bool,
    /// Treat a package reference whose target does not exist as a skip
    /// (with a warning) rather than an empty package entry.
    pub optional_packages: bool,
    /// Log the resolved program path at `info` level.
    pub debug: bool,
    pub lookup_paths: LookupPaths,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            root_path: None,
            env: BTreeMap::new(),
            include_packages: false,
            optional_packages: true,
            debug: false,
            lookup_paths: LookupPaths::default(),
        }
    }
}

impl InsightOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_path(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    pub fn with_include_packages(mut self, include_packages: bool) -> Self {
        self.include_packages = include_packages;
        self
    }

    pub fn with_optional_packages(mut self, optional_packages: bool) -> Self {
        self.optional_packages = optional_packages;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_lookup_paths(mut self, lookup_paths: LookupPaths) -> Self {
        self.lookup_paths = lookup_paths;
        self
    }

    /// Resolve `path` against `root_path`.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        resolve_path(self.root_path.as_deref(), path.as_ref())
    }

    pub fn rule_context<'a>(&'a self, source_path: Option<&'a str>) -> RuleContext<'a> {
        RuleContext {
            source_path,
            root_path: self.root_path.as_deref(),
        }
    }
}
