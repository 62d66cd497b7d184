//! Program descriptors and the multi-source combiner.

use crate::descriptor::parse_existing;
use crate::error::InsightError;
use crate::loader::DescriptorSource;
use crate::lookup::PROGRAM_DIR_VAR;
use crate::normalize::{BOOT_PACKAGE, BUNDLED};
use crate::options::InsightOptions;
use crate::paths::{join_candidate, join_lexical};
use insight_rules::{Diagnostics, Failure, Warning, deep_merge};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Deep-merge of every source, plus the packages found by the walker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Combined {
    #[serde(flatten)]
    pub tree: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub packages: BTreeMap<String, ProgramDescriptor>,
}

impl Combined {
    pub fn boot_package(&self) -> Option<&str> {
        BOOT_PACKAGE.get(&self.tree).and_then(Value::as_str)
    }

    /// Bundled dependency paths joined onto `dirpath`, in alias order.
    pub fn bundled_references(&self, dirpath: &str) -> Vec<String> {
        let Some(Value::Object(bundled)) = BUNDLED.get(&self.tree) else {
            return Vec::new();
        };
        bundled
            .values()
            .filter_map(Value::as_str)
            .map(|path| join_lexical(dirpath, path))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDescriptor {
    pub dirpath: String,
    pub id: String,
    /// Candidate file -> raw JSON, for every candidate that existed.
    pub raw: BTreeMap<String, Value>,
    pub normalized: BTreeMap<String, Map<String, Value>>,
    pub combined: Combined,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    #[serde(default)]
    pub errors: Vec<Failure>,
}

impl ProgramDescriptor {
    pub fn new(dirpath: impl Into<String>) -> Self {
        let dirpath = dirpath.into();
        Self {
            id: program_id(&dirpath),
            dirpath,
            raw: BTreeMap::new(),
            normalized: BTreeMap::new(),
            combined: Combined::default(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True when this descriptor or any of its packages recorded errors.
    pub fn has_errors_anywhere(&self) -> bool {
        self.has_errors()
            || self
                .combined
                .packages
                .values()
                .any(ProgramDescriptor::has_errors_anywhere)
    }

    fn absorb(&mut self, diagnostics: Diagnostics, candidate: &str) {
        let context = ["descriptor", candidate];
        self.warnings.extend(
            diagnostics
                .warnings
                .into_iter()
                .map(|warning| warning.with_context(context)),
        );
        self.errors.extend(
            diagnostics
                .errors
                .into_iter()
                .map(|failure| failure.with_context(context)),
        );
    }
}

/// `<sha1 of dirpath>-<last path segment>`.
pub fn program_id(dirpath: &str) -> String {
    let hash = Sha1::digest(dirpath.as_bytes());
    let basename = Path::new(dirpath)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{hash:x}-{basename}")
}

/// Load every candidate descriptor of one program directory and merge them.
///
/// Fails only when the program directory itself is unusable. Problems inside
/// individual descriptors end up in `errors`.
pub async fn combine_program(
    program_path: &str,
    options: &InsightOptions,
) -> Result<ProgramDescriptor, InsightError> {
    let resolved = options.resolve(program_path);
    let metadata = match tokio::fs::metadata(&resolved).await {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(InsightError::ProgramNotFound {
                path: resolved.display().to_string(),
            });
        }
        Err(source) => {
            return Err(InsightError::Io {
                path: resolved.display().to_string(),
                source,
            });
        }
    };
    if !metadata.is_dir() {
        return Err(InsightError::NotADirectory {
            path: resolved.display().to_string(),
        });
    }
    if options.debug {
        info!(path = %resolved.display(), "resolving program");
    }

    let mut env = options.env.clone();
    env.insert(PROGRAM_DIR_VAR.to_string(), program_path.to_string());

    let mut program = ProgramDescriptor::new(program_path);
    for candidate in options.lookup_paths.expand(&env) {
        let source = DescriptorSource::Path(join_candidate(program_path, &candidate));
        let Some(descriptor) = parse_existing(&source, options).await else {
            continue;
        };
        debug!(program = program_path, candidate = %candidate, "merging descriptor");
        deep_merge(&mut program.combined.tree, &descriptor.normalized);
        program.raw.insert(candidate.clone(), descriptor.raw);
        program
            .normalized
            .insert(candidate.clone(), descriptor.normalized);
        program.absorb(
            Diagnostics {
                warnings: descriptor.warnings,
                errors: descriptor.errors,
            },
            &candidate,
        );
    }
    Ok(program)
}
