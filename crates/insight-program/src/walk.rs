//! Package-graph walk.
//!
//! The walk starts from the program's `boot.package` and, when
//! `include_packages` is set, continues through each package's bundled
//! dependencies. Packages are de-duplicated by canonical path, so every
//! directory is parsed at most once per call no matter how many references
//! reach it or whether they form a cycle.
//!
//! ```text
//! follow_package(ref)
//!     ├─ ref seen before            -> Skipped(Declared)
//!     ├─ canonicalize: not found    -> Missing
//!     ├─ canonical path seen before -> Skipped(Visited), alias entry
//!     └─ combine_program(ref)       -> Resolved
//!            └─ follow_dependencies(bundled refs), concurrently
//! ```

use crate::error::InsightError;
use crate::lookup::PROGRAM_PARENT_VAR;
use crate::options::InsightOptions;
use crate::program::{ProgramDescriptor, combine_program};
use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use insight_rules::Warning;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Stage name for diagnostics raised by the walk itself.
pub const PACKAGES_STAGE: &str = "packages";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    Resolving,
    Resolved,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The same declared reference was already followed.
    Declared,
    /// Another reference already reached this directory.
    Visited { canonical: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowOutcome {
    Resolved,
    Skipped(SkipReason),
    Missing,
}

/// Counters for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkSummary {
    pub parsed: usize,
    pub aliased: usize,
    pub missing: usize,
}

#[derive(Debug, Default)]
struct WalkState {
    states: BTreeMap<PathBuf, PackageState>,
    declared: BTreeSet<String>,
    packages: BTreeMap<String, ProgramDescriptor>,
    first_by_canonical: BTreeMap<PathBuf, String>,
    aliases: Vec<(String, PathBuf)>,
    warnings: Vec<Warning>,
    summary: WalkSummary,
}

/// What a finished walk contributes to the top-level descriptor.
#[derive(Debug)]
pub struct WalkResult {
    pub packages: BTreeMap<String, ProgramDescriptor>,
    pub warnings: Vec<Warning>,
    pub summary: WalkSummary,
}

/// State of one top-level resolve call.
pub struct PackageWalk<'a> {
    options: &'a InsightOptions,
    /// `options` minus the program-level lookup variables.
    package_options: InsightOptions,
    root_canonical: PathBuf,
    root: ProgramDescriptor,
    state: Mutex<WalkState>,
}

impl<'a> PackageWalk<'a> {
    /// `root` is the program's combined descriptor before any package was
    /// attached. References that lead back to the program receive a copy.
    pub fn new(
        options: &'a InsightOptions,
        root_canonical: PathBuf,
        root: ProgramDescriptor,
    ) -> Self {
        let mut state = WalkState::default();
        state
            .states
            .insert(root_canonical.clone(), PackageState::Resolved);
        let mut package_options = options.clone();
        package_options.env.remove(PROGRAM_PARENT_VAR);
        Self {
            options,
            package_options,
            root_canonical,
            root,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WalkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn follow_package<'w>(
        &'w self,
        reference: String,
    ) -> BoxFuture<'w, Result<FollowOutcome, InsightError>> {
        async move {
            let first = self.lock().declared.insert(reference.clone());
            if !first {
                return Ok(FollowOutcome::Skipped(SkipReason::Declared));
            }

            let resolved = self.options.resolve(&reference);
            let canonical = match tokio::fs::canonicalize(&resolved).await {
                Ok(canonical) => canonical,
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                    self.record_missing(reference);
                    return Ok(FollowOutcome::Missing);
                }
                Err(source) => {
                    return Err(InsightError::Canonicalize { reference, source });
                }
            };

            {
                let mut state = self.lock();
                if state.states.contains_key(&canonical) {
                    debug!(
                        reference = %reference,
                        canonical = %canonical.display(),
                        "package already visited"
                    );
                    state.aliases.push((reference, canonical.clone()));
                    state.summary.aliased += 1;
                    return Ok(FollowOutcome::Skipped(SkipReason::Visited { canonical }));
                }
                state.states.insert(canonical.clone(), PackageState::Resolving);
                state
                    .first_by_canonical
                    .insert(canonical.clone(), reference.clone());
            }

            debug!(reference = %reference, canonical = %canonical.display(), "resolving package");
            let descriptor = match combine_program(&reference, &self.package_options).await {
                Ok(descriptor) => descriptor,
                Err(error) => {
                    self.lock().states.insert(canonical, PackageState::Failed);
                    return Err(error);
                }
            };
            let bundled = if self.options.include_packages {
                descriptor.combined.bundled_references(&descriptor.dirpath)
            } else {
                Vec::new()
            };
            {
                let mut state = self.lock();
                state.packages.insert(reference, descriptor);
                state.states.insert(canonical, PackageState::Resolved);
                state.summary.parsed += 1;
            }

            self.follow_dependencies(bundled).await?;
            Ok(FollowOutcome::Resolved)
        }
        .boxed()
    }

    /// Follow sibling references concurrently. The first error wins and the
    /// remaining branches are dropped.
    pub async fn follow_dependencies(
        &self,
        references: Vec<String>,
    ) -> Result<Vec<FollowOutcome>, InsightError> {
        try_join_all(
            references
                .into_iter()
                .map(|reference| self.follow_package(reference)),
        )
        .await
    }

    fn record_missing(&self, reference: String) {
        let mut state = self.lock();
        state.summary.missing += 1;
        if self.options.optional_packages {
            warn!(reference = %reference, "package not found");
            state.warnings.push(Warning::new(
                PACKAGES_STAGE,
                format!("Package '{reference}' was not found"),
            ));
        } else {
            debug!(reference = %reference, "recording empty package");
            state
                .packages
                .insert(reference.clone(), ProgramDescriptor::new(reference));
        }
    }

    /// Fill alias entries and hand the collected packages back.
    pub fn finish(self) -> WalkResult {
        let mut state = self.state.into_inner().unwrap_or_else(PoisonError::into_inner);
        for (reference, canonical) in std::mem::take(&mut state.aliases) {
            let shared = if canonical == self.root_canonical {
                Some(self.root.clone())
            } else {
                state
                    .first_by_canonical
                    .get(&canonical)
                    .and_then(|first| state.packages.get(first))
                    .cloned()
            };
            if let Some(descriptor) = shared {
                state.packages.entry(reference).or_insert(descriptor);
            }
        }
        WalkResult {
            packages: state.packages,
            warnings: state.warnings,
            summary: state.summary,
        }
    }
}

/// Resolve a program directory and its package graph.
pub async fn resolve_program(
    program_path: &str,
    options: &InsightOptions,
) -> Result<ProgramDescriptor, InsightError> {
    resolve_program_with_summary(program_path, options)
        .await
        .map(|(program, _)| program)
}

/// Like [`resolve_program`], also returning walk counters.
pub async fn resolve_program_with_summary(
    program_path: &str,
    options: &InsightOptions,
) -> Result<(ProgramDescriptor, WalkSummary), InsightError> {
    let mut program = combine_program(program_path, options).await?;
    let Some(boot) = program.combined.boot_package().map(str::to_string) else {
        return Ok((program, WalkSummary::default()));
    };

    let resolved = options.resolve(program_path);
    let root_canonical = tokio::fs::canonicalize(&resolved)
        .await
        .map_err(|source| InsightError::Io {
            path: resolved.display().to_string(),
            source,
        })?;

    let walk = PackageWalk::new(options, root_canonical, program.clone());
    walk.follow_package(boot).await?;
    let result = walk.finish();

    program.combined.packages = result.packages;
    program.warnings.extend(result.warnings);
    debug!(
        program = program_path,
        parsed = result.summary.parsed,
        aliased = result.summary.aliased,
        missing = result.summary.missing,
        "package walk finished"
    );
    Ok((program, result.summary))
}
