//! # insight-program
//!
//! Resolves a program directory into one combined configuration tree.
//!
//! ```text
//! program path + InsightOptions
//!     │  lookup: expand candidate templates
//!     │  loader: read each existing candidate
//!     │  normalize: program rules per descriptor
//!     │  combine: deep-merge in candidate order
//! ProgramDescriptor
//!     │  walk: boot package, then bundled dependencies
//! ProgramDescriptor { combined.packages }
//! ```
//!
//! Only unusable program directories and unexpected filesystem errors abort
//! a call. Everything else is recorded as `warnings` and `errors` on the
//! descriptor it concerns.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod lookup;
pub mod normalize;
pub mod options;
pub mod paths;
pub mod program;
pub mod walk;

pub use config::InsightConfig;
pub use descriptor::{Descriptor, normalize, parse_descriptor};
pub use error::{ConfigError, InsightError, LoadError};
pub use loader::{DescriptorSource, load_raw};
pub use lookup::{DEFAULT_LOOKUP_TEMPLATES, LookupPaths, PROGRAM_DIR_VAR, PROGRAM_PARENT_VAR};
pub use normalize::{PROGRAM_RULES, normalize_program};
pub use options::InsightOptions;
pub use program::{Combined, ProgramDescriptor, combine_program, program_id};
pub use walk::{
    FollowOutcome, PACKAGES_STAGE, PackageState, PackageWalk, SkipReason, WalkResult, WalkSummary,
    resolve_program, resolve_program_with_summary,
};

/// Resolve `program_path` and its packages. Same as [`resolve_program`].
pub async fn parse(
    program_path: &str,
    options: &InsightOptions,
) -> Result<ProgramDescriptor, InsightError> {
    resolve_program(program_path, options).await
}
