//! # insight-rules
//!
//! Field-copy primitives shared by descriptor normalizers.
//!
//! A normalizer is a table of [`Rule`] records interpreted by one
//! [`Normalizer`]. Each rule names a raw key, a target location inside the
//! normalized object and a [`RuleKind`] deciding when and how the value is
//! copied. Every raw key a rule touches is recorded as consumed; whatever is
//! left over is reported as ignored.
//!
//! ## Data flow
//!
//! ```text
//! raw JSON object
//!     │  Normalizer::apply(rule) for each rule, in table order
//! normalized object + copied set
//!     │  Normalizer::finish
//! Normalized { normalized, copied, diagnostics }
//! ```
//!
//! Descriptors from several sources are later combined with [`deep_merge`].

pub mod diagnostic;
pub mod error;
pub mod merge;
pub mod normalizer;
pub mod rule;
pub mod target;

pub use diagnostic::{Diagnostics, Failure, Warning};
pub use error::{RuleError, value_kind};
pub use merge::deep_merge;
pub use normalizer::{NORMALIZE_STAGE, Normalized, Normalizer, normalize_with};
pub use rule::{Literal, Rule, RuleContext, RuleKind, Transform};
pub use target::{MAX_TARGET_DEPTH, TargetPath};
