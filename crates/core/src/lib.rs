//! contrib-checker core library.
//!
//! This crate checks that everyone who authored commits in a git repository
//! is credited in its citation metadata (`CITATION.cff`, `codemeta.json`):
//! history collection, identity unification, ignore rules, matching, result
//! aggregation, and the GitHub/GitLab reporting wrappers.

pub mod checker;
pub mod config;
pub mod errors;
pub mod history;
pub mod identity;
pub mod ignore;
pub mod matcher;
pub mod metadata;
pub mod models;
pub mod platform;
pub mod report;

// Re-exports for convenience.
pub use checker::ContributorChecker;
pub use config::{CheckConfig, Mode, RawCheckConfig};
pub use errors::CheckError;
pub use history::CommitRange;
pub use identity::{Canonicalize, Mailmap, NoCanonicalization};
pub use models::{CommitAuthor, MetadataContributor, MetadataSource};
pub use report::{CheckResult, SkippedSource};
