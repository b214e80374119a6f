//! CI platform wrappers.
//!
//! A [`Platform`] knows two things the engine does not: which commit range a
//! pull/merge request covers, and how to leave a comment on it. [`run`]
//! drives a check through either one.

pub mod github;
pub mod gitlab;

use tracing::{info, warn};

use crate::checker::ContributorChecker;
use crate::errors::{CheckError, PlatformError};
use crate::history::CommitRange;
use crate::models::CommitAuthor;
use crate::report::CheckResult;

pub use github::GitHubPlatform;
pub use gitlab::GitLabPlatform;

/// A CI platform that can scope a check and report on it.
#[allow(async_fn_in_trait)]
pub trait Platform {
    /// Platform name used in logs and errors.
    fn name(&self) -> &'static str;

    /// What the platform calls a change request, e.g. "PR".
    fn change_noun(&self) -> &'static str;

    /// The range of the current change request, or `None` outside one.
    fn resolve_range(&self) -> Option<CommitRange>;

    /// Comment on the change request about `result`.
    async fn report(&self, result: &CheckResult) -> Result<(), PlatformError>;
}

/// Run a check scoped by `platform` and report missing contributors.
///
/// Reporting is best effort: a failed comment is logged and the check
/// outcome is returned unchanged.
pub async fn run<P: Platform>(
    platform: &P,
    checker: &ContributorChecker,
) -> Result<(bool, CheckResult), CheckError> {
    let range = platform.resolve_range();
    let (success, result) = match &range {
        Some(range) => {
            info!(platform = platform.name(), %range, "checking {} commits", platform.change_noun());
            let description = format!("{} commits", platform.change_noun());
            checker.check_range_contributors(&range.from, &range.to, &description)?
        }
        None => {
            info!(
                platform = platform.name(),
                "no {} context, checking all contributors",
                platform.change_noun()
            );
            checker.check_all_contributors()?
        }
    };

    if range.is_some() && !result.missing_overall.is_empty() {
        match platform.report(&result).await {
            Ok(()) => info!(platform = platform.name(), "posted comment"),
            Err(e @ PlatformError::MissingEnv { .. }) => {
                warn!(error = %e, "skipping comment");
            }
            Err(e) => warn!(error = %e, "failed to post comment"),
        }
    }

    Ok((success, result))
}

/// Markdown comment listing `missing` contributors.
pub fn comment_body(missing: &[CommitAuthor], noun: &str) -> String {
    let mut entries: Vec<String> = missing.iter().map(ToString::to_string).collect();
    entries.sort();
    entries.dedup();
    let lines = entries
        .iter()
        .map(|m| format!("- {m}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "⚠️ **Metadata check: contributors missing from citation files**\n\n\
         The following contributors from this {noun} are not listed in the metadata files:\n\n\
         {lines}\n\n\
         Next steps:\n\
         - Add them to `CITATION.cff` / `codemeta.json` or update `.mailmap` if these are aliases.\n"
    )
}

/// Read a variable through `lookup`, treating blank values as unset.
pub(crate) fn env_value<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Map a non-success response to [`PlatformError::Api`].
pub(crate) async fn check_response(
    platform: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, PlatformError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| format!("HTTP {status}"));
    Err(PlatformError::Api {
        platform,
        status: status.as_u16(),
        body,
    })
}
