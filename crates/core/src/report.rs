//! Result aggregation and the mode policy.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::Mode;
use crate::matcher::IdentityMatcher;
use crate::metadata::MetadataSet;
use crate::models::{CommitAuthor, MetadataSource};

/// Outcome of one contributor check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Caller-supplied label, e.g. "PR commits". Not used for matching.
    pub description: String,
    pub mode: Mode,
    /// Authors considered, after ignore rules, in history order.
    pub authors: Vec<CommitAuthor>,
    /// Authors excluded by ignore rules.
    pub ignored: Vec<CommitAuthor>,
    /// Authors matched in at least one source.
    pub matched: Vec<CommitAuthor>,
    /// Authors matched in no source.
    pub missing_overall: Vec<CommitAuthor>,
    /// Authors missing per source; only sources that exist and parsed.
    pub missing_per_file: BTreeMap<MetadataSource, Vec<CommitAuthor>>,
    /// Metadata files that exist but were skipped.
    pub metadata_errors: Vec<SkippedSource>,
    pub success: bool,
}

/// A metadata file that exists but could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSource {
    pub source: MetadataSource,
    pub reason: String,
}

impl CheckResult {
    /// Why `source` was skipped, if it was.
    pub fn skipped(&self, source: MetadataSource) -> Option<&SkippedSource> {
        self.metadata_errors.iter().find(|s| s.source == source)
    }
}

/// `warn` always passes; `fail` passes only when nobody is missing.
pub fn success_for(mode: Mode, missing_overall: &[CommitAuthor]) -> bool {
    match mode {
        Mode::Warn => true,
        Mode::Fail => missing_overall.is_empty(),
    }
}

/// Combines per-source matching outcomes into a [`CheckResult`].
pub struct ResultAggregator<'a> {
    metadata: &'a MetadataSet,
    matchers: Vec<(MetadataSource, IdentityMatcher)>,
}

impl<'a> ResultAggregator<'a> {
    pub fn new(metadata: &'a MetadataSet) -> Self {
        let matchers = metadata
            .sources()
            .map(|(source, contributors)| (source, IdentityMatcher::new(contributors)))
            .collect();
        Self { metadata, matchers }
    }

    pub fn aggregate(
        &self,
        description: &str,
        mode: Mode,
        authors: Vec<CommitAuthor>,
        ignored: Vec<CommitAuthor>,
    ) -> CheckResult {
        let mut missing_per_file: BTreeMap<MetadataSource, Vec<CommitAuthor>> = self
            .matchers
            .iter()
            .map(|(source, _)| (*source, Vec::new()))
            .collect();
        let mut matched = Vec::new();
        let mut missing_overall = Vec::new();

        for author in &authors {
            let mut credited = false;
            for (source, matcher) in &self.matchers {
                match matcher.matches(author) {
                    Some(kind) => {
                        debug!(%author, file = source.file_name(), ?kind, "author matched");
                        credited = true;
                    }
                    None => {
                        if let Some(missing) = missing_per_file.get_mut(source) {
                            missing.push(author.clone());
                        }
                    }
                }
            }
            if credited {
                matched.push(author.clone());
            } else {
                missing_overall.push(author.clone());
            }
        }

        let success = success_for(mode, &missing_overall);
        CheckResult {
            description: description.to_string(),
            mode,
            authors,
            ignored,
            matched,
            missing_overall,
            missing_per_file,
            metadata_errors: self
                .metadata
                .errors()
                .iter()
                .map(|(source, e)| SkippedSource {
                    source: *source,
                    reason: e.to_string(),
                })
                .collect(),
            success,
        }
    }
}
