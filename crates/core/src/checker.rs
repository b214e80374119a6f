//! The contributor check engine.
//!
//! [`ContributorChecker`] wires the pipeline together: unify identities,
//! collect authors from history, drop ignored authors, load the metadata
//! sources, then match and aggregate. Each call opens the repository and
//! re-reads the metadata files, so one checker can be reused across queries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::CheckConfig;
use crate::errors::{CheckError, ConfigError};
use crate::history::{CommitRange, HistoryCollector};
use crate::identity::Canonicalize;
use crate::ignore::IgnoreFilter;
use crate::metadata::MetadataRegistry;
use crate::models::CommitAuthor;
use crate::report::{CheckResult, ResultAggregator};

const FULL_HISTORY_DESCRIPTION: &str = "all commits";

/// Checks that commit authors are credited in the repository's metadata.
pub struct ContributorChecker {
    repo_path: PathBuf,
    config: CheckConfig,
    canonicalizer: Option<Arc<dyn Canonicalize>>,
}

impl ContributorChecker {
    /// Create a checker for `repo_path`.
    ///
    /// With `canonicalizer` set to `None` identities are resolved through
    /// the repository's mailmap on every check.
    pub fn new<P: AsRef<Path>>(
        repo_path: P,
        config: CheckConfig,
        canonicalizer: Option<Arc<dyn Canonicalize>>,
    ) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
            config,
            canonicalizer,
        }
    }

    pub fn with_canonicalizer(mut self, canonicalizer: Arc<dyn Canonicalize>) -> Self {
        self.canonicalizer = Some(canonicalizer);
        self
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check every author in the repository's history.
    #[instrument(skip(self), fields(repo = %self.repo_path.display()))]
    pub fn check_all_contributors(&self) -> Result<(bool, CheckResult), CheckError> {
        let result = self.run(None, FULL_HISTORY_DESCRIPTION)?;
        Ok((result.success, result))
    }

    /// Check the authors of commits in `from..to`.
    ///
    /// `description` is a label stored in the result, e.g. "PR commits".
    #[instrument(skip(self), fields(repo = %self.repo_path.display()))]
    pub fn check_range_contributors(
        &self,
        from: &str,
        to: &str,
        description: &str,
    ) -> Result<(bool, CheckResult), CheckError> {
        let from = from.trim();
        let to = to.trim();
        for (field, value) in [("from", from), ("to", to)] {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    detail: "range bound must not be empty".into(),
                }
                .into());
            }
        }

        let range = CommitRange::new(from, to);
        let result = self.run(Some(&range), description)?;
        Ok((result.success, result))
    }

    fn run(&self, range: Option<&CommitRange>, description: &str) -> Result<CheckResult, CheckError> {
        let collector = HistoryCollector::open(
            &self.repo_path,
            self.canonicalizer.as_deref(),
            self.config.history_timeout(),
        )?;
        let history = collector.collect(range)?;

        let (authors, ignored) = self.partition(history);
        let metadata = MetadataRegistry::load(&self.repo_path)?;

        let result = ResultAggregator::new(&metadata).aggregate(
            description,
            self.config.mode(),
            authors,
            ignored,
        );

        if result.missing_overall.is_empty() {
            info!(
                authors = result.authors.len(),
                "all contributors are credited in metadata"
            );
        } else {
            warn!(
                missing = result.missing_overall.len(),
                authors = result.authors.len(),
                mode = %result.mode,
                "contributors missing from metadata"
            );
        }
        Ok(result)
    }

    /// Split authors into `(considered, ignored)`, both in history order.
    fn partition(&self, history: Vec<CommitAuthor>) -> (Vec<CommitAuthor>, Vec<CommitAuthor>) {
        let filter = IgnoreFilter::new(&self.config);
        let mut authors = Vec::with_capacity(history.len());
        let mut ignored = Vec::new();
        for author in history {
            match filter.reason(&author) {
                Some(reason) => {
                    debug!(%author, %reason, "ignoring author");
                    ignored.push(author);
                }
                None => authors.push(author),
            }
        }
        (authors, ignored)
    }
}
