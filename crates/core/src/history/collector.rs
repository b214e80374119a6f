//! Commit author collection via `git2`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use git2::{Oid, Repository, Signature, Sort};
use tracing::{debug, info, instrument};

use crate::errors::HistoryError;
use crate::identity::{Canonicalize, Mailmap};
use crate::models::CommitAuthor;

/// A `from..to` commit range: commits reachable from `to` but not from `from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub from: String,
    pub to: String,
}

impl CommitRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl std::fmt::Display for CommitRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// Where unified identities come from during one walk.
enum Identities<'a> {
    Injected(&'a dyn Canonicalize),
    Mailmap(Mailmap),
}

impl Identities<'_> {
    fn resolve(&self, signature: &Signature<'_>) -> (String, String) {
        match self {
            Self::Injected(canonicalizer) => canonicalizer.canonicalize(
                &String::from_utf8_lossy(signature.name_bytes()),
                &String::from_utf8_lossy(signature.email_bytes()),
            ),
            Self::Mailmap(mailmap) => mailmap.resolve(signature),
        }
    }
}

/// Reads unified commit authors from a repository's history.
pub struct HistoryCollector<'a> {
    repo: Repository,
    repo_path: PathBuf,
    canonicalizer: Option<&'a dyn Canonicalize>,
    timeout: Option<Duration>,
}

impl<'a> HistoryCollector<'a> {
    /// Open the repository at `repo_path`.
    ///
    /// Without a `canonicalizer` identities are resolved through the
    /// repository's mailmap.
    pub fn open<P: AsRef<Path>>(
        repo_path: P,
        canonicalizer: Option<&'a dyn Canonicalize>,
        timeout: Option<Duration>,
    ) -> Result<Self, HistoryError> {
        let path = repo_path.as_ref();
        debug!(path = %path.display(), "opening git repository");
        let repo = Repository::open(path)
            .map_err(|_| HistoryError::RepositoryNotFound(path.display().to_string()))?;
        Ok(Self {
            repo,
            repo_path: path.to_path_buf(),
            canonicalizer,
            timeout,
        })
    }

    /// Distinct unified authors, oldest first.
    ///
    /// Without a range every commit reachable from any ref or HEAD is
    /// walked. Authors are deduplicated on the unified `(name, email)` pair
    /// and ordered by the commit time of their first commit.
    ///
    /// The walk runs newest first in commit-time order, which libgit2 yields
    /// incrementally, so the deadline is checked while history is read
    /// rather than after a full topological sort.
    #[instrument(skip(self), fields(path = %self.repo_path.display()))]
    pub fn collect(&self, range: Option<&CommitRange>) -> Result<Vec<CommitAuthor>, HistoryError> {
        let started = Instant::now();
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;

        match range {
            Some(range) => {
                let to = self.resolve(&range.to)?;
                let from = self.resolve(&range.from)?;
                revwalk.push(to)?;
                revwalk.hide(from)?;
            }
            None => {
                revwalk.push_glob("*")?;
                if let Err(e) = revwalk.push_head() {
                    debug!(error = %e, "HEAD not resolvable, walking refs only");
                }
            }
        }

        let identities = match self.canonicalizer {
            Some(canonicalizer) => Identities::Injected(canonicalizer),
            None => Identities::Mailmap(Mailmap::for_repository(&self.repo)),
        };

        // Walk position of each author's oldest commit.
        let mut oldest: HashMap<(String, String), usize> = HashMap::new();
        let mut commits = 0usize;

        for oid_result in revwalk {
            if let Some(limit) = self.timeout {
                let elapsed = started.elapsed();
                if elapsed > limit {
                    return Err(HistoryError::Timeout {
                        elapsed_ms: elapsed.as_millis(),
                        commits,
                    });
                }
            }

            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            oldest.insert(identities.resolve(&commit.author()), commits);
            commits += 1;
        }

        let mut ordered: Vec<_> = oldest.into_iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        let authors: Vec<CommitAuthor> = ordered
            .into_iter()
            .map(|((name, email), _)| CommitAuthor { name, email })
            .collect();

        info!(commits, authors = authors.len(), "collected commit authors");
        Ok(authors)
    }

    /// Resolve a revision expression (SHA, branch, tag) to a commit id.
    fn resolve(&self, rev: &str) -> Result<Oid, HistoryError> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|_| HistoryError::UnknownRevision(rev.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| HistoryError::UnknownRevision(rev.to_string()))?;
        Ok(commit.id())
    }
}
