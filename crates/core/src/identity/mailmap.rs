//! The repository's identity map, as git resolves it.
//!
//! libgit2 reads `.mailmap` in the working tree plus the `mailmap.file` and
//! `mailmap.blob` settings, with the same lenient parser as `git log
//! --use-mailmap`: lines it cannot read are skipped.

use git2::{Repository, Signature};
use tracing::{debug, warn};

/// Resolves commit signatures through the repository's mailmap.
///
/// Not `Send`, so it lives inside a single history walk rather than behind
/// the [`Canonicalize`](super::Canonicalize) trait.
pub struct Mailmap {
    inner: Option<git2::Mailmap>,
}

impl Mailmap {
    /// Load the mailmap configured for `repo`.
    ///
    /// A mailmap that cannot be loaded at all leaves identities unchanged.
    pub fn for_repository(repo: &Repository) -> Self {
        match repo.mailmap() {
            Ok(map) => {
                debug!("loaded repository mailmap");
                Self { inner: Some(map) }
            }
            Err(e) => {
                warn!(error = %e, "mailmap unavailable, using raw identities");
                Self { inner: None }
            }
        }
    }

    #[cfg(test)]
    fn from_buffer(text: &str) -> Self {
        Self {
            inner: Some(git2::Mailmap::from_buffer(text).unwrap()),
        }
    }

    /// Canonical `(name, email)` for a commit signature.
    pub fn resolve(&self, signature: &Signature<'_>) -> (String, String) {
        let resolved = self
            .inner
            .as_ref()
            .and_then(|map| match map.resolve_signature(signature) {
                Ok(sig) => Some(sig),
                Err(e) => {
                    debug!(error = %e, "mailmap lookup failed, keeping raw identity");
                    None
                }
            });
        let sig: &Signature<'_> = match &resolved {
            Some(sig) => sig,
            None => signature,
        };
        (
            String::from_utf8_lossy(sig.name_bytes()).into_owned(),
            String::from_utf8_lossy(sig.email_bytes()).into_owned(),
        )
    }
}
