//! Commit author to metadata contributor matching.
//!
//! Two rules, first match wins: case-insensitive email equality, then
//! case-insensitive full-name equality. Names are compared after trimming
//! and collapsing whitespace runs; nothing else is normalized. There is no
//! substring, punctuation-insensitive or edit-distance matching.

use crate::models::{CommitAuthor, MetadataContributor};

/// Which rule matched an author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Email,
    Name,
}

/// Normalized form of a display name used for comparison.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Matches authors against the contributors of one metadata source.
pub struct IdentityMatcher {
    emails: Vec<String>,
    names: Vec<String>,
}

impl IdentityMatcher {
    pub fn new(contributors: &[MetadataContributor]) -> Self {
        let emails = contributors
            .iter()
            .filter_map(|c| c.email.as_deref())
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        let names = contributors
            .iter()
            .map(|c| normalize_name(&c.name))
            .filter(|n| !n.is_empty())
            .collect();
        Self { emails, names }
    }

    /// The rule that matched `author`, or `None` if it is not represented.
    pub fn matches(&self, author: &CommitAuthor) -> Option<MatchKind> {
        let email = author.email.trim().to_lowercase();
        if !email.is_empty() && self.emails.iter().any(|e| *e == email) {
            return Some(MatchKind::Email);
        }

        let name = normalize_name(&author.name);
        if !name.is_empty() && self.names.iter().any(|n| *n == name) {
            return Some(MatchKind::Name);
        }

        None
    }
}
