//! Domain model types shared by the collector, registry, matcher and report.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Commit authors
// ---------------------------------------------------------------------------

/// A unified commit author identity, as read from history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CommitAuthor {
    /// Display name after identity unification.
    pub name: String,
    /// Email after identity unification.
    pub email: String,
}

impl CommitAuthor {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl std::fmt::Display for CommitAuthor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.email.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} <{}>", self.name, self.email)
        }
    }
}

// ---------------------------------------------------------------------------
// Metadata contributors
// ---------------------------------------------------------------------------

/// The metadata document a contributor was declared in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    CitationCff,
    CodemetaJson,
}

impl MetadataSource {
    /// All sources, in report order.
    pub const ALL: [MetadataSource; 2] = [Self::CitationCff, Self::CodemetaJson];

    /// File name of the source, relative to the repository root.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::CitationCff => "CITATION.cff",
            Self::CodemetaJson => "codemeta.json",
        }
    }
}

impl std::fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A person declared in a citation/credit metadata document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataContributor {
    pub name: String,
    pub email: Option<String>,
    /// ORCID or other persistent identifier.
    pub identifier: Option<String>,
    pub source: MetadataSource,
}

impl std::fmt::Display for MetadataContributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.email {
            Some(email) => write!(f, "{} <{}>", self.name, email),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_display() {
        let author = CommitAuthor::new("Jane Smith", "jane@example.com");
        assert_eq!(author.to_string(), "Jane Smith <jane@example.com>");
        assert_eq!(CommitAuthor::new("anon", "").to_string(), "anon");
    }

    #[test]
    fn test_source_file_names() {
        assert_eq!(MetadataSource::CitationCff.to_string(), "CITATION.cff");
        assert_eq!(MetadataSource::CodemetaJson.file_name(), "codemeta.json");
        let json = serde_json::to_string(&MetadataSource::CitationCff).unwrap();
        assert_eq!(json, "\"citation_cff\"");
    }
}
