//! Metadata registry: declared contributors from `CITATION.cff` and
//! `codemeta.json`.
//!
//! A missing file contributes nothing. A file that fails to parse is
//! recorded in [`MetadataSet::errors`] and skipped as long as another
//! source loaded; only when no source is usable does loading fail.

pub mod citation;
pub mod codemeta;

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::errors::MetadataError;
use crate::models::{MetadataContributor, MetadataSource};

/// Contributors loaded from every usable metadata source.
#[derive(Debug, Default)]
pub struct MetadataSet {
    sources: BTreeMap<MetadataSource, Vec<MetadataContributor>>,
    errors: Vec<(MetadataSource, MetadataError)>,
}

impl MetadataSet {
    /// Sources that exist and parsed, in report order.
    pub fn sources(&self) -> impl Iterator<Item = (MetadataSource, &[MetadataContributor])> {
        self.sources.iter().map(|(s, c)| (*s, c.as_slice()))
    }

    /// Contributors of one source, or `None` if it is absent or unusable.
    pub fn contributors(&self, source: MetadataSource) -> Option<&[MetadataContributor]> {
        self.sources.get(&source).map(Vec::as_slice)
    }

    pub fn contains(&self, source: MetadataSource) -> bool {
        self.sources.contains_key(&source)
    }

    /// Failures of files that exist but were skipped, by source.
    pub fn errors(&self) -> &[(MetadataSource, MetadataError)] {
        &self.errors
    }

    fn insert(&mut self, source: MetadataSource, contributors: Vec<MetadataContributor>) {
        self.sources.insert(source, contributors);
    }
}

/// Reads the metadata documents of a repository.
pub struct MetadataRegistry;

impl MetadataRegistry {
    /// Load every metadata document present under `repo_path`.
    pub fn load<P: AsRef<Path>>(repo_path: P) -> Result<MetadataSet, MetadataError> {
        let repo_path = repo_path.as_ref();
        let mut set = MetadataSet::default();
        let mut found = 0usize;

        for source in MetadataSource::ALL {
            let path = repo_path.join(source.file_name());
            if !path.is_file() {
                debug!(file = source.file_name(), "metadata file not present");
                continue;
            }
            found += 1;

            match Self::load_source(source, &path) {
                Ok(contributors) => {
                    info!(
                        file = source.file_name(),
                        count = contributors.len(),
                        "loaded metadata contributors"
                    );
                    set.insert(source, contributors);
                }
                Err(e) => {
                    warn!(error = %e, "skipping unusable metadata file");
                    set.errors.push((source, e));
                }
            }
        }

        if found == 0 {
            return Err(MetadataError::NoMetadataFound(
                repo_path.display().to_string(),
            ));
        }
        if set.sources.is_empty() {
            // Every file present failed; report the first failure.
            return Err(set.errors.remove(0).1);
        }
        Ok(set)
    }

    fn load_source(
        source: MetadataSource,
        path: &Path,
    ) -> Result<Vec<MetadataContributor>, MetadataError> {
        let file = source.file_name().to_string();
        let contents = std::fs::read_to_string(path).map_err(|e| MetadataError::Io {
            file: file.clone(),
            source: e,
        })?;
        let parsed = match source {
            MetadataSource::CitationCff => citation::parse(&contents),
            MetadataSource::CodemetaJson => codemeta::parse(&contents),
        };
        parsed.map_err(|detail| MetadataError::Parse { file, detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CFF: &str = "authors:\n  - name: Alice\n    email: a@x.com\n";
    const CODEMETA: &str = r#"{"author": [{"name": "Bob", "email": "b@x.com"}]}"#;

    #[test]
    fn test_load_both_sources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("CITATION.cff"), CFF).unwrap();
        std::fs::write(dir.path().join("codemeta.json"), CODEMETA).unwrap();

        let set = MetadataRegistry::load(dir.path()).unwrap();
        let sources: Vec<MetadataSource> = set.sources().map(|(s, _)| s).collect();
        assert_eq!(
            sources,
            vec![MetadataSource::CitationCff, MetadataSource::CodemetaJson]
        );
        assert_eq!(set.contributors(MetadataSource::CitationCff).unwrap()[0].name, "Alice");
        assert!(set.errors().is_empty());
    }

    #[test]
    fn test_one_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("codemeta.json"), CODEMETA).unwrap();

        let set = MetadataRegistry::load(dir.path()).unwrap();
        assert!(!set.contains(MetadataSource::CitationCff));
        assert_eq!(set.contributors(MetadataSource::CodemetaJson).unwrap().len(), 1);
    }

    #[test]
    fn test_no_metadata_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MetadataRegistry::load(dir.path()),
            Err(MetadataError::NoMetadataFound(_))
        ));
    }

    #[test]
    fn test_parse_error_keeps_other_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("CITATION.cff"), "authors: [broken\n").unwrap();
        std::fs::write(dir.path().join("codemeta.json"), CODEMETA).unwrap();

        let set = MetadataRegistry::load(dir.path()).unwrap();
        assert!(!set.contains(MetadataSource::CitationCff));
        assert!(set.contains(MetadataSource::CodemetaJson));
        assert_eq!(set.errors().len(), 1);
        assert_eq!(set.errors()[0].0, MetadataSource::CitationCff);
    }

    #[test]
    fn test_parse_error_with_no_other_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("codemeta.json"), "{not json").unwrap();

        match MetadataRegistry::load(dir.path()) {
            Err(MetadataError::Parse { file, .. }) => assert_eq!(file, "codemeta.json"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
