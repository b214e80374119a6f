//! Error types for the contrib-checker core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CheckError`] enum unifies them for callers of the
//! [`ContributorChecker`](crate::ContributorChecker).

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type returned by a contributor check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// History errors
// ---------------------------------------------------------------------------

/// The commit history could not be read. Always fatal for the check.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The path does not exist or is not a git repository.
    #[error("history unavailable: git repository not found at '{0}'")]
    RepositoryNotFound(String),

    /// A revision in the requested range could not be resolved.
    #[error("history unavailable: unknown revision '{0}'")]
    UnknownRevision(String),

    /// The history walk exceeded the caller-supplied deadline.
    #[error("history unavailable: walk timed out after {elapsed_ms} ms ({commits} commits read)")]
    Timeout { elapsed_ms: u128, commits: usize },

    /// Any other `git2` failure while walking history.
    #[error("history unavailable: {0}")]
    Git(#[from] git2::Error),
}

// ---------------------------------------------------------------------------
// Metadata errors
// ---------------------------------------------------------------------------

/// Errors from reading `CITATION.cff` / `codemeta.json`.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Neither metadata file exists in the repository.
    #[error("no metadata found: neither CITATION.cff nor codemeta.json exists in '{0}'")]
    NoMetadataFound(String),

    /// An existing metadata file is structurally invalid.
    #[error("failed to parse {file}: {detail}")]
    Parse { file: String, detail: String },

    /// The file exists but could not be read.
    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from building or loading a [`CheckConfig`](crate::CheckConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// YAML / TOML parse error, including unknown keys.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Platform errors
// ---------------------------------------------------------------------------

/// Errors from the GitHub / GitLab reporting wrappers.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// HTTP-level transport error (network, TLS, etc.).
    #[error("{platform} HTTP error: {source}")]
    Http {
        platform: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The API returned a non-success status code.
    #[error("{platform} API error (HTTP {status}): {body}")]
    Api {
        platform: &'static str,
        status: u16,
        body: String,
    },

    /// A required environment variable is missing.
    #[error("{platform} environment incomplete: missing {missing}")]
    MissingEnv {
        platform: &'static str,
        missing: String,
    },
}
