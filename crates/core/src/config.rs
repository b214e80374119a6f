//! Check configuration: loading, layering, and validation.
//!
//! Configuration is gathered as loosely-typed [`RawCheckConfig`] layers
//! (built-in defaults, an optional YAML/TOML file, environment overrides,
//! CLI flags) and then validated once into an immutable [`CheckConfig`].
//! Nothing downstream of [`RawCheckConfig::validate`] re-checks a value.

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

/// Default location of the repository-level config file.
pub const DEFAULT_CONFIG_PATH: &str = ".github/contrib-metadata-check.yml";

/// Default deadline for the history walk.
pub const DEFAULT_HISTORY_TIMEOUT_SECS: u64 = 60;

/// Emails ignored unless a layer replaces the list.
pub const DEFAULT_IGNORE_EMAILS: &[&str] = &["dependabot[bot]@users.noreply.github.com"];

/// Logins ignored unless a layer replaces the list.
pub const DEFAULT_IGNORE_LOGINS: &[&str] = &["dependabot[bot]"];

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Whether missing contributors fail the check or are only reported.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Warn,
    Fail,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "fail" => Ok(Self::Fail),
            other => Err(ConfigError::InvalidValue {
                field: "mode".into(),
                detail: format!("expected 'warn' or 'fail', got '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

// ---------------------------------------------------------------------------
// Validated config
// ---------------------------------------------------------------------------

/// Immutable, validated configuration for one or more checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    mode: Mode,
    ignore_emails: BTreeSet<String>,
    ignore_logins: BTreeSet<String>,
    ignore_bots: bool,
    history_timeout: Option<Duration>,
}

impl CheckConfig {
    /// Start from the built-in defaults; finish with
    /// [`RawCheckConfig::validate`].
    pub fn builder() -> RawCheckConfig {
        RawCheckConfig::defaults()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Lowercased emails to ignore.
    pub fn ignore_emails(&self) -> &BTreeSet<String> {
        &self.ignore_emails
    }

    /// Lowercased logins to ignore.
    pub fn ignore_logins(&self) -> &BTreeSet<String> {
        &self.ignore_logins
    }

    /// Whether display names ending in `[bot]` are ignored.
    pub fn ignore_bots(&self) -> bool {
        self.ignore_bots
    }

    /// Deadline for the history walk. `None` means unbounded.
    pub fn history_timeout(&self) -> Option<Duration> {
        self.history_timeout
    }

    /// The same configuration with a different mode.
    pub fn with_mode(&self, mode: Mode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }
}

/// Same values as `RawCheckConfig::defaults().validate()`.
impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Warn,
            ignore_emails: DEFAULT_IGNORE_EMAILS.iter().map(|e| e.to_string()).collect(),
            ignore_logins: DEFAULT_IGNORE_LOGINS.iter().map(|l| l.to_string()).collect(),
            ignore_bots: true,
            history_timeout: Some(Duration::from_secs(DEFAULT_HISTORY_TIMEOUT_SECS)),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw layers
// ---------------------------------------------------------------------------

/// One unvalidated configuration layer.
///
/// Every field is optional so layers can be merged; unknown keys in a config
/// file are rejected at parse time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RawCheckConfig {
    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub ignore_emails: Option<Vec<String>>,

    #[serde(default)]
    pub ignore_logins: Option<Vec<String>>,

    #[serde(default)]
    pub ignore_bots: Option<bool>,

    /// Seconds; `0` disables the deadline.
    #[serde(default)]
    pub history_timeout_secs: Option<u64>,
}

/// Names of the environment variables a CI platform uses for overrides.
#[derive(Debug, Clone, Copy)]
pub struct EnvOverrideNames {
    pub mode: &'static str,
    pub ignore_emails: &'static str,
    pub ignore_logins: &'static str,
}

impl RawCheckConfig {
    /// Built-in defaults shared by every entry point.
    pub fn defaults() -> Self {
        Self {
            mode: Some("warn".into()),
            ignore_emails: Some(DEFAULT_IGNORE_EMAILS.iter().map(|e| e.to_string()).collect()),
            ignore_logins: Some(DEFAULT_IGNORE_LOGINS.iter().map(|l| l.to_string()).collect()),
            ignore_bots: Some(true),
            history_timeout_secs: Some(DEFAULT_HISTORY_TIMEOUT_SECS),
        }
    }

    /// Load a layer from a YAML (`.yml`/`.yaml`) or TOML (`.toml`) file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            debug!("configuration file is empty");
            return Ok(Self::default());
        }

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let layer: Self = if is_toml {
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?
        };

        debug!("configuration parsed successfully");
        Ok(layer)
    }

    /// Build a layer from environment overrides read through `lookup`.
    ///
    /// List variables are comma-separated; blank variables are ignored.
    pub fn from_env_with<F>(names: EnvOverrideNames, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let split = |value: String| -> Vec<String> {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        };

        Self {
            mode: read(names.mode),
            ignore_emails: read(names.ignore_emails).map(split),
            ignore_logins: read(names.ignore_logins).map(split),
            ignore_bots: None,
            history_timeout_secs: None,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode.to_string());
        self
    }

    pub fn with_ignore_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_emails = Some(emails.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ignore_logins<I, S>(mut self, logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_logins = Some(logins.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ignore_bots(mut self, ignore_bots: bool) -> Self {
        self.ignore_bots = Some(ignore_bots);
        self
    }

    pub fn with_history_timeout_secs(mut self, secs: u64) -> Self {
        self.history_timeout_secs = Some(secs);
        self
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: RawCheckConfig) -> Self {
        Self {
            mode: other.mode.or(self.mode),
            ignore_emails: other.ignore_emails.or(self.ignore_emails),
            ignore_logins: other.ignore_logins.or(self.ignore_logins),
            ignore_bots: other.ignore_bots.or(self.ignore_bots),
            history_timeout_secs: other.history_timeout_secs.or(self.history_timeout_secs),
        }
    }

    /// Validate the merged layer into an immutable [`CheckConfig`].
    pub fn validate(self) -> Result<CheckConfig, ConfigError> {
        let mode = match self.mode.as_deref() {
            Some(m) => m.parse()?,
            None => Mode::default(),
        };

        let ignore_emails = normalize_list(
            "ignore_emails",
            self.ignore_emails.unwrap_or_default(),
            |entry| {
                if entry.contains('@') && !entry.contains(char::is_whitespace) {
                    Ok(())
                } else {
                    Err(format!("'{entry}' is not an email address"))
                }
            },
        )?;

        let ignore_logins = normalize_list(
            "ignore_logins",
            self.ignore_logins.unwrap_or_default(),
            |_| Ok(()),
        )?;

        let history_timeout = match self.history_timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(Duration::from_secs(DEFAULT_HISTORY_TIMEOUT_SECS)),
        };

        let config = CheckConfig {
            mode,
            ignore_emails,
            ignore_logins,
            ignore_bots: self.ignore_bots.unwrap_or(true),
            history_timeout,
        };
        debug!(
            mode = %config.mode,
            ignore_emails = config.ignore_emails.len(),
            ignore_logins = config.ignore_logins.len(),
            "configuration validated"
        );
        Ok(config)
    }
}

/// Trim and lowercase every entry, rejecting blanks and entries `check`
/// refuses.
fn normalize_list<F>(
    field: &str,
    entries: Vec<String>,
    check: F,
) -> Result<BTreeSet<String>, ConfigError>
where
    F: Fn(&str) -> Result<(), String>,
{
    let mut out = BTreeSet::new();
    for raw in entries {
        let entry = raw.trim();
        if entry.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: field.into(),
                detail: "entries must not be empty".into(),
            });
        }
        check(entry).map_err(|detail| ConfigError::InvalidValue {
            field: field.into(),
            detail,
        })?;
        out.insert(entry.to_lowercase());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const NAMES: EnvOverrideNames = EnvOverrideNames {
        mode: "ACTION_MODE",
        ignore_emails: "ACTION_IGNORE_EMAILS",
        ignore_logins: "ACTION_IGNORE_LOGINS",
    };

    #[test]
    fn test_defaults_validate() {
        let config = RawCheckConfig::defaults().validate().unwrap();
        assert_eq!(config.mode(), Mode::Warn);
        assert!(config
            .ignore_emails()
            .contains("dependabot[bot]@users.noreply.github.com"));
        assert!(config.ignore_logins().contains("dependabot[bot]"));
        assert!(config.ignore_bots());
        assert_eq!(config.history_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_default_matches_validated_defaults() {
        assert_eq!(
            CheckConfig::default(),
            RawCheckConfig::defaults().validate().unwrap()
        );
        assert_eq!(CheckConfig::default(), CheckConfig::builder().validate().unwrap());
    }

    #[test]
    fn test_builder_setters() {
        let config = CheckConfig::builder()
            .with_mode(Mode::Fail)
            .with_ignore_emails(["ci@corp.example"])
            .with_ignore_bots(false)
            .with_history_timeout_secs(0)
            .validate()
            .unwrap();
        assert_eq!(config.mode(), Mode::Fail);
        assert_eq!(config.ignore_emails().len(), 1);
        assert!(config.ignore_logins().contains("dependabot[bot]"));
        assert!(!config.ignore_bots());
        assert_eq!(config.history_timeout(), None);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("FAIL".parse::<Mode>().unwrap(), Mode::Fail);
        assert_eq!(" warn ".parse::<Mode>().unwrap(), Mode::Warn);
        assert!(matches!(
            "strict".parse::<Mode>(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "mode"
        ));
    }

    #[test]
    fn test_ignore_lists_are_lowercased() {
        let raw = RawCheckConfig {
            ignore_emails: Some(vec!["  Bot@Example.COM ".into()]),
            ignore_logins: Some(vec!["CI-Runner".into()]),
            ..Default::default()
        };
        let config = raw.validate().unwrap();
        assert!(config.ignore_emails().contains("bot@example.com"));
        assert!(config.ignore_logins().contains("ci-runner"));
    }

    #[test]
    fn test_rejects_malformed_ignore_entries() {
        let raw = RawCheckConfig {
            ignore_emails: Some(vec!["not-an-email".into()]),
            ..Default::default()
        };
        assert!(matches!(
            raw.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "ignore_emails"
        ));

        let raw = RawCheckConfig {
            ignore_logins: Some(vec!["   ".into()]),
            ..Default::default()
        };
        assert!(matches!(
            raw.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "ignore_logins"
        ));
    }

    #[test]
    fn test_merge_later_layer_wins() {
        let file = RawCheckConfig {
            mode: Some("fail".into()),
            ignore_logins: Some(vec!["renovate[bot]".into()]),
            ..Default::default()
        };
        let merged = RawCheckConfig::defaults().merge(file);
        assert_eq!(merged.mode.as_deref(), Some("fail"));
        assert_eq!(merged.ignore_logins, Some(vec!["renovate[bot]".to_string()]));
        // Untouched fields keep the default layer's value.
        assert_eq!(
            merged.ignore_emails,
            Some(vec!["dependabot[bot]@users.noreply.github.com".to_string()])
        );
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let raw = RawCheckConfig {
            history_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(raw.validate().unwrap().history_timeout(), None);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ACTION_MODE", "fail"),
            ("ACTION_IGNORE_EMAILS", "a@x.com, b@x.com,,"),
            ("ACTION_IGNORE_LOGINS", "   "),
        ]);
        let layer = RawCheckConfig::from_env_with(NAMES, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(layer.mode.as_deref(), Some("fail"));
        assert_eq!(
            layer.ignore_emails,
            Some(vec!["a@x.com".to_string(), "b@x.com".to_string()])
        );
        assert_eq!(layer.ignore_logins, None);
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contrib-metadata-check.yml");
        std::fs::write(
            &path,
            "mode: fail\nignore_emails:\n  - ci@example.com\nignore_bots: false\n",
        )
        .unwrap();

        let layer = RawCheckConfig::load_from_file(&path).unwrap();
        let config = RawCheckConfig::defaults().merge(layer).validate().unwrap();
        assert_eq!(config.mode(), Mode::Fail);
        assert!(config.ignore_emails().contains("ci@example.com"));
        assert!(!config.ignore_bots());
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contrib-checker.toml");
        std::fs::write(&path, "mode = \"fail\"\nhistory_timeout_secs = 5\n").unwrap();

        let config = RawCheckConfig::load_from_file(&path)
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(config.mode(), Mode::Fail);
        assert_eq!(config.history_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "mode: warn\nignore_email: [a@x.com]\n").unwrap();
        assert!(matches!(
            RawCheckConfig::load_from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_empty_file_is_empty_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(
            RawCheckConfig::load_from_file(&path).unwrap(),
            RawCheckConfig::default()
        );
    }

    #[test]
    fn test_file_not_found() {
        let result = RawCheckConfig::load_from_file("/nonexistent/config.yml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
