//! Ignore rules applied to commit authors before matching.

use crate::config::CheckConfig;
use crate::models::CommitAuthor;

const GITHUB_NOREPLY_DOMAIN: &str = "users.noreply.github.com";
const BOT_SUFFIX: &str = "[bot]";

/// Why an author was excluded from the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    Email,
    Login(String),
    Bot,
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "ignored email"),
            Self::Login(login) => write!(f, "ignored login '{login}'"),
            Self::Bot => write!(f, "bot account"),
        }
    }
}

/// Applies the ignore lists of a [`CheckConfig`].
pub struct IgnoreFilter<'a> {
    config: &'a CheckConfig,
}

impl<'a> IgnoreFilter<'a> {
    pub fn new(config: &'a CheckConfig) -> Self {
        Self { config }
    }

    pub fn is_ignored(&self, author: &CommitAuthor) -> bool {
        self.reason(author).is_some()
    }

    /// The first rule excluding `author`, if any.
    pub fn reason(&self, author: &CommitAuthor) -> Option<IgnoreReason> {
        if self
            .config
            .ignore_emails()
            .contains(&author.email.trim().to_lowercase())
        {
            return Some(IgnoreReason::Email);
        }

        if let Some(login) = derived_logins(author)
            .into_iter()
            .find(|login| self.config.ignore_logins().contains(login))
        {
            return Some(IgnoreReason::Login(login));
        }

        if self.config.ignore_bots() && author.name.trim().to_lowercase().ends_with(BOT_SUFFIX) {
            return Some(IgnoreReason::Bot);
        }

        None
    }
}

/// Lowercased login-like tokens for an author: the trimmed display name,
/// plus the login embedded in a GitHub noreply address.
pub fn derived_logins(author: &CommitAuthor) -> Vec<String> {
    let mut logins = Vec::with_capacity(2);

    let name = author.name.trim().to_lowercase();
    if !name.is_empty() {
        logins.push(name);
    }

    let email = author.email.trim().to_lowercase();
    if let Some((local, domain)) = email.rsplit_once('@') {
        if domain == GITHUB_NOREPLY_DOMAIN {
            // `12345+login@...` or the older `login@...`.
            let login = local.split_once('+').map_or(local, |(_, login)| login);
            if !login.is_empty() && !logins.iter().any(|l| l == login) {
                logins.push(login.to_string());
            }
        }
    }

    logins
}
