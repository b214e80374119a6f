//! GitHub Actions wrapper.

use std::path::Path;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use tracing::{debug, info, instrument};

use super::{check_response, comment_body, env_value, Platform};
use crate::config::{CheckConfig, EnvOverrideNames, RawCheckConfig, DEFAULT_CONFIG_PATH};
use crate::errors::{ConfigError, PlatformError};
use crate::history::CommitRange;
use crate::report::CheckResult;

const PLATFORM: &str = "GitHub";
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Action inputs that override the config file.
pub const ENV_OVERRIDES: EnvOverrideNames = EnvOverrideNames {
    mode: "ACTION_MODE",
    ignore_emails: "ACTION_IGNORE_EMAILS",
    ignore_logins: "ACTION_IGNORE_LOGINS",
};

/// Pull request context and REST client for one GitHub Actions run.
#[derive(Clone)]
pub struct GitHubPlatform {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
    repository: Option<String>,
    pr_number: Option<String>,
    base_sha: Option<String>,
    head_sha: Option<String>,
}

impl GitHubPlatform {
    /// Read the run context from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = env_value(&lookup, "GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("contrib-checker/0.1"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("failed to build reqwest client");

        let platform = Self {
            http,
            api_url,
            token: env_value(&lookup, "GITHUB_TOKEN"),
            repository: env_value(&lookup, "GITHUB_REPOSITORY"),
            pr_number: env_value(&lookup, "PR_NUMBER"),
            base_sha: env_value(&lookup, "PR_BASE_SHA"),
            head_sha: env_value(&lookup, "PR_HEAD_SHA"),
        };
        info!(
            api_url = %platform.api_url,
            repository = platform.repository.as_deref().unwrap_or("-"),
            pr = platform.pr_number.as_deref().unwrap_or("-"),
            token = platform.token.is_some(),
            "read GitHub context"
        );
        platform
    }

    /// Defaults, then `.github/contrib-metadata-check.yml` if present, then
    /// action input overrides.
    pub fn raw_config<P, F>(repo_path: P, lookup: F) -> Result<RawCheckConfig, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = RawCheckConfig::defaults();
        let file = repo_path.as_ref().join(DEFAULT_CONFIG_PATH);
        if file.is_file() {
            raw = raw.merge(RawCheckConfig::load_from_file(&file)?);
        } else {
            debug!(path = %file.display(), "no repository config file");
        }
        Ok(raw.merge(RawCheckConfig::from_env_with(ENV_OVERRIDES, lookup)))
    }

    pub fn load_config<P, F>(repo_path: P, lookup: F) -> Result<CheckConfig, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        Self::raw_config(repo_path, lookup)?.validate()
    }

    fn comment_target(&self) -> Result<(String, &str), PlatformError> {
        match (&self.token, &self.repository, &self.pr_number) {
            (Some(token), Some(repo), Some(pr)) => Ok((
                format!("{}/repos/{}/issues/{}/comments", self.api_url, repo, pr),
                token.as_str(),
            )),
            _ => {
                let missing: Vec<&str> = [
                    ("GITHUB_TOKEN", self.token.is_none()),
                    ("GITHUB_REPOSITORY", self.repository.is_none()),
                    ("PR_NUMBER", self.pr_number.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, unset)| unset.then_some(name))
                .collect();
                Err(PlatformError::MissingEnv {
                    platform: PLATFORM,
                    missing: missing.join(", "),
                })
            }
        }
    }
}

impl Platform for GitHubPlatform {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn change_noun(&self) -> &'static str {
        "PR"
    }

    /// PR mode needs the base, the head and the PR number.
    fn resolve_range(&self) -> Option<CommitRange> {
        match (&self.base_sha, &self.head_sha, &self.pr_number) {
            (Some(base), Some(head), Some(_)) => Some(CommitRange::new(base, head)),
            _ => None,
        }
    }

    #[instrument(skip(self, result), fields(pr = self.pr_number.as_deref()))]
    async fn report(&self, result: &CheckResult) -> Result<(), PlatformError> {
        let (url, token) = self.comment_target()?;
        let body = serde_json::json!({
            "body": comment_body(&result.missing_overall, self.change_noun()),
        });
        debug!(%url, "posting PR comment");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|source| PlatformError::Http {
                platform: PLATFORM,
                source,
            })?;
        check_response(PLATFORM, resp).await?;
        info!(missing = result.missing_overall.len(), "posted PR comment");
        Ok(())
    }
}
