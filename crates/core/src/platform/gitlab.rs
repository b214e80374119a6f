//! GitLab CI wrapper.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info, instrument};

use super::{check_response, comment_body, env_value, Platform};
use crate::config::{
    CheckConfig, EnvOverrideNames, RawCheckConfig, DEFAULT_IGNORE_EMAILS, DEFAULT_IGNORE_LOGINS,
};
use crate::errors::{ConfigError, PlatformError};
use crate::history::CommitRange;
use crate::report::CheckResult;

const PLATFORM: &str = "GitLab";
const DEFAULT_API_URL: &str = "https://gitlab.com/api/v4";

/// CI variables that override the defaults.
pub const ENV_OVERRIDES: EnvOverrideNames = EnvOverrideNames {
    mode: "MODE",
    ignore_emails: "IGNORE_EMAILS",
    ignore_logins: "IGNORE_LOGINS",
};

/// Merge request context and REST client for one GitLab CI job.
#[derive(Clone)]
pub struct GitLabPlatform {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
    project_id: Option<String>,
    mr_iid: Option<String>,
    target_sha: Option<String>,
    source_sha: Option<String>,
}

impl GitLabPlatform {
    /// Read the job context from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = env_value(&lookup, "CI_API_V4_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("contrib-checker/0.1"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("failed to build reqwest client");

        let platform = Self {
            http,
            api_url,
            token: env_value(&lookup, "GITLAB_TOKEN"),
            project_id: env_value(&lookup, "CI_PROJECT_ID"),
            mr_iid: env_value(&lookup, "CI_MERGE_REQUEST_IID"),
            target_sha: env_value(&lookup, "CI_MERGE_REQUEST_TARGET_BRANCH_SHA"),
            source_sha: env_value(&lookup, "CI_COMMIT_SHA"),
        };
        info!(
            api_url = %platform.api_url,
            project = platform.project_id.as_deref().unwrap_or("-"),
            mr = platform.mr_iid.as_deref().unwrap_or("-"),
            token = platform.token.is_some(),
            "read GitLab context"
        );
        platform
    }

    /// Defaults plus GitLab's own bot identities, then CI variable
    /// overrides. GitLab jobs do not read a config file.
    pub fn raw_config<F>(lookup: F) -> RawCheckConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        RawCheckConfig::defaults()
            .with_ignore_emails(DEFAULT_IGNORE_EMAILS.iter().copied().chain(["noreply@gitlab.com"]))
            .with_ignore_logins(DEFAULT_IGNORE_LOGINS.iter().copied().chain(["gitlab-bot"]))
            .merge(RawCheckConfig::from_env_with(ENV_OVERRIDES, lookup))
    }

    pub fn load_config<F>(lookup: F) -> Result<CheckConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::raw_config(lookup).validate()
    }

    fn comment_target(&self) -> Result<(String, &str), PlatformError> {
        match (&self.token, &self.project_id, &self.mr_iid) {
            (Some(token), Some(project), Some(iid)) => Ok((
                format!(
                    "{}/projects/{}/merge_requests/{}/notes",
                    self.api_url, project, iid
                ),
                token.as_str(),
            )),
            _ => {
                let missing: Vec<&str> = [
                    ("GITLAB_TOKEN", self.token.is_none()),
                    ("CI_PROJECT_ID", self.project_id.is_none()),
                    ("CI_MERGE_REQUEST_IID", self.mr_iid.is_none()),
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

impl Platform for GitLabPlatform {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn change_noun(&self) -> &'static str {
        "MR"
    }

    /// MR mode needs the MR IID and both branch tips.
    fn resolve_range(&self) -> Option<CommitRange> {
        match (&self.mr_iid, &self.target_sha, &self.source_sha) {
            (Some(_), Some(target), Some(source)) => Some(CommitRange::new(target, source)),
            _ => None,
        }
    }

    #[instrument(skip(self, result), fields(mr = self.mr_iid.as_deref()))]
    async fn report(&self, result: &CheckResult) -> Result<(), PlatformError> {
        let (url, token) = self.comment_target()?;
        let body = serde_json::json!({
            "body": comment_body(&result.missing_overall, self.change_noun()),
        });
        debug!(%url, "posting MR note");
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
        info!(missing = result.missing_overall.len(), "posted MR note");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::models::CommitAuthor;
    use crate::platform::test_support::{env, result_missing};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mr_env(api: &str) -> impl Fn(&str) -> Option<String> {
        env(&[
            ("CI_API_V4_URL", api),
            ("GITLAB_TOKEN", "glpat"),
            ("CI_PROJECT_ID", "42"),
            ("CI_MERGE_REQUEST_IID", "3"),
            ("CI_MERGE_REQUEST_TARGET_BRANCH_SHA", "target1"),
            ("CI_COMMIT_SHA", "source2"),
        ])
    }

    #[test]
    fn test_resolve_range_in_mr_mode() {
        let platform = GitLabPlatform::from_env_with(mr_env("http://localhost"));
        assert_eq!(
            platform.resolve_range(),
            Some(CommitRange::new("target1", "source2"))
        );
    }

    #[test]
    fn test_branch_pipeline_has_no_range() {
        let platform = GitLabPlatform::from_env_with(env(&[("CI_COMMIT_SHA", "source2")]));
        assert_eq!(platform.resolve_range(), None);
    }

    #[tokio::test]
    async fn test_report_posts_mr_note() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/42/merge_requests/3/notes"))
            .and(header("authorization", "Bearer glpat"))
            .and(body_string_contains("from this MR"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let platform = GitLabPlatform::from_env_with(mr_env(&server.uri()));
        platform
            .report(&result_missing(vec![CommitAuthor::new("Eve", "eve@x.com")]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_report_without_project_is_missing_env() {
        let platform = GitLabPlatform::from_env_with(env(&[("GITLAB_TOKEN", "glpat")]));
        assert!(matches!(
            platform.report(&result_missing(vec![])).await,
            Err(PlatformError::MissingEnv { .. })
        ));
    }

    #[test]
    fn test_config_defaults_include_gitlab_bots() {
        let config = GitLabPlatform::load_config(env(&[])).unwrap();
        assert!(config.ignore_emails().contains("noreply@gitlab.com"));
        assert!(config.ignore_logins().contains("gitlab-bot"));
        assert_eq!(config.mode(), Mode::Warn);
    }

    #[test]
    fn test_config_env_overrides() {
        let config = GitLabPlatform::load_config(env(&[
            ("MODE", "FAIL"),
            ("IGNORE_LOGINS", "release-bot"),
        ]))
        .unwrap();
        assert_eq!(config.mode(), Mode::Fail);
        assert_eq!(config.ignore_logins().len(), 1);
        assert!(config.ignore_emails().contains("noreply@gitlab.com"));
    }
}
