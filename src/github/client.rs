use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::TrackerError;
use super::types::{
    ApiErrorBody, AuthenticatedUser, IssuePatch, IssueQuery, IssueResponse, NewIssue, NewLabel,
};
use crate::reconcile::{RepoRef, TrackingRecord};

pub const API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("lintrack/", env!("CARGO_PKG_VERSION"));
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
const PAGE_SIZE: &str = "100";

/// The tracker operations the reconciler needs.
///
/// [`GitHubClient`] is the live implementation; tests substitute an
/// in-memory tracker. Implementations must surface failures as
/// [`TrackerError`] without retrying, so callers own the backoff policy.
#[allow(async_fn_in_trait)]
pub trait IssueTracker {
    /// Login of the identity the tracker is authenticated as.
    async fn authenticated_user(&self) -> Result<String, TrackerError>;

    /// Issues in any state matching `query`, newest first.
    async fn list_issues(
        &self,
        repo: &RepoRef,
        query: &IssueQuery,
    ) -> Result<Vec<TrackingRecord>, TrackerError>;

    /// Succeeds when the label exists; a missing label is a 404 [`TrackerError::Api`].
    async fn get_label(&self, repo: &RepoRef, name: &str) -> Result<(), TrackerError>;

    async fn create_label(&self, repo: &RepoRef, label: &NewLabel) -> Result<(), TrackerError>;

    async fn create_issue(
        &self,
        repo: &RepoRef,
        issue: &NewIssue,
    ) -> Result<TrackingRecord, TrackerError>;

    async fn update_issue(
        &self,
        repo: &RepoRef,
        number: u64,
        patch: &IssuePatch,
    ) -> Result<TrackingRecord, TrackerError>;
}

/// GitHub REST v3 client for issues and labels.
pub struct GitHubClient {
    token: String,
    client: Client,
    base_url: Url,
}

impl GitHubClient {
    pub fn new(token: String, timeout: Duration) -> Result<Self, TrackerError> {
        Self::with_base_url(token, API_URL, timeout)
    }

    /// Create a client pointing at a custom base URL (GitHub Enterprise, tests).
    pub fn with_base_url(
        token: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, TrackerError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TrackerError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TrackerError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            token,
            client,
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TrackerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TrackerError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn repo_endpoint(&self, repo: &RepoRef, rest: &[&str]) -> Result<Url, TrackerError> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str()];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, TrackerError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending tracker request");

        let response = self.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if is_rate_limited(status, response.headers()) {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(TrackerError::RateLimited {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                retry_after_secs,
            });
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .map(|body| body.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    text
                }
            });
        Err(TrackerError::Api {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, TrackerError> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| TrackerError::Decode(e.to_string()))
    }
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0")
}

impl IssueTracker for GitHubClient {
    async fn authenticated_user(&self) -> Result<String, TrackerError> {
        let url = self.endpoint(&["user"])?;
        let user: AuthenticatedUser = self.send_json(self.request(Method::GET, url)).await?;
        Ok(user.login)
    }

    async fn list_issues(
        &self,
        repo: &RepoRef,
        query: &IssueQuery,
    ) -> Result<Vec<TrackingRecord>, TrackerError> {
        let url = self.repo_endpoint(repo, &["issues"])?;
        let builder = self.request(Method::GET, url).query(&[
            ("state", "all"),
            ("creator", query.creator.as_str()),
            ("labels", query.label.as_str()),
            ("sort", "created"),
            ("direction", "desc"),
            ("per_page", PAGE_SIZE),
        ]);
        let issues: Vec<IssueResponse> = self.send_json(builder).await?;
        Ok(issues
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .map(TrackingRecord::from)
            .collect())
    }

    async fn get_label(&self, repo: &RepoRef, name: &str) -> Result<(), TrackerError> {
        let url = self.repo_endpoint(repo, &["labels", name])?;
        self.send(self.request(Method::GET, url)).await?;
        Ok(())
    }

    async fn create_label(&self, repo: &RepoRef, label: &NewLabel) -> Result<(), TrackerError> {
        let url = self.repo_endpoint(repo, &["labels"])?;
        self.send(self.request(Method::POST, url).json(label))
            .await?;
        Ok(())
    }

    async fn create_issue(
        &self,
        repo: &RepoRef,
        issue: &NewIssue,
    ) -> Result<TrackingRecord, TrackerError> {
        let url = self.repo_endpoint(repo, &["issues"])?;
        let created: IssueResponse = self
            .send_json(self.request(Method::POST, url).json(issue))
            .await?;
        Ok(created.into())
    }

    async fn update_issue(
        &self,
        repo: &RepoRef,
        number: u64,
        patch: &IssuePatch,
    ) -> Result<TrackingRecord, TrackerError> {
        let number = number.to_string();
        let url = self.repo_endpoint(repo, &["issues", number.as_str()])?;
        let updated: IssueResponse = self
            .send_json(self.request(Method::PATCH, url).json(patch))
            .await?;
        Ok(updated.into())
    }
}
