pub mod types;

pub use types::{IssueRecord, RepoTarget};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_LIMIT: u32 = 5;

const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = "issue-fetcher";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Repository {owner}/{repo} not found or is private")]
    NotFound { owner: String, repo: String },

    #[error("GitHub API rate limit exceeded, retry later")]
    RateLimited,

    #[error("Authentication required: consider providing a GitHub token")]
    Unauthorized,

    #[error("GitHub API error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {}", with_causes(.0))]
    Transport(#[source] reqwest::Error),

    #[error("Invalid response body: {}", with_causes(.0))]
    Decode(#[source] reqwest::Error),
}

/// reqwest only prints its outermost layer; the actual reason (refused
/// connection, DNS failure, bad JSON) lives further down the source chain.
fn with_causes(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        cause = inner.source();
    }
    message
}

#[derive(Debug, Error)]
#[error("Invalid repository '{0}': expected owner/repo")]
pub struct InvalidRepository(pub String);

/// Split an `owner/repo` slug into a RepoTarget.
///
/// Only the shape is checked here. Whether the repository exists is left
/// to the API.
pub fn parse_repo_slug(slug: &str) -> Result<RepoTarget, InvalidRepository> {
    let mut parts = slug.trim().split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Ok(RepoTarget {
                owner: owner.to_string(),
                repo: repo.to_string(),
            })
        }
        _ => Err(InvalidRepository(slug.to_string())),
    }
}

/// Anything that can hand back the newest issues of a repository.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn fetch_issues(
        &self,
        owner: &str,
        repo: &str,
        limit: u32,
    ) -> Result<Vec<IssueRecord>, FetchError>;
}

/// Thin client over the GitHub REST issues endpoint.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
}

impl GitHubClient {
    /// Build a client rooted at `api_base` (e.g., https://api.github.com).
    ///
    /// Redirects are not followed: anything but a 200 is reported as a failure.
    pub fn new(api_base: impl Into<String>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch up to `limit` issues (open and closed), newest first.
    ///
    /// One request, one page. `limit` goes out unchanged as `per_page`.
    #[instrument(skip(self), fields(api_base = %self.api_base))]
    pub async fn fetch_issues(
        &self,
        owner: &str,
        repo: &str,
        limit: u32,
    ) -> Result<Vec<IssueRecord>, FetchError> {
        let url = format!("{}/repos/{}/{}/issues", self.api_base, owner, repo);
        let per_page = limit.to_string();

        debug!(%url, "requesting issues from GitHub API");
        let response = self
            .http
            .get(&url)
            .header(ACCEPT, GITHUB_V3_JSON)
            .query(&[
                ("state", "all"),
                ("per_page", per_page.as_str()),
                ("sort", "created"),
                ("direction", "desc"),
            ])
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        debug!(status = status.as_u16(), "received response");
        if status != StatusCode::OK {
            let err = classify_failure(owner, repo, response).await;
            warn!(status = status.as_u16(), error = %err, "issue request failed");
            return Err(err);
        }

        let issues = response
            .json::<Vec<IssueRecord>>()
            .await
            .map_err(FetchError::Decode)?;
        debug!(count = issues.len(), "decoded issues");
        Ok(issues)
    }
}

#[async_trait]
impl IssueSource for GitHubClient {
    async fn fetch_issues(
        &self,
        owner: &str,
        repo: &str,
        limit: u32,
    ) -> Result<Vec<IssueRecord>, FetchError> {
        GitHubClient::fetch_issues(self, owner, repo, limit).await
    }
}

/// Error payload GitHub sends alongside most non-2xx statuses.
#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

async fn classify_failure(owner: &str, repo: &str, response: reqwest::Response) -> FetchError {
    let status = response.status();
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
        },
        StatusCode::FORBIDDEN => FetchError::RateLimited,
        StatusCode::UNAUTHORIZED => FetchError::Unauthorized,
        _ => {
            let body = response.text().await.unwrap_or_default();
            let message = server_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
            FetchError::Http {
                status: status.as_u16(),
                message,
            }
        }
    }
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()?
        .message
        .filter(|message| !message.is_empty())
}
