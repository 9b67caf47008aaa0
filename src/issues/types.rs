use serde::Deserialize;

/// Lifecycle state of an issue, exactly as reported by the GitHub API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueState::Open => write!(f, "open"),
            IssueState::Closed => write!(f, "closed"),
        }
    }
}

/// The account that opened an issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub login: String,
    #[allow(dead_code)] // Deserialized for completeness, not shown in the summary
    pub avatar_url: String,
}

/// One issue from `GET /repos/{owner}/{repo}/issues`.
/// Fields not listed here are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueRecord {
    /// Global, server-assigned identifier
    #[allow(dead_code)]
    pub id: u64,
    /// Repository-local issue number (e.g., 42)
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    /// ISO 8601 timestamp, kept as the server sent it
    pub created_at: String,
    /// Web page of the issue
    #[serde(rename = "html_url")]
    pub url: String,
    #[serde(rename = "user")]
    pub author: Author,
}

/// Owner/repository pair naming the repository to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
