use crate::config::ConfigError;
use crate::issues::types::IssueState;
use crate::issues::{FetchError, InvalidRepository, IssueRecord, IssueSource, RepoTarget};
use colored::Colorize;
use std::error::Error;
use tracing::{debug, info, instrument};

const DELIMITER: &str = "----------------------------------------";

/// Fetch the target's newest issues once and print them to stdout.
///
/// Nothing is printed beyond the progress line when the fetch fails; the
/// caller decides how to surface the error. Returns the number of issues shown.
#[instrument(skip(source), fields(target = %target))]
pub async fn run(
    source: &dyn IssueSource,
    target: &RepoTarget,
    limit: u32,
) -> Result<usize, FetchError> {
    println!("Fetching up to {} issues from {}...", limit, target);

    info!("fetching issues");
    let issues = source
        .fetch_issues(&target.owner, &target.repo, limit)
        .await?;
    info!(count = issues.len(), "fetch complete");

    print!("{}", render_issues(&issues));
    Ok(issues.len())
}

/// Render every issue as a block, in the order given.
///
/// #42 Add OAuth2 login flow
/// State:   open
/// Author:  alice
/// Created: 2024-03-01T12:00:00Z
/// URL:     https://github.com/org/repo/issues/42
/// ----------------------------------------
pub fn render_issues(issues: &[IssueRecord]) -> String {
    if issues.is_empty() {
        debug!("no issues to render");
        return "No issues found.\n".to_string();
    }
    issues.iter().map(render_issue).collect()
}

fn render_issue(issue: &IssueRecord) -> String {
    let mut block = String::new();
    block.push_str(&format!(
        "{}\n",
        format!("#{} {}", issue.number, issue.title).bold()
    ));
    block.push_str(&format!("State:   {}\n", colorize_state(issue.state)));
    block.push_str(&format!("Author:  {}\n", issue.author.login));
    block.push_str(&format!("Created: {}\n", issue.created_at));
    block.push_str(&format!("URL:     {}\n", issue.url));
    block.push_str(DELIMITER);
    block.push('\n');
    block
}

fn colorize_state(state: IssueState) -> colored::ColoredString {
    match state {
        IssueState::Open => "open".green(),
        IssueState::Closed => "closed".red(),
    }
}

/// Human-readable message for a failed run.
/// Errors this tool does not define collapse to "Unknown error".
pub fn describe_failure(err: &(dyn Error + 'static)) -> String {
    if let Some(err) = err.downcast_ref::<FetchError>() {
        err.to_string()
    } else if let Some(err) = err.downcast_ref::<ConfigError>() {
        err.to_string()
    } else if let Some(err) = err.downcast_ref::<InvalidRepository>() {
        err.to_string()
    } else {
        "Unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::types::Author;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn sample_issue(number: u64, state: IssueState) -> IssueRecord {
        IssueRecord {
            id: 100 + number,
            number,
            title: format!("Issue number {}", number),
            state,
            created_at: "2024-03-01T12:00:00Z".to_string(),
            url: format!("https://github.com/org/repo/issues/{}", number),
            author: Author {
                login: "alice".to_string(),
                avatar_url: "https://avatars.githubusercontent.com/u/1".to_string(),
            },
        }
    }

    fn target() -> RepoTarget {
        RepoTarget {
            owner: "org".to_string(),
            repo: "repo".to_string(),
        }
    }

    /// Returns a fixed list and records every call it receives.
    struct StaticSource {
        issues: Vec<IssueRecord>,
        calls: Mutex<Vec<(String, String, u32)>>,
    }

    impl StaticSource {
        fn new(issues: Vec<IssueRecord>) -> Self {
            Self {
                issues,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IssueSource for StaticSource {
        async fn fetch_issues(
            &self,
            owner: &str,
            repo: &str,
            limit: u32,
        ) -> Result<Vec<IssueRecord>, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((owner.to_string(), repo.to_string(), limit));
            Ok(self.issues.clone())
        }
    }

    struct RateLimitedSource;

    #[async_trait]
    impl IssueSource for RateLimitedSource {
        async fn fetch_issues(
            &self,
            _owner: &str,
            _repo: &str,
            _limit: u32,
        ) -> Result<Vec<IssueRecord>, FetchError> {
            Err(FetchError::RateLimited)
        }
    }

    #[test]
    fn test_render_issue_block() {
        let rendered = render_issues(&[sample_issue(42, IssueState::Open)]);
        assert!(rendered.contains("#42 Issue number 42"));
        assert!(rendered.contains("State:"));
        assert!(rendered.contains("open"));
        assert!(rendered.contains("Author:  alice"));
        assert!(rendered.contains("Created: 2024-03-01T12:00:00Z"));
        assert!(rendered.contains("URL:     https://github.com/org/repo/issues/42"));
        assert!(rendered.trim_end().ends_with(DELIMITER));
    }

    #[test]
    fn test_render_keeps_order() {
        let rendered = render_issues(&[
            sample_issue(3, IssueState::Open),
            sample_issue(1, IssueState::Closed),
        ]);
        let third = rendered.find("#3 ").unwrap();
        let first = rendered.find("#1 ").unwrap();
        assert!(third < first);
        assert_eq!(rendered.matches(DELIMITER).count(), 2);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_issues(&[]), "No issues found.\n");
    }

    #[tokio::test]
    async fn test_run_forwards_target_and_limit() {
        let source = StaticSource::new(vec![
            sample_issue(2, IssueState::Open),
            sample_issue(1, IssueState::Closed),
        ]);

        let shown = run(&source, &target(), 7).await.unwrap();
        assert_eq!(shown, 2);

        let calls = source.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("org".to_string(), "repo".to_string(), 7)]);
    }

    #[tokio::test]
    async fn test_run_with_no_issues_is_success() {
        let source = StaticSource::new(vec![]);
        let shown = run(&source, &target(), 5).await.unwrap();
        assert_eq!(shown, 0);
    }

    #[tokio::test]
    async fn test_run_propagates_fetch_error() {
        let err = run(&RateLimitedSource, &target(), 5).await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited));
    }

    #[test]
    fn test_describe_known_failures() {
        let err: Box<dyn Error> = Box::new(FetchError::NotFound {
            owner: "org".to_string(),
            repo: "repo".to_string(),
        });
        assert_eq!(
            describe_failure(err.as_ref()),
            "Repository org/repo not found or is private"
        );

        let err: Box<dyn Error> = Box::new(InvalidRepository("nope".to_string()));
        assert!(describe_failure(err.as_ref()).contains("expected owner/repo"));
    }

    #[test]
    fn test_describe_unknown_failure() {
        let err: Box<dyn Error> = Box::new(std::fmt::Error);
        assert_eq!(describe_failure(err.as_ref()), "Unknown error");
    }
}
