pub mod types;

pub use types::{EntryDetail, EntryKind, ReviewComment};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::references::Reference;
use crate::remote::Repository;
use crate::runner::CommandRunner;

const DETAIL_FIELDS: &str = "title,body,comments";

#[derive(Debug, Error)]
pub enum HostingError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {what} response: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Thin wrapper over the hosting CLI (`gh` by default).
pub struct HostingCli<'a, R> {
    runner: &'a R,
    program: String,
}

impl<'a, R: CommandRunner> HostingCli<'a, R> {
    pub fn new(runner: &'a R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// Run the CLI and return stdout without trailing whitespace.
    /// A non-zero exit is not an error; the caller gets whatever was printed.
    pub fn run_command(&self, args: &[&str]) -> Result<String, HostingError> {
        let output = self.spawn(args)?;
        if !output.success {
            debug!(program = %self.program, ?args, "command exited non-zero, using its output anyway");
        }
        Ok(output.stdout.trim_end().to_string())
    }

    /// Plain-text view of a pull request.
    pub fn view_pull_request(&self, id: &str) -> Result<String, HostingError> {
        self.run_command(&["pr", "view", id])
    }

    /// Plain-text view of a pull request's comment thread.
    pub fn view_pull_request_comments(&self, id: &str) -> Result<String, HostingError> {
        self.run_command(&["pr", "view", id, "--comments"])
    }

    /// Inline review comments of a pull request.
    #[instrument(skip(self), fields(repository = %repository))]
    pub fn fetch_review_comments(
        &self,
        repository: &Repository,
        id: &str,
    ) -> Result<Vec<ReviewComment>, HostingError> {
        let endpoint = format!(
            "repos/{}/{}/pulls/{}/comments",
            repository.owner, repository.name, id
        );
        let json = self.run_command(&["api", &endpoint])?;
        let comments: Vec<ReviewComment> =
            serde_json::from_str(&json).map_err(|source| HostingError::Json {
                what: "review comments",
                source,
            })?;
        debug!(count = comments.len(), "fetched review comments");
        Ok(comments)
    }

    /// Look up a referenced entry, first as a pull request and then as an
    /// issue. `None` when neither lookup succeeds.
    #[instrument(skip(self), fields(reference = %reference))]
    pub fn fetch_entry_details(
        &self,
        reference: &Reference,
    ) -> Result<Option<(EntryDetail, EntryKind)>, HostingError> {
        let repo = format!("{}/{}", reference.owner, reference.repo);
        for (subcommand, kind) in [("pr", EntryKind::PullRequest), ("issue", EntryKind::Issue)] {
            let args = [
                subcommand,
                "view",
                reference.id.as_str(),
                "--json",
                DETAIL_FIELDS,
                "--repo",
                repo.as_str(),
            ];
            let output = self.spawn(&args)?;
            if !output.success {
                debug!(subcommand, "lookup failed");
                continue;
            }
            let detail = serde_json::from_str(&output.stdout).map_err(|source| {
                HostingError::Json {
                    what: "entry detail",
                    source,
                }
            })?;
            debug!(%kind, "lookup succeeded");
            return Ok(Some((detail, kind)));
        }
        Ok(None)
    }

    fn spawn(&self, args: &[&str]) -> Result<crate::runner::CommandOutput, HostingError> {
        self.runner
            .run(&self.program, args)
            .map_err(|source| HostingError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FakeRunner;

    fn reference(id: &str) -> Reference {
        Reference::new("acme", "tool", id)
    }

    #[test]
    fn test_run_command_strips_trailing_whitespace() {
        let runner = FakeRunner::new().ok("gh", &["pr", "view", "5"], "  title\nbody \n\n");
        let cli = HostingCli::new(&runner, "gh");
        assert_eq!(cli.view_pull_request("5").unwrap(), "  title\nbody");
    }

    #[test]
    fn test_run_command_tolerates_failure() {
        let runner = FakeRunner::new().fail("gh", &["pr", "view", "5", "--comments"], "");
        let cli = HostingCli::new(&runner, "gh");
        assert_eq!(cli.view_pull_request_comments("5").unwrap(), "");
    }

    #[test]
    fn test_fetch_entry_details_prefers_pull_request() {
        let runner = FakeRunner::new().ok(
            "gh",
            &["pr", "view", "8", "--json", DETAIL_FIELDS, "--repo", "acme/tool"],
            r#"{"title":"Add cache","body":"b","comments":[]}"#,
        );
        let cli = HostingCli::new(&runner, "gh");
        let (detail, kind) = cli.fetch_entry_details(&reference("8")).unwrap().unwrap();
        assert_eq!(kind, EntryKind::PullRequest);
        assert_eq!(detail.title(), "Add cache");
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_fetch_entry_details_falls_back_to_issue() {
        let runner = FakeRunner::new().ok(
            "gh",
            &["issue", "view", "9", "--json", DETAIL_FIELDS, "--repo", "acme/tool"],
            r#"{"title":"T","body":"","comments":[]}"#,
        );
        let cli = HostingCli::new(&runner, "gh");
        let (detail, kind) = cli.fetch_entry_details(&reference("9")).unwrap().unwrap();
        assert_eq!(kind, EntryKind::Issue);
        assert_eq!(detail.title(), "T");
    }

    #[test]
    fn test_fetch_entry_details_both_fail() {
        let runner = FakeRunner::new();
        let cli = HostingCli::new(&runner, "gh");
        assert!(cli.fetch_entry_details(&reference("404")).unwrap().is_none());
        assert_eq!(runner.calls.borrow().len(), 2);
    }

    #[test]
    fn test_fetch_review_comments_malformed_json() {
        let runner = FakeRunner::new().ok(
            "gh",
            &["api", "repos/acme/tool/pulls/5/comments"],
            "not json",
        );
        let cli = HostingCli::new(&runner, "gh");
        let repository = Repository {
            owner: "acme".to_string(),
            name: "tool".to_string(),
        };
        let err = cli.fetch_review_comments(&repository, "5").unwrap_err();
        assert!(matches!(err, HostingError::Json { what: "review comments", .. }));
    }
}
