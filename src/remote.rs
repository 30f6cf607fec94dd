//! Works out which hosted repository the current working tree belongs to.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::runner::CommandRunner;

static OWNER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*[:/](?P<owner>[^/]+)/[^/]+$").expect("owner pattern is valid")
});

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("No 'upstream' or 'origin' remote configured (found: {0:?})")]
    NoRemote(Vec<String>),

    #[error("Failed to get owner from {0}")]
    UnparseableUrl(String),

    #[error("Failed to get repository name from {0:?}")]
    NoRepositoryName(String),
}

/// Owner and name of the repository being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Resolve the repository for the current working tree.
///
/// The owner comes from the `upstream` remote (or `origin` when there is no
/// `upstream`). The name is the base name of the top-level checkout
/// directory, so a checkout renamed locally reports the local name.
#[instrument(skip(runner))]
pub fn resolve_repository<R: CommandRunner>(
    runner: &R,
    git: &str,
) -> Result<Repository, RemoteError> {
    let remotes = git_output(runner, git, &["remote"])?;
    let remote = select_remote(remotes.lines())?;
    debug!(remote, "selected remote");

    let url = git_output(runner, git, &["remote", "get-url", remote])?;
    let owner = parse_owner(&url)?;

    let toplevel = git_output(runner, git, &["rev-parse", "--show-toplevel"])?;
    let name = repository_name(&toplevel)?;

    let repository = Repository { owner, name };
    debug!(%repository, "resolved repository");
    Ok(repository)
}

/// Pick `upstream` if configured, else `origin`.
pub fn select_remote<'a>(
    remotes: impl IntoIterator<Item = &'a str>,
) -> Result<&'static str, RemoteError> {
    let remotes: Vec<&str> = remotes.into_iter().map(str::trim).collect();
    if remotes.contains(&"upstream") {
        Ok("upstream")
    } else if remotes.contains(&"origin") {
        Ok("origin")
    } else {
        Err(RemoteError::NoRemote(
            remotes.iter().map(|r| r.to_string()).collect(),
        ))
    }
}

/// Extract the owner segment from an SSH (`host:owner/repo`) or HTTPS
/// (`https://host/owner/repo`) remote URL.
pub fn parse_owner(url: &str) -> Result<String, RemoteError> {
    let url = url.trim();
    OWNER_PATTERN
        .captures(url)
        .map(|caps| caps["owner"].to_string())
        .ok_or_else(|| RemoteError::UnparseableUrl(url.to_string()))
}

fn repository_name(toplevel: &str) -> Result<String, RemoteError> {
    Path::new(toplevel.trim())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| RemoteError::NoRepositoryName(toplevel.to_string()))
}

fn git_output<R: CommandRunner>(runner: &R, git: &str, args: &[&str]) -> Result<String, RemoteError> {
    let output = runner.run(git, args).map_err(|source| RemoteError::Spawn {
        program: git.to_string(),
        source,
    })?;
    if !output.success {
        return Err(RemoteError::CommandFailed(format!("{} {}", git, args.join(" "))));
    }
    Ok(output.stdout.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FakeRunner;

    #[test]
    fn test_select_remote_prefers_upstream() {
        assert_eq!(select_remote(["origin", "upstream"]).unwrap(), "upstream");
        assert_eq!(select_remote(["fork", "origin"]).unwrap(), "origin");
    }

    #[test]
    fn test_select_remote_none() {
        let err = select_remote(["fork"]).unwrap_err();
        assert!(matches!(err, RemoteError::NoRemote(ref found) if found == &["fork"]));
        assert!(select_remote(std::iter::empty()).is_err());
    }

    #[test]
    fn test_parse_owner_ssh_and_https() {
        assert_eq!(parse_owner("git@github.com:alice/tool.git").unwrap(), "alice");
        assert_eq!(parse_owner("https://github.com/bob/tool").unwrap(), "bob");
        assert_eq!(parse_owner("https://github.com/bob/tool.git\n").unwrap(), "bob");
    }

    #[test]
    fn test_parse_owner_unparseable() {
        let err = parse_owner("not-a-remote").unwrap_err();
        assert_eq!(err.to_string(), "Failed to get owner from not-a-remote");
    }

    #[test]
    fn test_resolve_repository_uses_directory_name() {
        let runner = FakeRunner::new()
            .ok("git", &["remote"], "origin\nupstream\n")
            .ok("git", &["remote", "get-url", "upstream"], "git@github.com:acme/hosted-name.git\n")
            .ok("git", &["rev-parse", "--show-toplevel"], "/home/me/src/local-name\n");
        let repository = resolve_repository(&runner, "git").unwrap();
        assert_eq!(repository.owner, "acme");
        assert_eq!(repository.name, "local-name");
        assert_eq!(repository.to_string(), "acme/local-name");
    }

    #[test]
    fn test_resolve_repository_git_failure_is_fatal() {
        let runner = FakeRunner::new().fail("git", &["remote"], "");
        let err = resolve_repository(&runner, "git").unwrap_err();
        assert!(matches!(err, RemoteError::CommandFailed(_)));
    }
}
