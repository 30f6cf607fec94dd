use serde::Deserialize;
use std::fmt;

/// Which lookup succeeded for a linked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    PullRequest,
    Issue,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::PullRequest => write!(f, "PR"),
            EntryKind::Issue => write!(f, "Issue"),
        }
    }
}

/// `--json title,body,comments` response of `gh pr view` / `gh issue view`.
/// Missing or null fields read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryDetail {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub comments: Vec<EntryComment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryComment {
    #[serde(default)]
    pub body: Option<String>,
}

impl EntryDetail {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Body followed by every comment body, one per line.
    pub fn text(&self) -> String {
        let mut text = self.body.clone().unwrap_or_default();
        for comment in &self.comments {
            text.push('\n');
            text.push_str(comment.body.as_deref().unwrap_or(""));
        }
        text
    }
}

/// One inline review comment from `api repos/{owner}/{repo}/pulls/{n}/comments`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewComment {
    #[serde(default)]
    pub user: Option<ReviewUser>,
    #[serde(default)]
    pub path: Option<String>,
    /// Diff position; a number, or null for outdated comments
    #[serde(default)]
    pub position: Option<serde_json::Value>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewUser {
    #[serde(default)]
    pub login: Option<String>,
}

impl ReviewComment {
    pub fn login(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.login.as_deref())
    }

    /// Position rendered as text, `None` when absent or null.
    pub fn position_text(&self) -> Option<String> {
        match self.position.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_display() {
        assert_eq!(EntryKind::PullRequest.to_string(), "PR");
        assert_eq!(EntryKind::Issue.to_string(), "Issue");
    }

    #[test]
    fn test_entry_detail_text_appends_comments() {
        let detail: EntryDetail = serde_json::from_str(
            r#"{"title":"Crash on start","body":"Steps","comments":[{"body":"same here"},{"author":{"login":"x"},"body":"fixed?"}]}"#,
        )
        .unwrap();
        assert_eq!(detail.title(), "Crash on start");
        assert_eq!(detail.text(), "Steps\nsame here\nfixed?");
    }

    #[test]
    fn test_entry_detail_null_body() {
        let detail: EntryDetail =
            serde_json::from_str(r#"{"title":"T","body":null,"comments":[]}"#).unwrap();
        assert_eq!(detail.text(), "");
    }

    #[test]
    fn test_review_comment_fields() {
        let comment: ReviewComment = serde_json::from_str(
            r#"{"user":{"login":"carol"},"path":"src/lib.rs","position":12,"body":"nit"}"#,
        )
        .unwrap();
        assert_eq!(comment.login(), Some("carol"));
        assert_eq!(comment.position_text().as_deref(), Some("12"));
    }

    #[test]
    fn test_review_comment_null_position() {
        let comment: ReviewComment =
            serde_json::from_str(r#"{"user":null,"position":null}"#).unwrap();
        assert_eq!(comment.login(), None);
        assert_eq!(comment.position_text(), None);
        assert_eq!(comment.path, None);
    }
}
