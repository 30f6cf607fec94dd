//! Renders inline review comments as a markdown table.

use crate::hosting::ReviewComment;

const NOT_APPLICABLE: &str = "N/A";
const UNKNOWN_SPEAKER: &str = "Unknown";
const TABLE_HEADER: &str = "| 発言者 | ファイルパス | 行数 | コメント |\n|---|---|---|---|\n";

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionComment {
    pub speaker: String,
    pub path: String,
    pub position: String,
    /// Comment text with newlines flattened to spaces
    pub body: String,
}

impl From<&ReviewComment> for DiscussionComment {
    fn from(comment: &ReviewComment) -> Self {
        Self {
            speaker: comment.login().unwrap_or(UNKNOWN_SPEAKER).to_string(),
            path: comment
                .path
                .clone()
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            position: comment
                .position_text()
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            body: comment.body.as_deref().unwrap_or("").replace('\n', " "),
        }
    }
}

/// Sort by (path, position) as plain strings, so position "10" comes
/// before "2".
pub fn sort_comments(comments: &mut [DiscussionComment]) {
    comments.sort_by(|a, b| (&a.path, &a.position).cmp(&(&b.path, &b.position)));
}

/// Header, separator, then one row per comment in sorted order.
pub fn render_table(comments: &[ReviewComment]) -> String {
    let mut rows: Vec<DiscussionComment> = comments.iter().map(DiscussionComment::from).collect();
    sort_comments(&mut rows);

    let rows: Vec<String> = rows
        .iter()
        .map(|c| format!("| {} | {} | {} | {} |", c.speaker, c.path, c.position, c.body))
        .collect();
    format!("{}{}", TABLE_HEADER, rows.join("\n"))
}
