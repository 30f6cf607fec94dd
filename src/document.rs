use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to write report file: {0}")]
    Write(#[from] std::io::Error),
}

/// Markdown accumulated in memory and written once at the end of a run.
/// Every fragment is preceded by a blank line.
#[derive(Debug, Default)]
pub struct Document {
    buffer: String,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, text: &str) {
        self.buffer.push_str("\n\n");
        self.buffer.push_str(text);
    }

    pub fn append_title(&mut self, title: &str) {
        self.append_text(&format!("## {}", title));
    }

    pub fn append_codeblock(&mut self, code: &str) {
        self.append_text(&format!("```\n{}\n```", code));
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Write the buffer plus a trailing newline, replacing any existing
    /// file. Missing parent directories are created.
    #[instrument(skip(self), fields(path = %path.display(), bytes = self.buffer.len()))]
    pub fn write(&self, path: &Path) -> Result<(), DocumentError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, format!("{}\n", self.as_str()))?;
        debug!("report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_codeblock() {
        let mut doc = Document::new();
        doc.append_title("X");
        doc.append_codeblock("Y");
        assert_eq!(doc.as_str(), "\n\n## X\n\n```\nY\n```");
    }

    #[test]
    fn test_empty_codeblock() {
        let mut doc = Document::new();
        doc.append_codeblock("");
        assert_eq!(doc.as_str(), "\n\n```\n\n```");
    }

    #[test]
    fn test_write_document() {
        let mut doc = Document::new();
        doc.append_title("X");
        doc.append_codeblock("Y — 日本語");

        let dir = std::env::temp_dir().join("pr_collector_document_test");
        let path = dir.join("nested").join("report.md");
        doc.write(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "\n\n## X\n\n```\nY — 日本語\n```\n");
        assert!(!content.ends_with("\n\n"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_overwrites() {
        let path = std::env::temp_dir().join("pr_collector_overwrite_test.md");
        fs::write(&path, "old contents that are longer than the new ones").unwrap();

        let mut doc = Document::new();
        doc.append_text("new");
        doc.write(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "\n\nnew\n");
        fs::remove_file(&path).ok();
    }
}
