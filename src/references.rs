//! Finds issues and pull requests mentioned in free text.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::remote::Repository;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s)"\\]+"#).expect("url pattern is valid"));

static SHORT_REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B#(\d+)\b").expect("short reference pattern is valid"));

/// An issue or pull request, possibly in another repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub owner: String,
    pub repo: String,
    pub id: String,
}

impl Reference {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/#{}", self.owner, self.repo, self.id)
    }
}

/// URLs found in a text, split by whether they point at an issue or PR.
#[derive(Debug, Default, PartialEq)]
pub struct ExtractedUrls {
    pub hosting: Vec<String>,
    pub other: Vec<String>,
}

/// Extracts references for one hosting site.
pub struct ReferenceExtractor {
    link_pattern: Regex,
}

impl ReferenceExtractor {
    /// `host` is matched literally, e.g. `github.com`.
    pub fn new(host: &str) -> Self {
        let pattern = format!(
            r"^https://{}/([^/]+)/([^/]+)/(?:issues|pull)/(\d+)$",
            regex::escape(host)
        );
        Self {
            link_pattern: Regex::new(&pattern).expect("escaped host always forms a valid pattern"),
        }
    }

    /// All URLs in order of appearance, partitioned into issue/PR links and
    /// everything else.
    pub fn extract_urls(&self, text: &str) -> ExtractedUrls {
        let mut urls = ExtractedUrls::default();
        for url in URL_PATTERN.find_iter(text).map(|m| m.as_str()) {
            if self.link_pattern.is_match(url) {
                urls.hosting.push(url.to_string());
            } else {
                urls.other.push(url.to_string());
            }
        }
        urls
    }

    /// Split an issue/PR link into its reference. `None` for any other URL.
    pub fn decompose_link(&self, url: &str) -> Option<Reference> {
        let caps = self.link_pattern.captures(url)?;
        Some(Reference::new(&caps[1], &caps[2], &caps[3]))
    }

    /// Every reference mentioned in `text`, deduplicated and without
    /// `self_id` in `current`. Links keep their own repository; `#N`
    /// shorthand always points at `current`. Order is unspecified.
    #[instrument(skip(self, text), fields(current = %current))]
    pub fn collect_references(
        &self,
        text: &str,
        current: &Repository,
        self_id: &str,
    ) -> (HashSet<Reference>, ExtractedUrls) {
        let urls = self.extract_urls(text);
        let mut references: HashSet<Reference> = urls
            .hosting
            .iter()
            .filter_map(|url| self.decompose_link(url))
            .collect();
        references.extend(
            extract_short_ids(text)
                .into_iter()
                .map(|id| Reference::new(&current.owner, &current.name, id)),
        );
        references.remove(&Reference::new(&current.owner, &current.name, self_id));
        debug!(
            references = references.len(),
            hosting_links = urls.hosting.len(),
            other_links = urls.other.len(),
            "extracted references"
        );
        (references, urls)
    }
}

/// Numbers of standalone `#N` tokens. `word#N` does not count.
pub fn extract_short_ids(text: &str) -> Vec<String> {
    SHORT_REFERENCE_PATTERN
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Stable report order: owner, repository, then numeric id.
pub fn sorted(references: HashSet<Reference>) -> Vec<Reference> {
    let mut references: Vec<Reference> = references.into_iter().collect();
    references.sort_by(|a, b| {
        (&a.owner, &a.repo, a.id.parse::<u64>().ok(), &a.id)
            .cmp(&(&b.owner, &b.repo, b.id.parse::<u64>().ok(), &b.id))
    });
    references
}
