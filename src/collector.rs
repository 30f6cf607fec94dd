use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::discussion;
use crate::document::{Document, DocumentError};
use crate::hosting::{HostingCli, HostingError};
use crate::references::{self, Reference, ReferenceExtractor};
use crate::remote::Repository;
use crate::runner::CommandRunner;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Hosting(#[from] HostingError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// What ended up in the report.
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub pr_id: String,
    /// Linked entries rendered into the report
    pub linked: usize,
    /// References that were neither a PR nor an issue
    pub skipped: usize,
    pub other_urls: usize,
}

/// Build the report for pull request `pr_id` of `repository`.
#[instrument(skip(hosting, extractor), fields(repository = %repository))]
pub fn collect<R: CommandRunner>(
    hosting: &HostingCli<'_, R>,
    extractor: &ReferenceExtractor,
    repository: &Repository,
    pr_id: &str,
) -> Result<(Document, Summary), CollectError> {
    let mut doc = Document::new();
    doc.append_text(&format!("# プルリクエスト #{}", pr_id));

    info!("fetching pull request");
    let detail_text = hosting.view_pull_request(pr_id)?;
    doc.append_codeblock(&detail_text);

    let comments_text = hosting.view_pull_request_comments(pr_id)?;
    doc.append_title("コメント");
    doc.append_codeblock(&comments_text);

    let all_text = format!("{}\n\n{}", detail_text, comments_text);
    let (found, urls) = extractor.collect_references(&all_text, repository, pr_id);

    info!("fetching review comments");
    let review_comments = hosting.fetch_review_comments(repository, pr_id)?;
    doc.append_title("プルリクエストの議論");
    doc.append_text(&discussion::render_table(&review_comments));

    info!(references = found.len(), "fetching linked entries");
    doc.append_title("リンクされた Issue や プルリクエスト");
    let mut summary = Summary {
        pr_id: pr_id.to_string(),
        other_urls: urls.other.len(),
        ..Summary::default()
    };
    for reference in references::sorted(found) {
        if append_linked(hosting, &reference, &mut doc)? {
            summary.linked += 1;
        } else {
            debug!(%reference, "not found as a PR or an issue, skipping");
            summary.skipped += 1;
        }
    }

    if !urls.other.is_empty() {
        doc.append_title("その他のURL");
        for url in &urls.other {
            doc.append_text(url);
        }
    }

    Ok((doc, summary))
}

/// Collect and write the report. Returns what was written.
pub fn run<R: CommandRunner>(
    hosting: &HostingCli<'_, R>,
    extractor: &ReferenceExtractor,
    repository: &Repository,
    pr_id: &str,
    output_path: &Path,
) -> Result<Summary, CollectError> {
    let (doc, summary) = collect(hosting, extractor, repository, pr_id)?;
    doc.write(output_path)?;
    Ok(summary)
}

fn append_linked<R: CommandRunner>(
    hosting: &HostingCli<'_, R>,
    reference: &Reference,
    doc: &mut Document,
) -> Result<bool, HostingError> {
    let Some((detail, kind)) = hosting.fetch_entry_details(reference)? else {
        return Ok(false);
    };
    doc.append_codeblock(&format!(
        "{}: {} ({})\n\n{}",
        kind,
        detail.title(),
        reference,
        detail.text()
    ));
    Ok(true)
}

/// Print a short colored summary to the terminal.
pub fn print_summary(summary: &Summary, output_path: &Path) {
    println!();
    println!("PR #{}", summary.pr_id.bold());
    println!(
        "Linked entries: {} | Skipped: {} | Other URLs: {}",
        summary.linked.to_string().green(),
        if summary.skipped > 0 {
            summary.skipped.to_string().yellow()
        } else {
            summary.skipped.to_string().normal()
        },
        summary.other_urls
    );
    println!("Written to {}", output_path.display().to_string().cyan());
    println!();
}
