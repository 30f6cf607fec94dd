mod collector;
mod config;
mod discussion;
mod document;
mod hosting;
mod references;
mod remote;
mod runner;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

/// PR Collector — gathers a GitHub Pull Request, its review discussion and
/// every issue or PR it links to into one markdown report.
#[derive(Parser, Debug)]
#[command(name = "pr-collector", version, about)]
struct Cli {
    /// Pull request number in the current repository (e.g., 42)
    pr_number: String,

    /// Directory to write the report into (overrides the config file)
    #[arg(short, long)]
    output_root: Option<PathBuf>,

    /// Config file to use instead of .pr-collector.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let _main_span = info_span!("pr_collect", pr = %cli.pr_number).entered();

    info!("loading configuration");
    let mut config = match cli.config.as_deref() {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    if let Some(root) = cli.output_root {
        config.output.root = root;
    }
    debug!(?config, "configuration loaded");

    let runner = runner::SystemRunner;

    info!("resolving repository from git remotes");
    let repository = remote::resolve_repository(&runner, &config.git.program)?;
    info!(%repository, "resolved repository");

    let hosting = hosting::HostingCli::new(&runner, config.hosting.program.as_str());
    let extractor = references::ReferenceExtractor::new(&config.hosting.host);
    let output_path = config.output_path();

    let summary = collector::run(&hosting, &extractor, &repository, &cli.pr_number, &output_path)?;
    info!(linked = summary.linked, skipped = summary.skipped, path = %output_path.display(), "done");

    collector::print_summary(&summary, &output_path);
    Ok(())
}
