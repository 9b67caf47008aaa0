mod config;
mod issues;
mod report;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

/// Issue Fetcher: prints the most recently created issues (open and closed)
/// of a GitHub repository.
#[derive(Parser, Debug)]
#[command(name = "issue-fetcher", version, about)]
struct Cli {
    /// Repository as owner/repo (e.g., rust-lang/rust)
    ///
    /// Defaults to the repository named in .issue-fetcher.toml, or rust-lang/rust.
    repository: Option<String>,

    /// Maximum number of issues to fetch (a single page)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    limit: Option<u32>,

    /// Read configuration from this file instead of ./.issue-fetcher.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    exit_code(run(cli).await)
}

/// Every failure kind maps to the same exit status. The classified message
/// is the only thing printed at default verbosity.
fn exit_code(outcome: Result<(), Box<dyn std::error::Error>>) -> ExitCode {
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = %err, "run failed");
            eprintln!("Error: {}", report::describe_failure(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    info!("loading configuration");
    let config = match cli.config.as_deref() {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };

    let target = match cli.repository.as_deref() {
        Some(slug) => issues::parse_repo_slug(slug)?,
        None => config.default_target(),
    };
    let limit = cli.limit.unwrap_or(config.defaults.limit);

    let _main_span = info_span!("issue_fetch", target = %target, limit).entered();
    debug!(api_base = %config.github.api_base, "resolved settings");

    let client = issues::GitHubClient::new(config.github.api_base.as_str())?;
    let shown = report::run(&client, &target, limit).await?;
    info!(shown, "done");

    Ok(())
}
