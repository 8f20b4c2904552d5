//! Link-Sweep main entry point
//!
//! This is the command-line interface for the Link-Sweep broken-link finder.

use anyhow::Context;
use clap::Parser;
use link_sweep::config::{load_config, Config, CrawlJob};
use link_sweep::crawler::{CancellationToken, Crawler};
use link_sweep::output::{write_report, OutputFormat};
use link_sweep::{ConfigError, CrawlError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Link-Sweep: find broken links on a website
///
/// Link-Sweep crawls a site from a seed URL, checks every link it finds with
/// a pool of concurrent workers, and lists the links that are unreachable or
/// answer with an error status.
#[derive(Parser, Debug)]
#[command(name = "link-sweep")]
#[command(version)]
#[command(about = "Find broken links on a website", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Maximum number of URLs to check
    #[arg(long, conflicts_with = "no_cap")]
    max_checked: Option<usize>,

    /// Check every reachable URL, without a cap
    #[arg(long)]
    no_cap: bool,

    /// Maximum link distance from the seed that is still expanded
    #[arg(long)]
    max_depth: Option<u32>,

    /// Only follow links on the seed's host
    #[arg(long)]
    same_domain: bool,

    /// Timeout for each fetch in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Give up on the whole crawl after this many seconds
    #[arg(long, value_name = "SECS")]
    job_timeout: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match handle_crawl(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            if is_client_error(&e) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_sweep=info,warn"),
            1 => EnvFilter::new("link_sweep=debug,info"),
            2 => EnvFilter::new("link_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Input problems map to exit status 2, everything else to 1
fn is_client_error(error: &anyhow::Error) -> bool {
    if let Some(e) = error.downcast_ref::<CrawlError>() {
        return e.is_client_error();
    }
    error.downcast_ref::<ConfigError>().is_some()
}

/// Merges the config file and command-line flags into a job
fn build_job(cli: &Cli) -> anyhow::Result<CrawlJob> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    let crawler = &mut config.crawler;
    if let Some(workers) = cli.workers {
        crawler.workers = workers;
    }
    if let Some(max_checked) = cli.max_checked {
        crawler.max_checked = Some(max_checked);
    }
    if cli.no_cap {
        crawler.max_checked = None;
    }
    if let Some(max_depth) = cli.max_depth {
        crawler.max_depth = Some(max_depth);
    }
    if cli.same_domain {
        crawler.domain_restricted = true;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        crawler.fetch_timeout_ms = timeout_ms;
    }
    if let Some(secs) = cli.job_timeout {
        crawler.job_timeout_secs = Some(secs);
    }

    Ok(CrawlJob::from_config(&cli.seed, &config)?)
}

/// Handles the main crawl operation
async fn handle_crawl(cli: Cli) -> anyhow::Result<()> {
    let job = build_job(&cli)?;
    let crawler = Crawler::with_http(job)?;

    // Ctrl-C stops the crawl and still prints what was found so far
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with partial results");
            on_interrupt.cancel();
        }
    });

    let report = crawler.run_with_cancellation(cancel).await?;

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&report, format, &mut out).context("Failed to write report")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("link-sweep").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_without_flags() {
        let job = build_job(&parse(&["https://example.com/"])).unwrap();

        assert_eq!(job.workers, 10);
        assert_eq!(job.max_checked, Some(100));
        assert!(!job.domain_restricted);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "https://example.com/",
            "--workers",
            "3",
            "--max-checked",
            "7",
            "--max-depth",
            "2",
            "--same-domain",
            "--timeout-ms",
            "750",
        ]);
        let job = build_job(&cli).unwrap();

        assert_eq!(job.workers, 3);
        assert_eq!(job.max_checked, Some(7));
        assert_eq!(job.max_depth, Some(2));
        assert!(job.domain_restricted);
        assert_eq!(job.fetch_timeout.as_millis(), 750);
    }

    #[test]
    fn test_no_cap() {
        let job = build_job(&parse(&["https://example.com/", "--no-cap"])).unwrap();
        assert_eq!(job.max_checked, None);
    }

    #[test]
    fn test_invalid_seed_is_client_error() {
        let err = build_job(&parse(&["not-a-url"])).unwrap_err();
        assert!(is_client_error(&err));
    }

    #[test]
    fn test_invalid_worker_count_is_client_error() {
        let err = build_job(&parse(&["https://example.com/", "--workers", "0"])).unwrap_err();
        assert!(is_client_error(&err));
    }

    #[test]
    fn test_flags_override_config_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[crawler]\nworkers = 8\ndomain-restricted = true\nmax-checked = 40").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let job = build_job(&parse(&["https://example.com/", "-c", &path, "--workers", "2"])).unwrap();
        assert_eq!(job.workers, 2);
        assert!(job.domain_restricted);
        assert_eq!(job.max_checked, Some(40));
    }
}
