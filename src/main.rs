//! Site-Harvester main entry point
//!
//! This is the command-line interface for the Site-Harvester crawler.

use anyhow::Context;
use clap::Parser;
use site_harvester::config::{load_config_with_hash, validate, Config};
use site_harvester::crawler::{crawl, run_dir_for};
use site_harvester::output::{load_statistics, print_statistics};
use site_harvester::url::normalize_url;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Harvester: a single-domain crawler and file harvester
///
/// Site-Harvester crawls one website breadth-first, downloads the images,
/// documents and videos it links to, and keeps a JSON report of every page.
#[derive(Parser, Debug)]
#[command(name = "site-harvester")]
#[command(version)]
#[command(about = "A single-domain crawler and file harvester", long_about = None)]
struct Cli {
    /// URL the crawl starts from; its host bounds the crawl
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Suffix of the run directory name (<domain>_<suffix>)
    #[arg(long, value_name = "SUFFIX")]
    download_dir_suffix: Option<String>,

    /// Stop dispatching batches once this many pages have been visited
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from an existing report and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(suffix) = cli.download_dir_suffix {
        config.output.download_dir_suffix = suffix;
    }
    if cli.max_pages.is_some() {
        config.crawler.max_pages = cli.max_pages;
    }
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.base_url)
    } else if cli.stats {
        handle_stats(&config, &cli.base_url)
    } else {
        handle_crawl(config, &cli.base_url).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "site_harvester=info,warn",
            1 => "site_harvester=debug,info",
            2 => "site_harvester=trace,debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Run directory and report path the crawl of `base_url` would use
fn report_location(config: &Config, base_url: &str) -> anyhow::Result<(PathBuf, PathBuf)> {
    let base = normalize_url(base_url).context("Invalid base URL")?;
    let run_dir = run_dir_for(config, &base)?;
    let report = run_dir.join(&config.output.report_file_name);
    Ok((run_dir, report))
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, base_url: &str) -> anyhow::Result<()> {
    let (run_dir, report) = report_location(config, base_url)?;

    println!("=== Site-Harvester Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Batch width: {}", config.crawler.batch_width);
    println!("  Batch delay: {}ms", config.crawler.batch_delay_ms);
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!(
        "  {}/{}",
        config.user_agent.crawler_name, config.user_agent.crawler_version
    );

    println!("\nOutput:");
    println!("  Run directory: {}", run_dir.display());
    println!("  Report: {}", report.display());

    println!("\nFile Types:");
    println!("  images: {}", config.file_types.images.join(" "));
    println!("  documents: {}", config.file_types.documents.join(" "));
    println!("  videos: {}", config.file_types.videos.join(" "));
    println!(
        "  never crawled: {}",
        config.scope.excluded_extensions.join(" ")
    );

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", base_url);

    Ok(())
}

/// Handles the --stats mode: shows statistics from an existing report
fn handle_stats(config: &Config, base_url: &str) -> anyhow::Result<()> {
    let (_, report) = report_location(config, base_url)?;

    println!("Report: {}\n", report.display());

    let stats = load_statistics(&report)
        .with_context(|| format!("Failed to read report {}", report.display()))?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, base_url: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Batch width: {}, delay: {}ms, max pages: {:?}",
        config.crawler.batch_width,
        config.crawler.batch_delay_ms,
        config.crawler.max_pages
    );

    match crawl(config, base_url).await {
        Ok(stats) => {
            tracing::info!(
                "Crawl completed successfully: {} pages, {} files",
                stats.pages_recorded,
                stats.files_downloaded
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
