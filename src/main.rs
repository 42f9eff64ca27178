//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror crawler.

use clap::Parser;
use site_mirror::config::{
    ignore_file_path, load_config_with_hash, load_ignore_file, resolve_settings, CliOverrides,
    FileConfig, LoggingConfig, Settings,
};
use site_mirror::crawler::crawl;
use site_mirror::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: a single-site breadth-first mirroring crawler
///
/// Site-Mirror starts at SEED, follows links on the same host breadth-first,
/// and writes every page, PDF and API response it fetches into a mirrored
/// directory tree. URLs already recorded in the visited cache are skipped on
/// later runs.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "A single-site breadth-first mirroring crawler", long_about = None)]
struct Cli {
    /// Absolute http(s) URL to start crawling from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Fetch the seed even if it is already in the visited cache
    #[arg(short, long)]
    force: bool,

    /// Follow links only from pages shallower than this depth
    #[arg(long, value_name = "DEPTH")]
    max_depth: Option<u32>,

    /// Pause before every request, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Retries after the first failed attempt (0-10)
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root directory for mirrored files
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Visited-URL cache file
    #[arg(long, value_name = "FILE")]
    cache_file: Option<PathBuf>,

    /// File of exclusion patterns, one per line
    #[arg(long, value_name = "FILE")]
    ignore_file: Option<PathBuf>,

    /// Print the resolved settings and exit without crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            seed: self.seed.clone(),
            force: self.force,
            max_depth: self.max_depth,
            delay_ms: self.delay_ms,
            max_retries: self.max_retries,
            output_dir: self.output.clone(),
            visited_cache: self.cache_file.clone(),
            ignore_file: self.ignore_file.clone(),
            logging: LoggingConfig {
                verbosity: self.verbose,
                quiet: self.quiet,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = cli.overrides();

    setup_logging(overrides.logging);

    let settings = match load_settings(&cli, &overrides) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    if cli.dry_run {
        handle_dry_run(&settings);
        return Ok(());
    }

    handle_crawl(settings).await
}

/// Sets up the logging/tracing subscriber from the logging configuration
fn setup_logging(logging: LoggingConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(logging.filter_directive()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file and ignore file and resolves the run settings
fn load_settings(
    cli: &Cli,
    overrides: &CliOverrides,
) -> Result<Settings, Box<dyn std::error::Error>> {
    let file_config: Option<FileConfig> = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Some(config)
        }
        None => None,
    };

    let ignore_path = ignore_file_path(overrides, file_config.as_ref());
    let ignore_patterns = load_ignore_file(&ignore_path)?;
    if !ignore_patterns.is_empty() {
        tracing::info!(
            "Loaded {} exclusion patterns from {}",
            ignore_patterns.len(),
            ignore_path.display()
        );
    }

    Ok(resolve_settings(
        overrides,
        file_config.as_ref(),
        ignore_patterns,
    )?)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(settings: &Settings) {
    println!("=== Site-Mirror Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", settings.seed);
    println!("  Force: {}", settings.force);
    match settings.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unbounded"),
    }
    println!("  Delay: {}ms", settings.delay.as_millis());

    println!("\nRetry:");
    println!("  Max retries: {}", settings.retry.max_retries);
    println!("  Backoff base: {}ms", settings.retry.backoff_base.as_millis());
    println!("  Jitter: up to {}ms", settings.retry.jitter_max.as_millis());

    println!("\nHTTP:");
    println!("  User agent: {}", settings.http.user_agent);
    println!("  Timeout: {}s", settings.http.timeout.as_secs());
    println!("  Block scripts: {}", settings.http.block_scripts);
    for (name, value) in &settings.http.headers {
        println!("  Header: {}: {}", name, value);
    }

    println!("\nOutput:");
    println!("  Directory: {}", settings.output_dir.display());
    println!("  Visited cache: {}", settings.visited_cache.display());

    println!("\nExclusion Patterns ({}):", settings.ignore_patterns.len());
    for pattern in &settings.ignore_patterns {
        println!("  - {}", pattern);
    }

    println!("\nAPI Patterns ({}):", settings.api_patterns.len());
    for pattern in &settings.api_patterns {
        println!("  - {}", pattern);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting crawl of {}", settings.seed);

    match crawl(settings).await {
        Ok(stats) => {
            tracing::info!(
                "Crawl completed: {} tasks in {:.1}s",
                stats.tasks_processed(),
                stats.elapsed.as_secs_f64()
            );
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
