//! reddit-ingest CLI
//!
//! Local execution entry point. For AWS Lambda, use `reddit-ingest-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reddit_ingest::{
    error::Result,
    models::{Config, ScrapeTarget},
    pipeline::{self, Backends},
};
use serde::Serialize;

/// reddit-ingest - Subreddit ingestion into raw and canonical stores
#[derive(Parser, Debug)]
#[command(
    name = "reddit-ingest",
    version,
    about = "Ingest subreddit posts and comments into an object store and a document index"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database schema and the raw bucket
    Init,

    /// Scrape the newest submissions of a subreddit
    Scrape {
        /// Subreddit name without the r/ prefix
        #[arg(short, long)]
        subreddit: String,

        /// Maximum number of submissions to scan
        #[arg(short, long, default_value_t = 100)]
        limit: usize,

        /// Skip comment threads
        #[arg(long)]
        no_include_comments: bool,

        /// Comment budget per submission
        #[arg(long, default_value_t = 100)]
        max_comments_per_post: usize,

        /// Use an in-memory repository and local object storage
        #[arg(long)]
        dry_run: bool,
    },

    /// Keyword search over ingested documents
    Search {
        /// Search query (web search syntax)
        query: String,

        /// Maximum number of hits
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },

    /// Show repository statistics
    Stats {
        /// Omit the per-subreddit breakdown
        #[arg(long)]
        no_top_subreddits: bool,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };
    config.apply_env();
    init_logging(cli.verbose, &config.logging.level);

    match &loaded {
        Ok(_) => log::info!("Loaded configuration from {}", cli.config.display()),
        Err(e) => log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        ),
    }

    match cli.command {
        Command::Init => {
            config.validate()?;
            let backends = Backends::connect(&config).await?;
            backends.init().await?;
            log::info!("Schema and bucket are ready");
        }

        Command::Scrape {
            subreddit,
            limit,
            no_include_comments,
            max_comments_per_post,
            dry_run,
        } => {
            config.validate()?;
            let target = ScrapeTarget::new(subreddit, limit)
                .with_comments(!no_include_comments)
                .with_max_comments(max_comments_per_post);
            target.validate()?;

            let backends = if dry_run {
                log::info!(
                    "Dry run: documents stay in memory, raw objects go to {}",
                    config.storage.local_dir
                );
                Backends::dry_run(&config)
            } else {
                Backends::connect(&config).await?
            };

            let summary = pipeline::run_scrape(&config, &backends, &target).await?;
            print_json(&summary)?;
        }

        Command::Search { query, limit } => {
            config.validate()?;
            let backends = Backends::connect(&config).await?;
            backends.init().await?;
            let report = pipeline::run_search(backends.repository.as_ref(), &query, limit).await?;
            print_json(&report)?;
        }

        Command::Stats { no_top_subreddits } => {
            config.validate()?;
            let backends = Backends::connect(&config).await?;
            backends.init().await?;
            let stats = pipeline::run_stats(backends.repository.as_ref(), !no_top_subreddits).await?;
            print_json(&stats)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK");
        }
    }

    Ok(())
}
