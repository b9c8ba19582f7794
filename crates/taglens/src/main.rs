//! Taglens CLI - hashtag suggestions for a URL's preview image.
//!
//! Taglens fetches the Open Graph image of a page, labels it with several
//! vision services, merges their labels, expands them with related hashtags
//! and ranks the candidates by popularity.
//!
//! # Usage
//!
//! ```bash
//! # Tag a single page
//! taglens run https://example.com/post/42
//!
//! # Serve the HTTP API
//! taglens serve --bind 0.0.0.0:4567
//!
//! # Build the popularity corpus from scraped rows
//! taglens corpus import scraped.csv
//!
//! # View configuration
//! taglens config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod server;

/// Taglens - hashtag suggestions for a URL's preview image.
#[derive(Parser, Debug)]
#[command(name = "taglens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the tagging pipeline for one URL and print the result
    Run(cli::run::RunArgs),

    /// Serve the HTTP API
    Serve(cli::serve::ServeArgs),

    /// Build and inspect the popularity corpus
    Corpus(cli::corpus::CorpusArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match taglens_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `taglens config path`."
            );
            taglens_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Taglens v{}", taglens_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Corpus(args) => cli::corpus::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
