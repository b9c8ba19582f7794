//! The `taglens run` command: one pipeline run from the command line.

use clap::Args;
use std::path::PathBuf;
use taglens_core::{Config, Pipeline};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Page URL whose preview image should be tagged
    #[arg(required = true)]
    pub url: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the result JSON
    #[arg(long)]
    pub pretty: bool,

    /// Override the corpus file from the config
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Override the number of ranked tags
    #[arg(long)]
    pub top_k: Option<usize>,
}

/// Execute the run command.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config);

    let pipeline = Pipeline::from_config(&config).await?;
    let result = pipeline.run(&args.url).await?;

    for warning in &result.warnings {
        tracing::warn!("{warning}");
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, json + "\n")?;
            tracing::info!("Output written to {:?}", path);
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn apply_overrides(args: &RunArgs, config: &mut Config) {
    if let Some(ref corpus) = args.corpus {
        config.scoring.corpus_path = corpus.to_string_lossy().into_owned();
    }
    if let Some(top_k) = args.top_k.filter(|k| *k > 0) {
        config.scoring.top_k = top_k;
    }
}
