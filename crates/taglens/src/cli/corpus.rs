//! The `taglens corpus` command for building and querying the popularity corpus.

use clap::{Args, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use taglens_core::{Config, CorpusBuilder, FrequencyScorer, TagCorpus};

/// Arguments for the `corpus` command.
#[derive(Args, Debug)]
pub struct CorpusArgs {
    #[command(subcommand)]
    pub command: CorpusCommand,
}

/// Subcommands for corpus management.
#[derive(Subcommand, Debug)]
pub enum CorpusCommand {
    /// Convert scraped `tag,count` rows (counts like "1.2M") into a corpus file
    Import {
        /// Scraped rows, one `tag,count` pair per line
        input: PathBuf,

        /// Corpus file to write (defaults to the configured corpus path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank tags against the configured corpus
    Lookup {
        /// Tags to look up, with or without a leading '#'
        #[arg(required = true)]
        tags: Vec<String>,

        /// Number of ranked tags to show
        #[arg(long)]
        top_k: Option<usize>,
    },
}

/// Execute the corpus command.
pub async fn execute(args: CorpusArgs, config: Config) -> anyhow::Result<()> {
    match args.command {
        CorpusCommand::Import { input, output } => {
            let content = std::fs::read_to_string(&input)?;
            let mut builder = CorpusBuilder::new();
            let accepted = builder.add_csv(&content);
            if builder.is_empty() {
                anyhow::bail!("No usable rows in {}", input.display());
            }

            let output = output.unwrap_or_else(|| config.corpus_path());
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            builder.write_to(BufWriter::new(File::create(&output)?))?;

            tracing::info!(
                "Imported {accepted} row(s), rejected {}, {} unique tag(s)",
                builder.rejected(),
                builder.len()
            );
            println!("Corpus written to: {}", output.display());
        }

        CorpusCommand::Lookup { tags, top_k } => {
            let path = config.corpus_path();
            let corpus = TagCorpus::load(&path)?;
            if corpus.is_empty() {
                anyhow::bail!("Tag corpus {} has no usable rows", path.display());
            }
            let top_k = top_k.unwrap_or(config.scoring.top_k);
            let ranked = FrequencyScorer::score(&tags, Some(&corpus), top_k)?;
            if ranked.is_empty() {
                println!("None of the tags are in the corpus.");
            }
            for entry in &ranked.0 {
                println!("{:>14}  {}", entry.count, entry.tag);
            }
        }
    }

    Ok(())
}
