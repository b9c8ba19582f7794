//! The `taglens config` command for configuration management.

use clap::{Args, Subcommand};
use taglens_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration (literal secrets are masked)
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let mut config = Config::load()?;
            mask_secrets(&mut config);
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            std::fs::write(&path, Config::default().to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Replace literal secrets with a placeholder. `${ENV_VAR}` references are
/// left visible since they reveal nothing.
fn mask_secrets(config: &mut Config) {
    let secrets = [
        &mut config.server.access_token,
        &mut config.sources.azure.api_key,
        &mut config.sources.google.api_key,
        &mut config.sources.imagga.api_key,
        &mut config.sources.imagga.api_secret,
    ];
    for secret in secrets {
        if !secret.is_empty() && !secret.starts_with("${") {
            *secret = "********".to_string();
        }
    }
}
