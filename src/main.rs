//! ycp - curate a playlist of track links and download them as audio files

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;
mod config;
mod download;
mod playlist;
mod utils;

use cli::{Cli, Commands};
use config::Config;
use utils::QuietWhileTui;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "ycp=debug" } else { "ycp=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(QuietWhileTui::new(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        ))
        .init();

    let config = cli.overrides.apply(Config::load());

    match cli.command {
        None => {
            cli::commands::browse(&config.playlist, &config).await?;
        }
        Some(Commands::Browse { file }) => {
            let file = file.unwrap_or_else(|| config.playlist.clone());
            cli::commands::browse(&file, &config).await?;
        }
        Some(Commands::Download { file }) => {
            let file = file.unwrap_or_else(|| config.playlist.clone());
            cli::commands::download(&file, &config).await?;
        }
        Some(Commands::List { file }) => {
            let file = file.unwrap_or_else(|| config.playlist.clone());
            cli::commands::list(&file)?;
        }
        Some(Commands::Config { save }) => {
            cli::commands::config(&config, save)?;
        }
        Some(Commands::Completion { shell }) => {
            cli::commands::completion(shell);
        }
    }

    Ok(())
}
