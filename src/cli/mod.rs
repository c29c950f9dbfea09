//! CLI module for ycp

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AudioFormat, Config};

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "ycp", about = "Curate a playlist of track links and download them as audio")]
#[command(version, author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub overrides: Overrides,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Settings that override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Directory downloaded files are written to
    #[arg(long, global = true, env = "YCP_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Target audio format
    #[arg(long, global = true, value_enum)]
    pub format: Option<AudioFormat>,

    /// Path to the yt-dlp executable
    #[arg(long, global = true, env = "YCP_YTDLP")]
    pub ytdlp: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(format) = self.format {
            config.audio_format = format;
        }
        if let Some(ytdlp) = &self.ytdlp {
            config.ytdlp_path = ytdlp.clone();
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse and edit a playlist interactively (default)
    Browse {
        /// Playlist file (defaults to the configured playlist)
        file: Option<PathBuf>,
    },

    /// Download every entry of a playlist without the UI
    Download {
        /// Playlist file (defaults to the configured playlist)
        file: Option<PathBuf>,
    },

    /// Print the entries of a playlist
    List {
        /// Playlist file (defaults to the configured playlist)
        file: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
