//! CLI command handlers

use anyhow::Result;
use clap_complete::generate;
use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

use crate::app::{self, App};
use crate::config::Config;
use crate::download::{DownloadEvent, DownloadPipeline, PipelineConfig, YtDlp};
use crate::playlist::{Playlist, PlaylistStore, TrackEntry};

fn pipeline(config: &Config) -> DownloadPipeline {
    let fetcher = Arc::new(YtDlp::new(config.ytdlp_path.clone()));
    DownloadPipeline::new(fetcher, PipelineConfig::from(config))
}

/// Handle the `browse` command (and the default run mode)
pub async fn browse(file: &Path, config: &Config) -> Result<()> {
    let playlist = PlaylistStore::load(file);
    let state = App::new(playlist, file.to_path_buf(), config.status_hold());

    app::run(state, pipeline(config)).await
}

/// Handle the `download` command
///
/// Runs the same pipeline as the UI and prints every event as a line.
/// Per-item failures are reported but do not fail the command.
pub async fn download(file: &Path, config: &Config) -> Result<()> {
    let playlist = PlaylistStore::load(file);
    if playlist.is_empty() {
        println!("{}", format!("No entries in {}.", file.display()).yellow());
    }

    let ytdlp = YtDlp::new(config.ytdlp_path.clone());
    if let Err(e) = ytdlp.check().await {
        warn!("yt-dlp is not usable ({}); every item will fail", e);
    }

    let batch: Arc<[TrackEntry]> = playlist.snapshot().into();
    let (tx, mut rx) = mpsc::channel(64);
    let pipeline = pipeline(config);
    let run = tokio::spawn(async move { pipeline.run(batch, tx).await });

    let mut stdout = io::stdout();
    while let Some(event) = rx.recv().await {
        writeln!(stdout, "{}", colorize(&event))?;
    }

    let summary = run.await?;
    println!();
    if summary.failed == 0 {
        println!("{}", "Download complete!".green().bold());
    } else {
        println!("{}", "Download finished with errors".yellow().bold());
    }
    println!("  Downloaded: {}", summary.finished);
    println!("  Failed: {}", summary.failed);

    Ok(())
}

fn colorize(event: &DownloadEvent) -> String {
    let line = event.to_string();
    match event {
        DownloadEvent::Started(_) => line.cyan().to_string(),
        DownloadEvent::Progress { .. } | DownloadEvent::Transcoding { .. } => line,
        DownloadEvent::ItemFinished { .. } => line.green().to_string(),
        DownloadEvent::ItemError { .. } => line.red().to_string(),
        DownloadEvent::AllFinished { .. } => line.bold().to_string(),
    }
}

/// Handle the `list` command
pub fn list(file: &Path) -> Result<()> {
    let playlist = PlaylistStore::load(file);
    print!("{}", format_listing(&playlist));
    Ok(())
}

fn format_listing(playlist: &Playlist) -> String {
    let mut out = format!("{:<32}{:<32}{}\n", "artist", "title", "link");
    for entry in playlist.entries() {
        out.push_str(&format!("{:<32}{:<32}{}\n", entry.artist, entry.title, entry.link));
    }
    out
}

/// Handle the `config` command
pub fn config(config: &Config, save: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);

    if save {
        let path = Config::config_path()?;
        config.save_to(&path)?;
        println!();
        println!("Saved to {}", path.display().to_string().cyan());
    }
    Ok(())
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = super::Cli::command();
    generate(shell, &mut cmd, "ycp", &mut io::stdout());
}

// Extension trait for Cli to get clap Command
impl super::Cli {
    fn command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }
}
