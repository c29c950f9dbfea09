//! User configuration
//!
//! Stored in ~/.config/ycp/config.json. Every field has a default, so a partial
//! or missing file is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Target codec handed to the transcoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Opus,
    Vorbis,
    Flac,
    Wav,
    Aac,
}

impl AudioFormat {
    /// Codec name as yt-dlp expects it for `--audio-format`
    pub fn codec(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
            Self::Opus => "opus",
            Self::Vorbis => "vorbis",
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Aac => "aac",
        }
    }

    /// File extension of the transcoded output
    pub fn extension(self) -> &'static str {
        match self {
            Self::Vorbis => "ogg",
            other => other.codec(),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codec())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playlist file opened when none is given on the command line
    pub playlist: PathBuf,
    /// Directory downloaded audio files are written to
    pub output_dir: PathBuf,
    pub audio_format: AudioFormat,
    /// yt-dlp executable (name on PATH or full path)
    pub ytdlp_path: PathBuf,
    /// Give up on a single item after this many seconds
    pub item_timeout_secs: Option<u64>,
    /// How long transient status messages stay visible
    pub status_hold_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            playlist: PathBuf::from("ycp.json"),
            output_dir: PathBuf::from("."),
            audio_format: AudioFormat::Mp3,
            ytdlp_path: PathBuf::from("yt-dlp"),
            item_timeout_secs: None,
            status_hold_secs: 3,
        }
    }
}

impl Config {
    /// Load the user config, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                warn!("{}; using default config", e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        let parsed: Result<Self> = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))
            .and_then(|contents| {
                serde_json::from_str(&contents).context("Failed to parse config")
            });

        match parsed {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using default config", e);
                Self::default()
            }
        }
    }

    /// Save config to an explicit path, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| {
                    format!("Failed to create config directory {}", parent.display())
                })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("ycp").join("config.json"))
    }

    pub fn item_timeout(&self) -> Option<Duration> {
        self.item_timeout_secs.map(Duration::from_secs)
    }

    pub fn status_hold(&self) -> Duration {
        Duration::from_secs(self.status_hold_secs)
    }
}
