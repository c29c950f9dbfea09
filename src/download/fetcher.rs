//! Contract of the external fetch+transcode utility

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::AudioFormat;
use crate::playlist::TrackEntry;
use crate::utils::output_stem;

/// Which stage the utility reports progress for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Downloading,
    /// Download done, post-processing (transcode) under way
    Finished,
}

/// Progress notification from the utility
#[derive(Debug, Clone, PartialEq)]
pub struct FetchProgress {
    pub phase: FetchPhase,
    pub percent: Option<f64>,
    pub speed: Option<String>,
    pub output_path: Option<PathBuf>,
}

impl FetchProgress {
    pub fn downloading(percent: Option<f64>, speed: Option<String>) -> Self {
        Self {
            phase: FetchPhase::Downloading,
            percent,
            speed,
            output_path: None,
        }
    }

    pub fn finished(output_path: Option<PathBuf>) -> Self {
        Self {
            phase: FetchPhase::Finished,
            percent: Some(100.0),
            speed: None,
            output_path,
        }
    }
}

/// One fetch+transcode job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub source_uri: String,
    pub output_dir: PathBuf,
    /// Sanitized `<artist> - <title>` file stem
    pub output_stem: String,
    /// yt-dlp style template, e.g. `Artist - Title.%(ext)s`
    pub output_name_template: String,
    pub codec: AudioFormat,
}

impl FetchRequest {
    pub fn for_entry(entry: &TrackEntry, output_dir: &Path, codec: AudioFormat) -> Self {
        let stem = output_stem(&entry.artist, &entry.title);
        Self {
            source_uri: entry.link.clone(),
            output_dir: output_dir.to_path_buf(),
            output_name_template: format!("{}.%(ext)s", stem.replace('%', "%%")),
            output_stem: stem,
            codec,
        }
    }

    /// Full output template including the directory
    pub fn output_template(&self) -> PathBuf {
        self.output_dir.join(&self.output_name_template)
    }

    /// Path the transcoded file ends up at
    pub fn expected_output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.output_stem, self.codec.extension()))
    }
}

/// Failure of a single fetch; fetch and transcode failures are not told apart
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{message}")]
    Failed { status: Option<i32>, message: String },

    #[error("timed out after {0}s")]
    TimedOut(u64),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// External fetch+transcode utility
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `request.source_uri` and transcode it, reporting progress on
    /// `progress`. Returns the path of the finished file.
    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: mpsc::UnboundedSender<FetchProgress>,
    ) -> Result<PathBuf, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_for_entry() {
        let entry = TrackEntry::new("AC/DC", "100% Pure", "https://example.com/v");
        let request = FetchRequest::for_entry(&entry, Path::new("out"), AudioFormat::Mp3);

        assert_eq!(request.source_uri, "https://example.com/v");
        assert_eq!(request.output_name_template, "AC⧸DC - 100%% Pure.%(ext)s");
        assert_eq!(
            request.expected_output_path(),
            PathBuf::from("out").join("AC⧸DC - 100% Pure.mp3")
        );
    }

    #[test]
    fn test_expected_output_keeps_template_syntax_in_title() {
        let entry = TrackEntry::new("A", "%(ext)s", "u");
        let request = FetchRequest::for_entry(&entry, Path::new("o"), AudioFormat::Mp3);

        assert_eq!(request.output_name_template, "A - %%(ext)s.%(ext)s");
        assert_eq!(
            request.expected_output_path(),
            PathBuf::from("o").join("A - %(ext)s.mp3")
        );
    }

    #[test]
    fn test_expected_output_uses_codec_extension() {
        let entry = TrackEntry::new("A", "T", "u");
        let request = FetchRequest::for_entry(&entry, Path::new("."), AudioFormat::Vorbis);
        assert_eq!(
            request.expected_output_path(),
            PathBuf::from(".").join("A - T.ogg")
        );
    }

    #[test]
    fn test_failed_error_displays_message() {
        let err = FetchError::Failed {
            status: Some(1),
            message: "Video unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Video unavailable");
        assert_eq!(FetchError::TimedOut(30).to_string(), "timed out after 30s");
    }
}
