//! Lifecycle events emitted while a batch is processed

use std::fmt;
use std::path::PathBuf;

use crate::config::AudioFormat;

/// Position and identity of the batch item an event refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    /// Zero-based index within the batch
    pub index: usize,
    pub total: usize,
    pub artist: String,
    pub title: String,
}

impl ItemInfo {
    fn task(&self) -> String {
        format!("task {}/{}", self.index + 1, self.total)
    }
}

/// Progress updates sent during a batch download
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// Starting an item
    Started(ItemInfo),
    /// Fine-grained download progress for the current item
    Progress {
        item: ItemInfo,
        percent: f64,
        speed: Option<String>,
    },
    /// Source fetched, conversion to the target codec started
    Transcoding {
        item: ItemInfo,
        downloaded: Option<PathBuf>,
        codec: AudioFormat,
    },
    /// An item was written to disk
    ItemFinished { item: ItemInfo, output_path: PathBuf },
    /// An item failed; the batch moves on
    ItemError { item: ItemInfo, message: String },
    /// Every item has been attempted
    AllFinished { total: usize, failed: usize },
}

impl DownloadEvent {
    /// Item this event refers to, `None` for `AllFinished`
    pub fn item(&self) -> Option<&ItemInfo> {
        match self {
            Self::Started(item)
            | Self::Progress { item, .. }
            | Self::Transcoding { item, .. }
            | Self::ItemFinished { item, .. }
            | Self::ItemError { item, .. } => Some(item),
            Self::AllFinished { .. } => None,
        }
    }

    /// Percentage of the whole batch completed, for gauges
    pub fn batch_ratio(&self) -> f64 {
        let (done, total) = match self {
            Self::Started(item) => (item.index as f64, item.total),
            Self::Progress { item, percent, .. } => {
                (item.index as f64 + percent.clamp(0.0, 100.0) / 100.0, item.total)
            }
            Self::Transcoding { item, .. } => (item.index as f64 + 1.0, item.total),
            Self::ItemFinished { item, .. } | Self::ItemError { item, .. } => {
                (item.index as f64 + 1.0, item.total)
            }
            Self::AllFinished { .. } => return 1.0,
        };
        if total == 0 {
            1.0
        } else {
            (done / total as f64).clamp(0.0, 1.0)
        }
    }
}

impl fmt::Display for DownloadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started(item) => write!(
                f,
                "{}: starting download {} - {}",
                item.task(),
                item.artist,
                item.title
            ),
            Self::Progress {
                item,
                percent,
                speed,
            } => {
                write!(
                    f,
                    "{}: downloading {} - {} {:.1}%",
                    item.task(),
                    item.artist,
                    item.title,
                    percent
                )?;
                if let Some(speed) = speed {
                    write!(f, " at {}", speed)?;
                }
                Ok(())
            }
            Self::Transcoding {
                item,
                downloaded,
                codec,
            } => match downloaded {
                Some(path) => write!(
                    f,
                    "{}: downloaded to {}, converting to {}",
                    item.task(),
                    path.display(),
                    codec
                ),
                None => write!(
                    f,
                    "{}: converting {} - {} to {}",
                    item.task(),
                    item.artist,
                    item.title,
                    codec
                ),
            },
            Self::ItemFinished { item, output_path } => write!(
                f,
                "{}: finished {} - {} -> {}",
                item.task(),
                item.artist,
                item.title,
                output_path.display()
            ),
            Self::ItemError { item, message } => write!(
                f,
                "{}: failed {} - {}: {}",
                item.task(),
                item.artist,
                item.title,
                message
            ),
            Self::AllFinished { total, failed: 0 } => write!(f, "{} task(s) finished", total),
            Self::AllFinished { total, failed } => {
                write!(f, "{} task(s) finished, {} failed", total, failed)
            }
        }
    }
}
