//! Sequential batch pipeline
//!
//! Items are processed strictly one at a time in snapshot order, so only one
//! fetch+transcode is ever in flight and every event belongs to exactly one
//! item. A failed item is reported and skipped; the batch always runs to the
//! end and finishes with `AllFinished`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::event::{DownloadEvent, ItemInfo};
use super::fetcher::{FetchError, FetchPhase, FetchProgress, FetchRequest, Fetcher};
use crate::config::{AudioFormat, Config};
use crate::playlist::TrackEntry;

/// Configuration for the download pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub audio_format: AudioFormat,
    /// Per-item limit; an item exceeding it fails and the batch continues
    pub item_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            audio_format: AudioFormat::Mp3,
            item_timeout: None,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            audio_format: config.audio_format,
            item_timeout: config.item_timeout(),
        }
    }
}

/// Outcome counts of a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub finished: usize,
    pub failed: usize,
}

/// Runs batches against a fetcher
#[derive(Clone)]
pub struct DownloadPipeline {
    fetcher: Arc<dyn Fetcher>,
    config: PipelineConfig,
}

impl DownloadPipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: PipelineConfig) -> Self {
        Self { fetcher, config }
    }

    /// Process every item of `batch`, sending lifecycle events to `events`
    ///
    /// The batch is a private snapshot; nothing here touches the playlist it
    /// was taken from.
    pub async fn run(
        &self,
        batch: Arc<[TrackEntry]>,
        events: mpsc::Sender<DownloadEvent>,
    ) -> BatchSummary {
        let total = batch.len();
        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };

        info!("Starting batch of {} item(s)", total);

        for (index, entry) in batch.iter().enumerate() {
            let item = ItemInfo {
                index,
                total,
                artist: entry.artist.clone(),
                title: entry.title.clone(),
            };

            let _ = events.send(DownloadEvent::Started(item.clone())).await;
            info!("Downloading {}/{}: {} - {}", index + 1, total, entry.artist, entry.title);

            match self.run_item(&item, entry, &events).await {
                Ok(output_path) => {
                    summary.finished += 1;
                    debug!("Wrote {}", output_path.display());
                    let _ = events
                        .send(DownloadEvent::ItemFinished { item, output_path })
                        .await;
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("Failed to download {} - {}: {}", entry.artist, entry.title, e);
                    let _ = events
                        .send(DownloadEvent::ItemError {
                            item,
                            message: e.to_string(),
                        })
                        .await;
                }
            }
        }

        info!(
            "Batch complete: {} finished, {} failed",
            summary.finished, summary.failed
        );
        let _ = events
            .send(DownloadEvent::AllFinished {
                total,
                failed: summary.failed,
            })
            .await;

        summary
    }

    /// Fetch one item while forwarding its progress as events
    async fn run_item(
        &self,
        item: &ItemInfo,
        entry: &TrackEntry,
        events: &mpsc::Sender<DownloadEvent>,
    ) -> Result<PathBuf, FetchError> {
        let request =
            FetchRequest::for_entry(entry, &self.config.output_dir, self.config.audio_format);
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();

        let fetch = async {
            let fetch = self.fetcher.fetch(&request, progress_tx);
            match self.config.item_timeout {
                Some(limit) => tokio::time::timeout(limit, fetch)
                    .await
                    .unwrap_or_else(|_| Err(FetchError::TimedOut(limit.as_secs()))),
                None => fetch.await,
            }
        };
        tokio::pin!(fetch);

        let mut transcoding_sent = false;
        let outcome = loop {
            tokio::select! {
                biased;
                Some(update) = progress_rx.recv() => {
                    self.forward_progress(item, update, &mut transcoding_sent, events).await;
                }
                result = &mut fetch => break result,
            }
        };

        // Progress reported right before the fetch returned
        while let Ok(update) = progress_rx.try_recv() {
            self.forward_progress(item, update, &mut transcoding_sent, events).await;
        }

        outcome
    }

    async fn forward_progress(
        &self,
        item: &ItemInfo,
        update: FetchProgress,
        transcoding_sent: &mut bool,
        events: &mpsc::Sender<DownloadEvent>,
    ) {
        let event = match update.phase {
            FetchPhase::Downloading => match update.percent {
                Some(percent) => DownloadEvent::Progress {
                    item: item.clone(),
                    percent,
                    speed: update.speed,
                },
                None => return,
            },
            FetchPhase::Finished if !*transcoding_sent => {
                *transcoding_sent = true;
                DownloadEvent::Transcoding {
                    item: item.clone(),
                    downloaded: update.output_path,
                    codec: self.config.audio_format,
                }
            }
            FetchPhase::Finished => return,
        };
        let _ = events.send(event).await;
    }
}
