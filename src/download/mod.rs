//! Sequential download pipeline

pub mod event;
pub mod fetcher;
pub mod pipeline;
pub mod ytdlp;

pub use event::DownloadEvent;
pub use pipeline::{DownloadPipeline, PipelineConfig};
pub use ytdlp::YtDlp;
