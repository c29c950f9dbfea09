//! yt-dlp backed fetcher
//!
//! yt-dlp downloads the best audio stream and hands it to ffmpeg for the
//! transcode. Its own output is silenced; progress is read back through
//! machine-readable progress templates.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

use super::fetcher::{FetchError, FetchProgress, FetchRequest, Fetcher};

const PROGRESS_TAG: &str = "ycp-progress";
const POSTPROCESS_TAG: &str = "ycp-postprocess";
const OUTPUT_TAG: &str = "ycp-output";

/// Runs the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Verify yt-dlp is runnable and return its version
    pub async fn check(&self) -> Result<String, FetchError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| self.spawn_error(source))?;

        if !output.status.success() {
            return Err(FetchError::Failed {
                status: output.status.code(),
                message: "yt-dlp --version returned an error".to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn spawn_error(&self, source: std::io::Error) -> FetchError {
        FetchError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }

    /// Command line for one request
    fn args(request: &FetchRequest) -> Vec<String> {
        vec![
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            request.codec.codec().to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--newline".to_string(),
            "--progress".to_string(),
            "--progress-template".to_string(),
            format!(
                "download:{} %(progress._percent_str)s;%(progress._speed_str)s",
                PROGRESS_TAG
            ),
            "--progress-template".to_string(),
            format!(
                "postprocess:{} %(progress.status)s;%(info.filepath)s",
                POSTPROCESS_TAG
            ),
            "--print".to_string(),
            format!("after_move:{} %(filepath)s", OUTPUT_TAG),
            "--output".to_string(),
            request.output_template().display().to_string(),
            "--".to_string(),
            request.source_uri.clone(),
        ]
    }
}

/// What a single line of yt-dlp output means to us
#[derive(Debug, Clone, PartialEq)]
enum OutputLine {
    Progress(FetchProgress),
    Output(PathBuf),
    Other,
}

fn parse_line(line: &str) -> OutputLine {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix(PROGRESS_TAG) {
        let (percent, speed) = rest.split_once(';').unwrap_or((rest, ""));
        return OutputLine::Progress(FetchProgress::downloading(
            parse_percent(percent),
            parse_speed(speed),
        ));
    }

    if let Some(rest) = line.strip_prefix(POSTPROCESS_TAG) {
        let path = rest
            .split_once(';')
            .map(|(_, path)| path.trim())
            .filter(|path| !path.is_empty() && *path != "NA");
        return OutputLine::Progress(FetchProgress::finished(path.map(PathBuf::from)));
    }

    if let Some(rest) = line.strip_prefix(OUTPUT_TAG) {
        let path = rest.trim();
        if !path.is_empty() {
            return OutputLine::Output(PathBuf::from(path));
        }
    }

    OutputLine::Other
}

fn parse_percent(raw: &str) -> Option<f64> {
    raw.trim()
        .strip_suffix('%')
        .and_then(|number| number.trim().parse::<f64>().ok())
}

fn parse_speed(raw: &str) -> Option<String> {
    let speed = raw.trim();
    if speed.is_empty()
        || speed.starts_with("Unknown")
        || speed.starts_with("N/A")
        || speed == "NA"
    {
        None
    } else {
        Some(speed.to_string())
    }
}

/// Forward progress lines from one stream; returns the printed output path
/// and the last line that was not ours (usually the error).
async fn read_stream<R>(
    reader: R,
    progress: mpsc::UnboundedSender<FetchProgress>,
) -> std::io::Result<(Option<PathBuf>, Option<String>)>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut output = None;
    let mut last_other = None;

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            OutputLine::Progress(update) => {
                let _ = progress.send(update);
            }
            OutputLine::Output(path) => output = Some(path),
            OutputLine::Other => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    debug!("yt-dlp: {}", trimmed);
                    last_other = Some(trimmed.to_string());
                }
            }
        }
    }

    Ok((output, last_other))
}

#[async_trait]
impl Fetcher for YtDlp {
    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: mpsc::UnboundedSender<FetchProgress>,
    ) -> Result<PathBuf, FetchError> {
        debug!("Fetching {} into {}", request.source_uri, request.output_dir.display());

        let mut child = Command::new(&self.program)
            .args(Self::args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("yt-dlp stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("yt-dlp stderr was not captured"))?;

        let (out, err) = tokio::join!(
            read_stream(stdout, progress.clone()),
            read_stream(stderr, progress)
        );
        let (printed_path, _) = out?;
        let (_, last_error) = err?;

        let status = child.wait().await?;
        if !status.success() {
            let message = last_error
                .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
                .unwrap_or_else(|| format!("yt-dlp exited with {}", status));
            return Err(FetchError::Failed {
                status: status.code(),
                message,
            });
        }

        Ok(printed_path.unwrap_or_else(|| request.expected_output_path()))
    }
}
