//! External media tool invocation

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::normalizer::processed_output_path;
use super::probe::ProbeReport;
use crate::error::MediaToolError;

/// The two tool operations the pipeline depends on.
///
/// Implemented by [`FfmpegToolRunner`] in production and by fakes in tests.
#[async_trait]
pub trait MediaToolRunner: Send + Sync {
    /// Probe stream metadata of the file at `path`.
    async fn probe_streams(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<ProbeReport, MediaToolError>;

    /// Rewrite the container at `path` for fast-start playback, returning the new file.
    async fn rewrite_for_streaming(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, MediaToolError>;
}

/// Validate that a tool path doesn't contain shell metacharacters or traversal
fn validate_tool_path(tool: &'static str, path: &str) -> Result<(), MediaToolError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) || path.contains("..")
    {
        return Err(MediaToolError::InvalidToolPath {
            tool,
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Stdout followed by stderr, byte for byte, lossily decoded.
fn combined_output(output: &Output) -> String {
    let mut combined = Vec::with_capacity(output.stdout.len() + output.stderr.len());
    combined.extend_from_slice(&output.stdout);
    combined.extend_from_slice(&output.stderr);
    String::from_utf8_lossy(&combined).into_owned()
}

/// Run `command` to completion, killing it on timeout or cancellation.
async fn run_tool(
    tool: &'static str,
    mut command: Command,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Output, MediaToolError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if cancel.is_cancelled() {
        return Err(MediaToolError::Cancelled { tool });
    }

    let child = command
        .spawn()
        .map_err(|source| MediaToolError::LaunchFailure { tool, source })?;

    // Dropping the wait future drops the child, which kills it.
    tokio::select! {
        output = child.wait_with_output() => {
            output.map_err(|source| MediaToolError::LaunchFailure { tool, source })
        }
        _ = cancel.cancelled() => {
            tracing::warn!(tool, "Media tool cancelled, killing process");
            Err(MediaToolError::Cancelled { tool })
        }
        _ = tokio::time::sleep(timeout) => {
            tracing::warn!(tool, timeout_secs = timeout.as_secs(), "Media tool timed out, killing process");
            Err(MediaToolError::TimedOut { tool, timeout })
        }
    }
}

/// Runs the real `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone)]
pub struct FfmpegToolRunner {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

impl FfmpegToolRunner {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        ffprobe_path: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MediaToolError> {
        let ffmpeg_path = ffmpeg_path.into();
        let ffprobe_path = ffprobe_path.into();
        validate_tool_path("ffmpeg", &ffmpeg_path)?;
        validate_tool_path("ffprobe", &ffprobe_path)?;

        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
            timeout,
        })
    }
}

#[async_trait]
impl MediaToolRunner for FfmpegToolRunner {
    #[tracing::instrument(skip(self, path, cancel), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        media.path = %path.display()
    ))]
    async fn probe_streams(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<ProbeReport, MediaToolError> {
        let start = std::time::Instant::now();

        let mut command = Command::new(&self.ffprobe_path);
        command
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path);

        let output = run_tool("ffprobe", command, self.timeout, cancel).await?;

        if !output.status.success() {
            return Err(MediaToolError::ExitFailure {
                tool: "ffprobe",
                status: output.status.to_string(),
                output: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let report = ProbeReport::from_json(&output.stdout)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            stream_count = report.streams.len(),
            "Video probe completed"
        );

        Ok(report)
    }

    #[tracing::instrument(skip(self, path, cancel), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        media.path = %path.display()
    ))]
    async fn rewrite_for_streaming(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, MediaToolError> {
        let start = std::time::Instant::now();
        let output_path = processed_output_path(path);

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .arg("-y")
            .arg("-i")
            .arg(path)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output_path);

        let output = run_tool("ffmpeg", command, self.timeout, cancel).await?;

        if !output.status.success() {
            return Err(MediaToolError::ExitFailure {
                tool: "ffmpeg",
                status: output.status.to_string(),
                output: combined_output(&output),
            });
        }

        if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            return Err(MediaToolError::ExitFailure {
                tool: "ffmpeg",
                status: format!("{}, but no output file was written", output.status),
                output: combined_output(&output),
            });
        }

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            output = %output_path.display(),
            "Fast-start rewrite completed"
        );

        Ok(output_path)
    }
}
