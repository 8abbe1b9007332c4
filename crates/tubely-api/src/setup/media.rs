//! Media tool setup

use anyhow::{Context, Result};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::Config;
use tubely_processing::{FfmpegToolRunner, VideoPipeline};

const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the upload pipeline around the configured ffmpeg/ffprobe binaries.
pub async fn setup_pipeline(config: &Config) -> Result<Arc<VideoPipeline>> {
    let runner = FfmpegToolRunner::new(
        config.ffmpeg_path(),
        config.ffprobe_path(),
        config.media_tool_timeout(),
    )
    .context("Invalid media tool configuration")?;

    for tool in [config.ffmpeg_path(), config.ffprobe_path()] {
        check_tool(tool).await;
    }

    tracing::info!(
        ffmpeg_path = %config.ffmpeg_path(),
        ffprobe_path = %config.ffprobe_path(),
        timeout_secs = config.media_tool_timeout().as_secs(),
        max_concurrent_jobs = config.max_concurrent_media_jobs(),
        "Media pipeline initialized"
    );

    Ok(Arc::new(VideoPipeline::new(
        Arc::new(runner),
        config.max_concurrent_media_jobs(),
    )))
}

/// Warn at startup when a tool cannot run; uploads would fail later otherwise.
async fn check_tool(path: &str) {
    let status = tokio::time::timeout(
        VERSION_CHECK_TIMEOUT,
        tokio::process::Command::new(path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status(),
    )
    .await;

    match status {
        Ok(Ok(status)) if status.success() => {
            tracing::debug!(tool = %path, "Media tool available");
        }
        Ok(Ok(status)) => {
            tracing::warn!(tool = %path, status = %status, "Media tool version check failed");
        }
        Ok(Err(e)) => {
            tracing::warn!(tool = %path, error = %e, "Media tool not found");
        }
        Err(_) => {
            tracing::warn!(tool = %path, "Media tool version check timed out");
        }
    }
}
