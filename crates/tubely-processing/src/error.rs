use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Errors raised while running the external media tools.
///
/// `tool` is the logical tool name (`"ffmpeg"`, `"ffprobe"`), not the
/// configured executable path.
#[derive(Debug, thiserror::Error)]
pub enum MediaToolError {
    #[error("invalid {tool} path: {path}")]
    InvalidToolPath { tool: &'static str, path: String },

    #[error("input file does not exist: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("cannot access input file {}: {source}", .path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run {tool}: {source}")]
    LaunchFailure {
        tool: &'static str,
        #[source]
        source: io::Error,
    },

    /// For ffmpeg, `output` is the captured stdout followed by stderr,
    /// unmodified. For ffprobe it is stderr only.
    #[error("{tool} failed ({status})\nOutput: {output}")]
    ExitFailure {
        tool: &'static str,
        status: String,
        output: String,
    },

    #[error("failed to parse {tool} output: {source}")]
    ParseFailure {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no valid video stream found")]
    NoVideoStream,

    #[error("{tool} timed out after {}s", .timeout.as_secs())]
    TimedOut {
        tool: &'static str,
        timeout: Duration,
    },

    #[error("{tool} was cancelled")]
    Cancelled { tool: &'static str },
}

impl MediaToolError {
    /// Captured tool output, when the tool ran and exited unsuccessfully.
    pub fn diagnostic_output(&self) -> Option<&str> {
        match self {
            MediaToolError::ExitFailure { output, .. } => Some(output),
            _ => None,
        }
    }

    /// True when the failure is caused by the uploaded file rather than the environment.
    pub fn is_input_problem(&self) -> bool {
        matches!(self, MediaToolError::NoVideoStream)
    }
}
