//! Fast-start container rewrite

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use super::runner::MediaToolRunner;
use crate::error::MediaToolError;

const PROCESSED_SUFFIX: &str = ".processing";

/// Where the rewritten copy of `input` is written: `<input>.processing`.
pub fn processed_output_path(input: &Path) -> PathBuf {
    let mut name: OsString = input.as_os_str().to_owned();
    name.push(PROCESSED_SUFFIX);
    PathBuf::from(name)
}

/// Moves the MP4 index to the front of the file so playback can start early.
///
/// The input is never modified; the caller owns the returned file.
pub struct ContainerNormalizer {
    runner: Arc<dyn MediaToolRunner>,
}

impl ContainerNormalizer {
    pub fn new(runner: Arc<dyn MediaToolRunner>) -> Self {
        Self { runner }
    }

    #[tracing::instrument(skip(self, input, cancel), fields(input = %input.display()))]
    pub async fn normalize(
        &self,
        input: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, MediaToolError> {
        match tokio::fs::try_exists(input).await {
            Ok(true) => {}
            Ok(false) => return Err(MediaToolError::InputMissing(input.to_path_buf())),
            Err(source) => {
                return Err(MediaToolError::InputUnreadable {
                    path: input.to_path_buf(),
                    source,
                })
            }
        }

        let start = Instant::now();
        let output = self.runner.rewrite_for_streaming(input, cancel).await?;

        tracing::info!(
            output = %output.display(),
            duration_ms = start.elapsed().as_millis(),
            "Container normalized for fast start"
        );

        Ok(output)
    }
}
