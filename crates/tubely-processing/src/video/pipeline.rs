//! Upload post-processing pipeline: normalize, then classify.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use super::classifier::AspectClassifier;
use super::normalizer::{processed_output_path, ContainerNormalizer};
use super::orientation::Orientation;
use super::runner::MediaToolRunner;
use crate::error::MediaToolError;

/// A normalized video on local disk together with its orientation.
#[derive(Debug)]
pub struct ProcessedVideo {
    pub path: PathBuf,
    pub orientation: Orientation,
}

impl ProcessedVideo {
    /// Delete the processed file. A file that is already gone is not an error.
    pub async fn remove(self) -> io::Result<()> {
        remove_if_present(&self.path).await
    }
}

async fn remove_if_present(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Runs the normalizer and then the classifier, bounding how many uploads
/// are processed at once.
pub struct VideoPipeline {
    normalizer: ContainerNormalizer,
    classifier: AspectClassifier,
    permits: Arc<Semaphore>,
}

impl VideoPipeline {
    pub fn new(runner: Arc<dyn MediaToolRunner>, max_concurrent_jobs: usize) -> Self {
        Self {
            normalizer: ContainerNormalizer::new(runner.clone()),
            classifier: AspectClassifier::new(runner),
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    /// Number of jobs that could start right now without waiting.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    #[tracing::instrument(skip(self, input, cancel), fields(input = %input.display()))]
    pub async fn process(
        &self,
        input: &Path,
        cancel: &CancellationToken,
    ) -> Result<ProcessedVideo, MediaToolError> {
        let _permit = tokio::select! {
            permit = self.permits.acquire() => {
                permit.map_err(|_| MediaToolError::Cancelled { tool: "pipeline" })?
            }
            _ = cancel.cancelled() => return Err(MediaToolError::Cancelled { tool: "pipeline" }),
        };

        let start = Instant::now();

        let output = match self.normalizer.normalize(input, cancel).await {
            Ok(output) => output,
            Err(e) => {
                discard_output(&processed_output_path(input)).await;
                return Err(e);
            }
        };

        let orientation = match self.classifier.classify(&output, cancel).await {
            Ok(orientation) => orientation,
            Err(e) => {
                discard_output(&output).await;
                return Err(e);
            }
        };

        tracing::info!(
            orientation = %orientation,
            duration_ms = start.elapsed().as_millis(),
            "Video processing completed"
        );

        Ok(ProcessedVideo {
            path: output,
            orientation,
        })
    }
}

async fn discard_output(path: &Path) {
    if let Err(e) = remove_if_present(path).await {
        tracing::warn!(
            error = %e,
            path = %path.display(),
            "Failed to remove partial processing output"
        );
    }
}
