//! Orientation classification from ffprobe stream metadata

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::orientation::Orientation;
use super::probe::ProbeReport;
use super::runner::MediaToolRunner;
use crate::error::MediaToolError;

/// Classify a probe report by its first stream's dimensions.
pub fn classify_report(report: &ProbeReport) -> Result<Orientation, MediaToolError> {
    let (width, height) = report
        .primary_dimensions()
        .ok_or(MediaToolError::NoVideoStream)?;
    Ok(Orientation::from_dimensions(width, height))
}

pub struct AspectClassifier {
    runner: Arc<dyn MediaToolRunner>,
}

impl AspectClassifier {
    pub fn new(runner: Arc<dyn MediaToolRunner>) -> Self {
        Self { runner }
    }

    #[tracing::instrument(skip(self, path, cancel), fields(path = %path.display()))]
    pub async fn classify(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Orientation, MediaToolError> {
        let report = self.runner.probe_streams(path, cancel).await?;
        let orientation = classify_report(&report)?;

        tracing::info!(
            orientation = %orientation,
            stream_count = report.streams.len(),
            "Video classified"
        );

        Ok(orientation)
    }
}
