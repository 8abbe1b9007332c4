use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tubely_processing::video::processed_output_path;
use tubely_processing::{
    MediaToolError, MediaToolRunner, Orientation, ProbeReport, StreamDescriptor, VideoPipeline,
};

/// Scripted runner that records the order of tool calls.
struct ScriptedRunner {
    report: ProbeReport,
    fail_rewrite: bool,
    fail_probe: bool,
    rewrite_delay: Duration,
    calls: Mutex<Vec<&'static str>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedRunner {
    fn new(report: ProbeReport) -> Self {
        Self {
            report,
            fail_rewrite: false,
            fail_probe: false,
            rewrite_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaToolRunner for ScriptedRunner {
    async fn probe_streams(
        &self,
        _path: &Path,
        _cancel: &CancellationToken,
    ) -> Result<ProbeReport, MediaToolError> {
        self.calls.lock().unwrap().push("probe");
        if self.fail_probe {
            return Err(MediaToolError::ExitFailure {
                tool: "ffprobe",
                status: "exit status: 1".to_string(),
                output: "Invalid data found when processing input".to_string(),
            });
        }
        Ok(self.report.clone())
    }

    async fn rewrite_for_streaming(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, MediaToolError> {
        self.calls.lock().unwrap().push("rewrite");
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let output = processed_output_path(path);
        tokio::fs::write(&output, b"partial").await.unwrap();

        let result = tokio::select! {
            _ = tokio::time::sleep(self.rewrite_delay) => {
                if self.fail_rewrite {
                    Err(MediaToolError::ExitFailure {
                        tool: "ffmpeg",
                        status: "exit status: 1".to_string(),
                        output: "moov atom not found".to_string(),
                    })
                } else {
                    Ok(output)
                }
            }
            _ = cancel.cancelled() => Err(MediaToolError::Cancelled { tool: "ffmpeg" }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn landscape_report() -> ProbeReport {
    ProbeReport {
        streams: vec![StreamDescriptor::with_dimensions(1920, 1080)],
    }
}

async fn write_input(dir: &Path, name: &str) -> PathBuf {
    let input = dir.join(name);
    tokio::fs::write(&input, b"raw upload bytes").await.unwrap();
    input
}

#[tokio::test]
async fn test_process_normalizes_before_classifying() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "upload.mp4").await;
    let runner = Arc::new(ScriptedRunner::new(landscape_report()));
    let pipeline = VideoPipeline::new(runner.clone(), 2);

    let processed = pipeline
        .process(&input, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(runner.calls(), vec!["rewrite", "probe"]);
    assert_eq!(processed.orientation, Orientation::Landscape);
    assert_eq!(processed.path, dir.path().join("upload.mp4.processing"));
    assert!(processed.path.exists());
    assert!(input.exists(), "input must be left in place");

    let path = processed.path.clone();
    processed.remove().await.unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn test_rewrite_failure_skips_probe_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "broken.mp4").await;
    let mut runner = ScriptedRunner::new(landscape_report());
    runner.fail_rewrite = true;
    let runner = Arc::new(runner);
    let pipeline = VideoPipeline::new(runner.clone(), 2);

    let err = pipeline
        .process(&input, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("moov atom not found"));
    assert_eq!(runner.calls(), vec!["rewrite"]);
    assert!(!processed_output_path(&input).exists());
}

#[tokio::test]
async fn test_missing_stream_removes_processed_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "audio-only.mp4").await;
    let runner = Arc::new(ScriptedRunner::new(ProbeReport {
        streams: vec![StreamDescriptor {
            codec_type: Some("audio".to_string()),
            ..Default::default()
        }],
    }));
    let pipeline = VideoPipeline::new(runner, 2);

    let err = pipeline
        .process(&input, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, MediaToolError::NoVideoStream));
    assert!(!processed_output_path(&input).exists());
}

#[tokio::test]
async fn test_probe_failure_is_returned_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "upload.mp4").await;
    let mut runner = ScriptedRunner::new(landscape_report());
    runner.fail_probe = true;
    let pipeline = VideoPipeline::new(Arc::new(runner), 2);

    let err = pipeline
        .process(&input, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.diagnostic_output(),
        Some("Invalid data found when processing input")
    );
    assert!(!processed_output_path(&input).exists());
}

#[tokio::test]
async fn test_cancellation_stops_processing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "slow.mp4").await;
    let mut runner = ScriptedRunner::new(landscape_report());
    runner.rewrite_delay = Duration::from_secs(30);
    let pipeline = VideoPipeline::new(Arc::new(runner), 2);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = pipeline.process(&input, &cancel).await.unwrap_err();

    assert!(matches!(err, MediaToolError::Cancelled { tool: "ffmpeg" }));
    assert!(!processed_output_path(&input).exists());
}

#[tokio::test]
async fn test_concurrent_jobs_are_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = ScriptedRunner::new(landscape_report());
    runner.rewrite_delay = Duration::from_millis(50);
    let runner = Arc::new(runner);
    let pipeline = Arc::new(VideoPipeline::new(runner.clone(), 1));

    let mut handles = Vec::new();
    for i in 0..3 {
        let input = write_input(dir.path(), &format!("upload-{}.mp4", i)).await;
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move {
            pipeline
                .process(&input, &CancellationToken::new())
                .await
                .map(|p| p.orientation)
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), Orientation::Landscape);
    }
    assert_eq!(runner.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(pipeline.available_permits(), 1);
}
