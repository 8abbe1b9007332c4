//! Video post-processing: container normalization and orientation classification.

pub mod classifier;
pub mod normalizer;
pub mod orientation;
pub mod pipeline;
pub mod probe;
pub mod runner;

pub use classifier::{classify_report, AspectClassifier};
pub use normalizer::{processed_output_path, ContainerNormalizer};
pub use orientation::Orientation;
pub use pipeline::{ProcessedVideo, VideoPipeline};
pub use probe::{ProbeReport, StreamDescriptor};
pub use runner::{FfmpegToolRunner, MediaToolRunner};
