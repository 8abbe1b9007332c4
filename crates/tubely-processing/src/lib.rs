//! Tubely media processing
//!
//! Wraps the external ffmpeg/ffprobe tools: rewriting uploaded videos for
//! fast-start playback and classifying them by aspect ratio.

pub mod error;
pub mod video;

pub use error::MediaToolError;
pub use video::{
    classify_report, AspectClassifier, ContainerNormalizer, FfmpegToolRunner, MediaToolRunner,
    Orientation, ProbeReport, ProcessedVideo, StreamDescriptor, VideoPipeline,
};
