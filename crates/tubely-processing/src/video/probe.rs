//! ffprobe stream report

use serde::{Deserialize, Deserializer};

use crate::error::MediaToolError;

/// One entry of ffprobe's `streams` array.
///
/// Audio and data streams carry no dimensions, so width and height are optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StreamDescriptor {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub codec_name: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl StreamDescriptor {
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        StreamDescriptor {
            codec_type: Some("video".to_string()),
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }
}

/// Parsed output of `ffprobe -show_streams`, in file order.
///
/// A missing or `null` `streams` value parses as an empty list.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProbeReport {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub streams: Vec<StreamDescriptor>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProbeReport {
    pub fn from_json(stdout: &[u8]) -> Result<Self, MediaToolError> {
        serde_json::from_slice(stdout).map_err(|source| MediaToolError::ParseFailure {
            tool: "ffprobe",
            source,
        })
    }

    /// Width and height of the first stream, if both are present and non-zero.
    ///
    /// Later streams are never consulted.
    pub fn primary_dimensions(&self) -> Option<(u32, u32)> {
        let first = self.streams.first()?;
        match (first.width, first.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => Some((width, height)),
            _ => None,
        }
    }
}
