use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;
const RATIO_TOLERANCE: f64 = 0.05;

/// Orientation category derived from a video's pixel dimensions.
///
/// The string form doubles as the storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

fn within_tolerance(ratio: f64, target: f64, tolerance: f64) -> bool {
    (ratio - target).abs() < tolerance
}

impl Orientation {
    /// Landscape is checked before portrait; both bounds are exclusive.
    pub fn from_ratio(ratio: f64) -> Self {
        if within_tolerance(ratio, LANDSCAPE_RATIO, RATIO_TOLERANCE) {
            Orientation::Landscape
        } else if within_tolerance(ratio, PORTRAIT_RATIO, RATIO_TOLERANCE) {
            Orientation::Portrait
        } else {
            Orientation::Other
        }
    }

    pub fn from_dimensions(width: u32, height: u32) -> Self {
        Self::from_ratio(f64::from(width) / f64::from(height))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
