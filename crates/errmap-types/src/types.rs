//! Plain data shared across the workspace

use serde::{Deserialize, Serialize};

/// Image-space coordinate reported by the point-selection collaborator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// One recorded measurement, keyed by its 1-based trial index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(rename = "Image Trial")]
    pub trial: u32,
    #[serde(rename = "Z-Axis")]
    pub z_axis: f64,
    #[serde(rename = "Y-Axis")]
    pub y_axis: f64,
    #[serde(rename = "X-Axis")]
    pub x_axis: f64,
}

impl TrialRecord {
    pub fn new(trial: u32, z_axis: f64, y_axis: f64, x_axis: f64) -> Self {
        Self {
            trial,
            z_axis,
            y_axis,
            x_axis,
        }
    }
}
