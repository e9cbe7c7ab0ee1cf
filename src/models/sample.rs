//! Motion-analysis sample types produced once per tick.

use serde::{Deserialize, Serialize};

use crate::models::geometry::TargetPoint;

/// Inclusive bounding box of changed cells in analysis-grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridBounds {
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl GridBounds {
    pub fn point(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
        }
    }

    pub fn extend(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Horizontal extent in cells (inclusive bounds, so a single cell is 1).
    pub fn width(&self) -> u32 {
        self.max_x.saturating_sub(self.min_x) + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y) + 1
    }

    pub fn area(&self) -> u32 {
        self.width() * self.height()
    }
}

/// One frame's worth of motion evidence.
///
/// Produced fresh each tick by the motion sampler; immutable once computed.
/// Samples are only constructed for non-zero mass; "no motion above
/// threshold" is represented by the absence of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSample {
    /// Weighted mean changed-cell column, in grid cells.
    pub centroid_x: f64,
    /// Weighted mean changed-cell row, in grid cells.
    pub centroid_y: f64,
    /// Count of cells whose difference exceeded the change threshold.
    pub mass: u32,
    pub bounds: GridBounds,
    /// Centroid rescaled to source-frame pixels.
    pub focus: TargetPoint,
}

/// Classifier verdict for a non-empty motion sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Scrolling,
    ClickLike,
    Ambient,
}
