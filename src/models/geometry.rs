//! Shared geometry types for the camera pipeline.

use serde::{Deserialize, Serialize};

/// A point in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPoint {
    pub x: f64,
    pub y: f64,
}

impl TargetPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The crop rectangle handed to the frame compositor each tick.
///
/// `x`/`y` anchor the top-left corner in source-frame pixels; `width` and
/// `height` are `frame / zoom`. Always lies fully inside the source frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
}

impl ViewRect {
    pub fn center(&self) -> TargetPoint {
        TargetPoint {
            x: self.x + self.width * 0.5,
            y: self.y + self.height * 0.5,
        }
    }
}
