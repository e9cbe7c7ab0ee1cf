//! Two-stage low-pass filter between the arbiter and the physics rig.
//!
//! The raw focus point jumps by whole analysis cells from tick to tick;
//! fed straight into a stiff spring that reads as high-frequency shake.
//! Deliberate clicks bypass the filter so the cut feels instantaneous.

use crate::algorithm::{require_unit_range, ConfigError};
use crate::models::geometry::TargetPoint;

#[derive(Debug, Clone)]
pub struct TargetSmootherConfig {
    /// Blend factor for confident clicks. 1.0 snaps outright.
    pub snap_factor: f64,
    /// Per-tick blend while zoomed in: responsive follow.
    pub follow_factor_zoomed: f64,
    /// Per-tick blend while zoomed out: suppress idle camera drift.
    pub follow_factor_wide: f64,
}

impl Default for TargetSmootherConfig {
    fn default() -> Self {
        Self {
            snap_factor: 1.0,
            follow_factor_zoomed: 0.30,
            follow_factor_wide: 0.08,
        }
    }
}

impl TargetSmootherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_unit_range("snap_factor", self.snap_factor)?;
        require_unit_range("follow_factor_zoomed", self.follow_factor_zoomed)?;
        require_unit_range("follow_factor_wide", self.follow_factor_wide)?;
        Ok(())
    }
}

/// Which of the two filter policies applies this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingMode {
    /// Confident click: zero-latency acknowledgment.
    Snap,
    FollowZoomed,
    FollowWide,
}

#[derive(Debug)]
pub struct TargetSmoother {
    config: TargetSmootherConfig,
    filtered: Option<TargetPoint>,
}

impl TargetSmoother {
    pub fn new(config: TargetSmootherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            filtered: None,
        })
    }

    /// One filter step: `filtered += (raw - filtered) * factor`.
    pub fn apply(&mut self, raw: TargetPoint, mode: SmoothingMode) -> TargetPoint {
        let factor = match mode {
            SmoothingMode::Snap => self.config.snap_factor,
            SmoothingMode::FollowZoomed => self.config.follow_factor_zoomed,
            SmoothingMode::FollowWide => self.config.follow_factor_wide,
        };

        let Some(current) = self.filtered else {
            self.filtered = Some(raw);
            return raw;
        };

        let next = TargetPoint {
            x: current.x + (raw.x - current.x) * factor,
            y: current.y + (raw.y - current.y) * factor,
        };
        self.filtered = Some(next);
        next
    }

    pub fn filtered(&self) -> Option<TargetPoint> {
        self.filtered
    }
}
