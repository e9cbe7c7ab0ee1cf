//! Critically damped spring camera over the source frame.
//!
//! Position follows a spring-damper, zoom follows an independent
//! exponential approach; all discreteness lives upstream in the arbiter.

use crate::algorithm::{require_positive, ConfigError};
use crate::models::geometry::{TargetPoint, ViewRect};

#[derive(Debug, Clone)]
pub struct CameraRigConfig {
    pub stiffness: f64,
    pub mass: f64,
    /// 1.0 shows the full frame.
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Rate constant of the exponential zoom approach, per second.
    pub zoom_transition_speed: f64,
}

impl Default for CameraRigConfig {
    fn default() -> Self {
        Self {
            stiffness: 80.0,
            mass: 1.0,
            zoom_min: 1.0,
            zoom_max: 2.5,
            zoom_transition_speed: 5.0,
        }
    }
}

impl CameraRigConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("stiffness", self.stiffness)?;
        require_positive("mass", self.mass)?;
        require_positive("zoom_transition_speed", self.zoom_transition_speed)?;
        if !self.zoom_min.is_finite() || self.zoom_min < 1.0 {
            return Err(ConfigError::NonPositive {
                field: "zoom_min",
                value: self.zoom_min,
            });
        }
        if !self.zoom_max.is_finite() || self.zoom_max < self.zoom_min {
            return Err(ConfigError::EmptyZoomRange {
                min: self.zoom_min,
                max: self.zoom_max,
            });
        }
        Ok(())
    }
}

/// Continuous camera state: center position, velocity, and zoom.
#[derive(Debug)]
pub struct CameraRig {
    config: CameraRigConfig,
    /// Derived once at construction: `2 * sqrt(stiffness * mass)` keeps the
    /// spring critically damped for any runtime target sequence.
    damping: f64,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    zoom_level: f64,
    target_zoom: f64,
    src_width: f64,
    src_height: f64,
}

impl CameraRig {
    pub fn new(config: CameraRigConfig, src_width: f64, src_height: f64) -> Result<Self, ConfigError> {
        config.validate()?;
        require_positive("src_width", src_width)?;
        require_positive("src_height", src_height)?;

        let damping = 2.0 * (config.stiffness * config.mass).sqrt();
        let zoom_level = config.zoom_min;
        Ok(Self {
            config,
            damping,
            x: src_width / 2.0,
            y: src_height / 2.0,
            vx: 0.0,
            vy: 0.0,
            zoom_level,
            target_zoom: zoom_level,
            src_width,
            src_height,
        })
    }

    pub fn set_target_zoom(&mut self, zoom: f64) {
        self.target_zoom = zoom.max(self.config.zoom_min);
    }

    /// Advances the simulation by one step toward `(target_x, target_y)`.
    pub fn update(&mut self, target_x: f64, target_y: f64, dt: f64) {
        let safe_dt = dt.max(0.000_001);

        // Zoom first: the current zoom defines the legal center range.
        let zoom_diff = self.target_zoom - self.zoom_level;
        self.zoom_level += zoom_diff * self.config.zoom_transition_speed * safe_dt;
        self.zoom_level = self.zoom_level.clamp(self.config.zoom_min, self.config.zoom_max);

        let view_w = self.src_width / self.zoom_level;
        let view_h = self.src_height / self.zoom_level;
        let min_x = view_w / 2.0;
        let max_x = self.src_width - view_w / 2.0;
        let min_y = view_h / 2.0;
        let max_y = self.src_height - view_h / 2.0;

        // Clamp the target before the spring sees it so the camera never
        // spends energy chasing an unreachable point.
        let clamped_target_x = target_x.clamp(min_x, max_x);
        let clamped_target_y = target_y.clamp(min_y, max_y);

        let accel_x = (self.config.stiffness * (clamped_target_x - self.x)
            - self.damping * self.vx)
            / self.config.mass;
        let accel_y = (self.config.stiffness * (clamped_target_y - self.y)
            - self.damping * self.vy)
            / self.config.mass;

        self.vx += accel_x * safe_dt;
        self.vy += accel_y * safe_dt;
        self.x += self.vx * safe_dt;
        self.y += self.vy * safe_dt;

        // The zoom may still be widening the view; kill velocity on any
        // axis that lands on a bound.
        if self.x < min_x {
            self.x = min_x;
            self.vx = 0.0;
        }
        if self.x > max_x {
            self.x = max_x;
            self.vx = 0.0;
        }
        if self.y < min_y {
            self.y = min_y;
            self.vy = 0.0;
        }
        if self.y > max_y {
            self.y = max_y;
            self.vy = 0.0;
        }
    }

    /// Derives the crop rectangle without mutating state.
    pub fn view_rect(&self) -> ViewRect {
        let view_w = self.src_width / self.zoom_level;
        let view_h = self.src_height / self.zoom_level;
        ViewRect {
            x: self.x - view_w / 2.0,
            y: self.y - view_h / 2.0,
            width: view_w,
            height: view_h,
            zoom: self.zoom_level,
        }
    }

    pub fn position(&self) -> TargetPoint {
        TargetPoint {
            x: self.x,
            y: self.y,
        }
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn target_zoom(&self) -> f64 {
        self.target_zoom
    }
}
