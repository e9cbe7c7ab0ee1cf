//! Per-tick composition of the pipeline: sampler, classifier, arbiter,
//! smoother, rig, strictly in that order, once per tick.

use crate::algorithm::action_classifier::{classify, ActionClassifierConfig};
use crate::algorithm::camera_rig::{CameraRig, CameraRigConfig};
use crate::algorithm::input_arbiter::{InputArbiter, InputArbiterConfig, ZoomDecision};
use crate::algorithm::motion_sampler::{MotionSampler, MotionSamplerConfig};
use crate::algorithm::target_smoother::{SmoothingMode, TargetSmoother, TargetSmootherConfig};
use crate::algorithm::{require_at_least, require_positive, ConfigError};
use crate::models::geometry::{TargetPoint, ViewRect};
use crate::models::sample::ActionKind;
use crate::models::session::CameraSample;

#[derive(Debug, Clone, Default)]
pub struct DirectorConfig {
    pub sampler: MotionSamplerConfig,
    pub classifier: ActionClassifierConfig,
    pub arbiter: InputArbiterConfig,
    pub smoother: TargetSmootherConfig,
    pub rig: CameraRigConfig,
}

/// The control loop owner. Holds all per-session state and the monotonic
/// session clock; everything it does is a pure, synchronous transformation
/// of the inputs handed to [`CameraDirector::advance`].
#[derive(Debug)]
pub struct CameraDirector {
    classifier: ActionClassifierConfig,
    sampler: MotionSampler,
    arbiter: InputArbiter,
    smoother: TargetSmoother,
    rig: CameraRig,
    zoom_out_level: f64,
    frame_width: u32,
    frame_height: u32,
    /// Session clock in milliseconds, advanced by `dt` each tick. Timers
    /// downstream compare against this, never against wall-clock time.
    elapsed_ms: f64,
    ticks: u64,
    last_decision: ZoomDecision,
    last_filtered: TargetPoint,
}

impl CameraDirector {
    /// The single fallible operation in the crate: every stage config is
    /// validated here, before any recording state exists.
    pub fn new(
        config: DirectorConfig,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, ConfigError> {
        require_at_least("frame_width", 1, u64::from(frame_width))?;
        require_at_least("frame_height", 1, u64::from(frame_height))?;

        let center = TargetPoint {
            x: f64::from(frame_width) / 2.0,
            y: f64::from(frame_height) / 2.0,
        };
        let zoom_out_level = config.arbiter.zoom_out_level;

        let sampler = MotionSampler::new(config.sampler, frame_width, frame_height)?;
        let arbiter = InputArbiter::new(config.arbiter, center)?;
        let smoother = TargetSmoother::new(config.smoother)?;
        let rig = CameraRig::new(
            config.rig,
            f64::from(frame_width),
            f64::from(frame_height),
        )?;

        Ok(Self {
            classifier: config.classifier,
            sampler,
            arbiter,
            smoother,
            rig,
            zoom_out_level,
            frame_width,
            frame_height,
            elapsed_ms: 0.0,
            ticks: 0,
            last_decision: ZoomDecision {
                target_zoom: zoom_out_level,
                focus: center,
            },
            last_filtered: center,
        })
    }

    /// Entry point for the typing path; safe to call between ticks.
    pub fn notify_keydown(&mut self, caret: Option<TargetPoint>) {
        self.arbiter.notify_keydown(self.elapsed_ms, caret);
    }

    /// Advances one tick. `grid` is the downsampled RGB buffer for this
    /// tick, or `None` when no frame was delivered; physics still steps.
    pub fn advance(&mut self, grid: Option<&[u8]>, dt: f64) -> ViewRect {
        self.elapsed_ms += dt.max(0.0) * 1_000.0;
        self.ticks += 1;

        let sample = grid.and_then(|grid| self.sampler.ingest(grid));
        let observation = sample
            .as_ref()
            .map(|sample| (sample, classify(sample, &self.classifier)));
        let kind = observation.map(|(_, kind)| kind);

        let decision = self.arbiter.resolve(observation, self.elapsed_ms);

        let mode = if kind == Some(ActionKind::ClickLike) && self.arbiter.zoom_armed() {
            SmoothingMode::Snap
        } else if decision.target_zoom > self.zoom_out_level {
            SmoothingMode::FollowZoomed
        } else {
            SmoothingMode::FollowWide
        };
        let filtered = self.smoother.apply(decision.focus, mode);

        self.rig.set_target_zoom(decision.target_zoom);
        self.rig.update(filtered.x, filtered.y, dt);

        self.last_decision = decision;
        self.last_filtered = filtered;
        self.rig.view_rect()
    }

    pub fn view_rect(&self) -> ViewRect {
        self.rig.view_rect()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Trace row for the tick that just ran.
    pub fn trace_sample(&self) -> CameraSample {
        let position = self.rig.position();
        CameraSample {
            tick: self.ticks.saturating_sub(1),
            ts_ms: self.elapsed_ms,
            center_x: position.x,
            center_y: position.y,
            zoom: self.rig.zoom_level(),
            target_x: self.last_filtered.x,
            target_y: self.last_filtered.y,
            target_zoom: self.last_decision.target_zoom,
        }
    }
}
