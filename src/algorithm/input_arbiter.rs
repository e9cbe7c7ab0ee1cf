//! Priority arbitration between scroll, click, typing, and idle evidence.
//!
//! The arbiter is the only stateful decision-maker in the pipeline. It is a
//! pure function of (sample, classifier verdict, clock, key state) plus the
//! state it owns: the sliding click window, the typing session, and the
//! last-motion timer. Resolution order every tick: warmup, scroll, click
//! window, typing, idle, then maintain.

use std::collections::VecDeque;

use crate::algorithm::{require_at_least, ConfigError};
use crate::models::geometry::TargetPoint;
use crate::models::sample::{ActionKind, MotionSample};

#[derive(Debug, Clone)]
pub struct InputArbiterConfig {
    /// Ticks during which all classification and key input is suppressed,
    /// absorbing capture/encoder startup transients.
    pub warmup_ticks: u64,
    /// Sliding window over click-like timestamps.
    pub click_window_ms: u64,
    /// Clicks required inside the window before zoom engages. Two by
    /// default: a lone click is indistinguishable from cursor jitter.
    pub click_trigger_count: usize,
    pub idle_timeout_ms: u64,
    pub typing_idle_timeout_ms: u64,
    /// Motion mass that cancels an active typing session (the user has
    /// switched back to the pointer).
    pub typing_override_mass: u32,
    pub zoom_out_level: f64,
    pub zoom_in_level: f64,
}

impl Default for InputArbiterConfig {
    fn default() -> Self {
        Self {
            warmup_ticks: 90,
            click_window_ms: 3_000,
            click_trigger_count: 2,
            idle_timeout_ms: 2_000,
            typing_idle_timeout_ms: 2_000,
            typing_override_mass: 24,
            zoom_out_level: 1.0,
            zoom_in_level: 2.0,
        }
    }
}

impl InputArbiterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_at_least("click_window_ms", 1, self.click_window_ms)?;
        require_at_least("click_trigger_count", 1, self.click_trigger_count as u64)?;
        require_at_least("idle_timeout_ms", 1, self.idle_timeout_ms)?;
        require_at_least("typing_idle_timeout_ms", 1, self.typing_idle_timeout_ms)?;
        if !self.zoom_out_level.is_finite() || self.zoom_out_level < 1.0 {
            return Err(ConfigError::NonPositive {
                field: "zoom_out_level",
                value: self.zoom_out_level,
            });
        }
        if !self.zoom_in_level.is_finite() || self.zoom_in_level < self.zoom_out_level {
            return Err(ConfigError::EmptyZoomRange {
                min: self.zoom_out_level,
                max: self.zoom_in_level,
            });
        }
        Ok(())
    }
}

/// Authoritative per-tick output: the discrete zoom level the camera should
/// head toward and the point it should frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomDecision {
    pub target_zoom: f64,
    pub focus: TargetPoint,
}

#[derive(Debug, Clone, Copy)]
struct ClickEntry {
    ts_ms: f64,
    focus: TargetPoint,
}

/// Sliding window of recent click-like events.
///
/// Invariant: after `prune`, every entry is younger than the window
/// duration relative to "now".
#[derive(Debug, Default)]
struct ClickWindow {
    entries: VecDeque<ClickEntry>,
}

impl ClickWindow {
    fn push(&mut self, ts_ms: f64, focus: TargetPoint) {
        self.entries.push_back(ClickEntry { ts_ms, focus });
    }

    fn prune(&mut self, now_ms: f64, window_ms: u64) {
        let cutoff = now_ms - window_ms as f64;
        while self
            .entries
            .front()
            .is_some_and(|entry| entry.ts_ms < cutoff)
        {
            self.entries.pop_front();
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean position of the clicks still inside the window.
    fn centroid(&self) -> Option<TargetPoint> {
        if self.entries.is_empty() {
            return None;
        }
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        for entry in &self.entries {
            sum_x += entry.focus.x;
            sum_y += entry.focus.y;
        }
        let count = self.entries.len() as f64;
        Some(TargetPoint {
            x: sum_x / count,
            y: sum_y / count,
        })
    }
}

/// Key-driven focus state. Refreshed on each qualifying keypress, expired
/// by the typing idle timeout, cancelled outright by pointer motion.
#[derive(Debug, Default)]
struct TypingSession {
    last_key_ms: Option<f64>,
    caret: Option<TargetPoint>,
}

impl TypingSession {
    fn refresh(&mut self, now_ms: f64, caret: Option<TargetPoint>) {
        self.last_key_ms = Some(now_ms);
        // A failed caret lookup keeps the timer alive but not the target.
        if caret.is_some() {
            self.caret = caret;
        }
    }

    fn is_active(&self, now_ms: f64, timeout_ms: u64) -> bool {
        self.last_key_ms
            .is_some_and(|last| now_ms - last < timeout_ms as f64)
    }

    fn cancel(&mut self) {
        self.last_key_ms = None;
        self.caret = None;
    }
}

#[derive(Debug)]
pub struct InputArbiter {
    config: InputArbiterConfig,
    clicks: ClickWindow,
    typing: TypingSession,
    last_motion_ms: Option<f64>,
    ticks_seen: u64,
    /// The click window reached the trigger count and has not drained since.
    zoom_armed: bool,
    decision: ZoomDecision,
}

impl InputArbiter {
    pub fn new(config: InputArbiterConfig, initial_focus: TargetPoint) -> Result<Self, ConfigError> {
        config.validate()?;
        let decision = ZoomDecision {
            target_zoom: config.zoom_out_level,
            focus: initial_focus,
        };
        Ok(Self {
            config,
            clicks: ClickWindow::default(),
            typing: TypingSession::default(),
            last_motion_ms: None,
            ticks_seen: 0,
            zoom_armed: false,
            decision,
        })
    }

    /// Entry point for the typing path. Keydowns during warmup are dropped.
    pub fn notify_keydown(&mut self, now_ms: f64, caret: Option<TargetPoint>) {
        if self.ticks_seen < self.config.warmup_ticks {
            return;
        }
        self.typing.refresh(now_ms, caret);
        log::trace!("arbiter: keydown at {now_ms:.1}ms, caret={caret:?}");
    }

    /// Resolves the zoom decision for one tick.
    pub fn resolve(
        &mut self,
        observation: Option<(&MotionSample, ActionKind)>,
        now_ms: f64,
    ) -> ZoomDecision {
        let tick = self.ticks_seen;
        self.ticks_seen += 1;

        if tick < self.config.warmup_ticks {
            self.decision.target_zoom = self.config.zoom_out_level;
            return self.decision;
        }

        if let Some((sample, _)) = observation {
            self.last_motion_ms = Some(now_ms);
            if self.typing.is_active(now_ms, self.config.typing_idle_timeout_ms)
                && sample.mass >= self.config.typing_override_mass
            {
                log::debug!(
                    "arbiter: typing cancelled by pointer motion (mass {})",
                    sample.mass
                );
                self.typing.cancel();
            }
        }

        self.clicks.prune(now_ms, self.config.click_window_ms);
        if self.clicks.is_empty() {
            self.zoom_armed = false;
        }

        match observation {
            Some((_, ActionKind::Scrolling)) => {
                // Absolute priority: scrolling always zooms out and voids
                // any pending clicks.
                if self.zoom_armed || !self.clicks.is_empty() {
                    log::debug!("arbiter: scroll detected, click window cleared");
                }
                self.clicks.clear();
                self.zoom_armed = false;
                self.decision.target_zoom = self.config.zoom_out_level;
                return self.decision;
            }
            Some((sample, ActionKind::ClickLike)) => {
                self.clicks.push(now_ms, sample.focus);
                if self.clicks.len() >= self.config.click_trigger_count {
                    if !self.zoom_armed {
                        log::debug!(
                            "arbiter: click window reached {} clicks, zoom engaged",
                            self.clicks.len()
                        );
                    }
                    self.zoom_armed = true;
                }
            }
            Some((_, ActionKind::Ambient)) | None => {}
        }

        if self.zoom_armed {
            self.decision.target_zoom = self.config.zoom_in_level;
            if let Some(centroid) = self.clicks.centroid() {
                self.decision.focus = centroid;
            }
            return self.decision;
        }

        if self.typing.is_active(now_ms, self.config.typing_idle_timeout_ms) {
            self.decision.target_zoom = self.config.zoom_in_level;
            if let Some(caret) = self.typing.caret {
                self.decision.focus = caret;
            }
            return self.decision;
        }

        let idle = self
            .last_motion_ms
            .is_none_or(|last| now_ms - last >= self.config.idle_timeout_ms as f64);
        if idle && self.clicks.is_empty() {
            self.decision.target_zoom = self.config.zoom_out_level;
            return self.decision;
        }

        // Ambient motion or an open-but-untriggered click window: maintain.
        self.decision
    }

    /// True while the click window keeps pointer zoom engaged.
    pub fn zoom_armed(&self) -> bool {
        self.zoom_armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample::GridBounds;

    const ZOOM_OUT: f64 = 1.0;
    const ZOOM_IN: f64 = 2.0;

    fn arbiter_without_warmup() -> InputArbiter {
        let config = InputArbiterConfig {
            warmup_ticks: 0,
            ..InputArbiterConfig::default()
        };
        InputArbiter::new(config, TargetPoint::new(960.0, 540.0)).expect("valid config")
    }

    fn click_sample(x: f64, y: f64) -> MotionSample {
        MotionSample {
            centroid_x: x / 30.0,
            centroid_y: y / 30.0,
            mass: 8,
            bounds: GridBounds {
                min_x: 10,
                max_x: 13,
                min_y: 9,
                max_y: 11,
            },
            focus: TargetPoint::new(x, y),
        }
    }

    fn scroll_sample() -> MotionSample {
        MotionSample {
            centroid_x: 32.0,
            centroid_y: 18.0,
            mass: 300,
            bounds: GridBounds {
                min_x: 4,
                max_x: 60,
                min_y: 2,
                max_y: 33,
            },
            focus: TargetPoint::new(960.0, 540.0),
        }
    }

    fn ambient_sample(mass: u32) -> MotionSample {
        MotionSample {
            mass,
            ..click_sample(400.0, 300.0)
        }
    }

    #[test]
    fn warmup_forces_zoom_out_and_suppresses_everything() {
        let config = InputArbiterConfig {
            warmup_ticks: 3,
            ..InputArbiterConfig::default()
        };
        let mut arbiter =
            InputArbiter::new(config, TargetPoint::new(960.0, 540.0)).expect("valid config");

        arbiter.notify_keydown(0.0, Some(TargetPoint::new(10.0, 10.0)));
        let click = click_sample(100.0, 100.0);
        for tick in 0..3u64 {
            let decision =
                arbiter.resolve(Some((&click, ActionKind::ClickLike)), tick as f64 * 16.0);
            assert_eq!(decision.target_zoom, ZOOM_OUT);
        }

        // Post-warmup, neither the warmup clicks nor the keydown leaked.
        let decision = arbiter.resolve(None, 100.0);
        assert_eq!(decision.target_zoom, ZOOM_OUT);
        assert!(!arbiter.zoom_armed());
    }

    #[test]
    fn single_click_never_enables_zoom() {
        let mut arbiter = arbiter_without_warmup();
        let click = click_sample(100.0, 100.0);

        let decision = arbiter.resolve(Some((&click, ActionKind::ClickLike)), 0.0);
        assert_eq!(decision.target_zoom, ZOOM_OUT);

        // The open window keeps idle at bay but never engages on its own.
        let decision = arbiter.resolve(None, 2_500.0);
        assert_eq!(decision.target_zoom, ZOOM_OUT);
    }

    #[test]
    fn two_clicks_inside_the_window_enable_zoom_at_their_midpoint() {
        let mut arbiter = arbiter_without_warmup();

        let first = click_sample(100.0, 100.0);
        arbiter.resolve(Some((&first, ActionKind::ClickLike)), 0.0);
        let second = click_sample(102.0, 101.0);
        let decision = arbiter.resolve(Some((&second, ActionKind::ClickLike)), 80.0);

        assert_eq!(decision.target_zoom, ZOOM_IN);
        assert!((decision.focus.x - 101.0).abs() < 1e-9);
        assert!((decision.focus.y - 100.5).abs() < 1e-9);
        assert!(arbiter.zoom_armed());
    }

    #[test]
    fn clicks_separated_by_more_than_the_window_never_pair() {
        let mut arbiter = arbiter_without_warmup();
        let click = click_sample(100.0, 100.0);

        arbiter.resolve(Some((&click, ActionKind::ClickLike)), 0.0);
        // Gap exceeding the window: the first click ages out.
        arbiter.resolve(Some((&click, ActionKind::ClickLike)), 3_500.0);
        let decision = arbiter.resolve(Some((&click, ActionKind::ClickLike)), 7_200.0);

        assert_eq!(decision.target_zoom, ZOOM_OUT);
        assert!(!arbiter.zoom_armed());
    }

    #[test]
    fn scroll_preempts_an_armed_click_window() {
        let mut arbiter = arbiter_without_warmup();
        let click = click_sample(100.0, 100.0);
        arbiter.resolve(Some((&click, ActionKind::ClickLike)), 0.0);
        arbiter.resolve(Some((&click, ActionKind::ClickLike)), 50.0);
        assert!(arbiter.zoom_armed());

        let scroll = scroll_sample();
        let decision = arbiter.resolve(Some((&scroll, ActionKind::Scrolling)), 100.0);
        assert_eq!(decision.target_zoom, ZOOM_OUT);
        assert!(!arbiter.zoom_armed());

        // Idempotent: repeated scroll ticks keep it zoomed out.
        let decision = arbiter.resolve(Some((&scroll, ActionKind::Scrolling)), 116.0);
        assert_eq!(decision.target_zoom, ZOOM_OUT);
    }

    #[test]
    fn keydown_enables_zoom_at_the_caret() {
        let mut arbiter = arbiter_without_warmup();
        arbiter.resolve(None, 0.0);

        arbiter.notify_keydown(100.0, Some(TargetPoint::new(640.0, 360.0)));
        let decision = arbiter.resolve(None, 116.0);

        assert_eq!(decision.target_zoom, ZOOM_IN);
        assert_eq!(decision.focus, TargetPoint::new(640.0, 360.0));
    }

    #[test]
    fn keydown_without_caret_keeps_previous_focus() {
        let mut arbiter = arbiter_without_warmup();
        arbiter.notify_keydown(0.0, Some(TargetPoint::new(640.0, 360.0)));
        arbiter.resolve(None, 16.0);

        // Caret lookup failed on the refresh keypress.
        arbiter.notify_keydown(1_000.0, None);
        let decision = arbiter.resolve(None, 1_016.0);

        assert_eq!(decision.target_zoom, ZOOM_IN);
        assert_eq!(decision.focus, TargetPoint::new(640.0, 360.0));
    }

    #[test]
    fn pointer_motion_cancels_typing_on_the_same_tick() {
        let mut arbiter = arbiter_without_warmup();
        arbiter.notify_keydown(0.0, Some(TargetPoint::new(640.0, 360.0)));
        assert_eq!(arbiter.resolve(None, 16.0).target_zoom, ZOOM_IN);

        let burst = ambient_sample(30);
        let decision = arbiter.resolve(Some((&burst, ActionKind::Ambient)), 32.0);
        // Typing is gone; ambient motion maintains whatever zoom was set.
        assert_eq!(decision.target_zoom, ZOOM_IN);

        // With typing cancelled, idle eventually zooms out.
        let decision = arbiter.resolve(None, 2_100.0);
        assert_eq!(decision.target_zoom, ZOOM_OUT);
    }

    #[test]
    fn small_motion_does_not_cancel_typing() {
        let mut arbiter = arbiter_without_warmup();
        arbiter.notify_keydown(0.0, Some(TargetPoint::new(640.0, 360.0)));

        let jitter = ambient_sample(5);
        let decision = arbiter.resolve(Some((&jitter, ActionKind::Ambient)), 16.0);
        assert_eq!(decision.target_zoom, ZOOM_IN);
        assert_eq!(decision.focus, TargetPoint::new(640.0, 360.0));
    }

    #[test]
    fn typing_does_not_cancel_pointer_zoom() {
        let mut arbiter = arbiter_without_warmup();
        let click = click_sample(100.0, 100.0);
        arbiter.resolve(Some((&click, ActionKind::ClickLike)), 0.0);
        arbiter.resolve(Some((&click, ActionKind::ClickLike)), 50.0);

        arbiter.notify_keydown(100.0, Some(TargetPoint::new(1_800.0, 900.0)));
        let decision = arbiter.resolve(None, 116.0);

        // The click window outranks typing while it is alive.
        assert_eq!(decision.target_zoom, ZOOM_IN);
        assert!((decision.focus.x - 100.0).abs() < 1.0);
    }

    #[test]
    fn typing_expires_after_the_idle_timeout() {
        let mut arbiter = arbiter_without_warmup();
        arbiter.notify_keydown(0.0, Some(TargetPoint::new(640.0, 360.0)));
        assert_eq!(arbiter.resolve(None, 16.0).target_zoom, ZOOM_IN);

        let decision = arbiter.resolve(None, 2_100.0);
        assert_eq!(decision.target_zoom, ZOOM_OUT);
    }

    #[test]
    fn idle_converges_to_zoom_out_and_stays_there() {
        let mut arbiter = arbiter_without_warmup();
        let click = click_sample(100.0, 100.0);
        arbiter.resolve(Some((&click, ActionKind::ClickLike)), 0.0);
        arbiter.resolve(Some((&click, ActionKind::ClickLike)), 50.0);

        // Window drains at 3050, idle satisfied long before; from there on
        // every quiet tick stays zoomed out.
        for step in 0..60u64 {
            let now = 3_100.0 + step as f64 * 100.0;
            let decision = arbiter.resolve(None, now);
            assert_eq!(decision.target_zoom, ZOOM_OUT, "tick at {now}ms");
        }
    }

    #[test]
    fn ambient_motion_maintains_the_current_zoom() {
        let mut arbiter = arbiter_without_warmup();
        let click = click_sample(100.0, 100.0);
        arbiter.resolve(Some((&click, ActionKind::ClickLike)), 0.0);
        arbiter.resolve(Some((&click, ActionKind::ClickLike)), 50.0);

        // Ambient jitter (too small to override typing, no clicks) long
        // after the window drained: zoom holds until idle is satisfied.
        let jitter = ambient_sample(5);
        let decision = arbiter.resolve(Some((&jitter, ActionKind::Ambient)), 3_500.0);
        assert_eq!(decision.target_zoom, ZOOM_IN);

        // Motion keeps resetting the idle timer, so it holds.
        let decision = arbiter.resolve(Some((&jitter, ActionKind::Ambient)), 5_000.0);
        assert_eq!(decision.target_zoom, ZOOM_IN);

        // Quiet for the idle timeout: released.
        let decision = arbiter.resolve(None, 7_100.0);
        assert_eq!(decision.target_zoom, ZOOM_OUT);
    }

    #[test]
    fn zero_duration_click_window_is_rejected() {
        let config = InputArbiterConfig {
            click_window_ms: 0,
            ..InputArbiterConfig::default()
        };
        let err = InputArbiter::new(config, TargetPoint::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::BelowMinimum { field: "click_window_ms", .. }
        ));
    }

    #[test]
    fn inverted_zoom_levels_are_rejected() {
        let config = InputArbiterConfig {
            zoom_out_level: 2.0,
            zoom_in_level: 1.5,
            ..InputArbiterConfig::default()
        };
        let err = InputArbiter::new(config, TargetPoint::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyZoomRange { .. }));
    }
}
