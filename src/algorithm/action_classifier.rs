//! Shape-based classification of a motion sample.
//!
//! Scroll and click are told apart by the extent of changed pixels, not
//! their velocity: document movement repaints a tall contiguous region,
//! while click feedback is a compact low-area blob.

use crate::models::sample::{ActionKind, MotionSample};

#[derive(Debug, Clone)]
pub struct ActionClassifierConfig {
    /// Minimum bounding-box height (cells) for a scroll candidate.
    pub scroll_min_box_height: u32,
    /// Bounding-box area (cells) separating localized actions from
    /// large-area change. Above it: scroll candidate. Below it: click
    /// candidate.
    pub action_max_area: u32,
    pub click_min_mass: u32,
    /// Upper mass bound for clicks; rejects full-frame animations.
    pub click_max_mass: u32,
    pub click_max_box_width: u32,
    pub click_max_box_height: u32,
}

impl Default for ActionClassifierConfig {
    fn default() -> Self {
        Self {
            scroll_min_box_height: 18,
            action_max_area: 64,
            click_min_mass: 3,
            click_max_mass: 48,
            click_max_box_width: 10,
            click_max_box_height: 8,
        }
    }
}

/// Classifies a non-empty sample. Never fails: out-of-range configuration
/// (for example `click_min_mass` above `click_max_mass`) degrades to rules
/// that never match, and the sample falls through to `Ambient`.
pub fn classify(sample: &MotionSample, config: &ActionClassifierConfig) -> ActionKind {
    let box_width = sample.bounds.width();
    let box_height = sample.bounds.height();
    let area = sample.bounds.area();

    if box_height > config.scroll_min_box_height && area > config.action_max_area {
        return ActionKind::Scrolling;
    }

    let compact =
        box_width < config.click_max_box_width && box_height < config.click_max_box_height;
    if compact
        && area < config.action_max_area
        && sample.mass >= config.click_min_mass
        && sample.mass < config.click_max_mass
    {
        return ActionKind::ClickLike;
    }

    ActionKind::Ambient
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geometry::TargetPoint;
    use crate::models::sample::GridBounds;

    fn sample(mass: u32, min_x: u32, max_x: u32, min_y: u32, max_y: u32) -> MotionSample {
        MotionSample {
            centroid_x: f64::from(min_x + max_x) / 2.0,
            centroid_y: f64::from(min_y + max_y) / 2.0,
            mass,
            bounds: GridBounds {
                min_x,
                max_x,
                min_y,
                max_y,
            },
            focus: TargetPoint::new(0.0, 0.0),
        }
    }

    #[test]
    fn tall_large_area_change_is_scrolling() {
        let config = ActionClassifierConfig::default();
        // A 6x30 band: height 30 > 18 and area 180 > 64.
        let verdict = classify(&sample(120, 20, 25, 2, 31), &config);
        assert_eq!(verdict, ActionKind::Scrolling);
    }

    #[test]
    fn compact_blob_is_click_like() {
        let config = ActionClassifierConfig::default();
        // A 4x3 blob with 8 changed cells.
        let verdict = classify(&sample(8, 10, 13, 9, 11), &config);
        assert_eq!(verdict, ActionKind::ClickLike);
    }

    #[test]
    fn wide_but_short_change_is_ambient_not_scroll() {
        let config = ActionClassifierConfig::default();
        // A 40x4 strip: area 160 > 64 but height 4 below the scroll bound.
        let verdict = classify(&sample(100, 10, 49, 6, 9), &config);
        assert_eq!(verdict, ActionKind::Ambient);
    }

    #[test]
    fn tiny_mass_is_ambient_cursor_jitter() {
        let config = ActionClassifierConfig::default();
        let verdict = classify(&sample(2, 30, 31, 15, 15), &config);
        assert_eq!(verdict, ActionKind::Ambient);
    }

    #[test]
    fn dense_compact_flash_is_rejected_by_mass_ceiling() {
        let config = ActionClassifierConfig::default();
        // A saturated 8x7 block: compact, area 56 < 64, but mass 56 >= 48.
        let verdict = classify(&sample(56, 0, 7, 0, 6), &config);
        assert_eq!(verdict, ActionKind::Ambient);
    }

    #[test]
    fn scroll_wins_over_click_when_both_shapes_overlap() {
        // Degenerate config where the scroll test also matches small boxes.
        let config = ActionClassifierConfig {
            scroll_min_box_height: 2,
            action_max_area: 10,
            ..ActionClassifierConfig::default()
        };
        let verdict = classify(&sample(12, 0, 3, 0, 3), &config);
        assert_eq!(verdict, ActionKind::Scrolling);
    }

    #[test]
    fn inverted_mass_bounds_degrade_to_never_click() {
        let config = ActionClassifierConfig {
            click_min_mass: 50,
            click_max_mass: 10,
            ..ActionClassifierConfig::default()
        };
        let verdict = classify(&sample(8, 10, 13, 9, 11), &config);
        assert_eq!(verdict, ActionKind::Ambient);
    }
}
