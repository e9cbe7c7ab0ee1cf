//! The per-tick pipeline stages: motion sampling, action classification,
//! input arbitration, target smoothing, and the spring camera rig.

pub mod action_classifier;
pub mod camera_rig;
pub mod input_arbiter;
pub mod motion_sampler;
pub mod target_smoother;

use thiserror::Error;

/// Configuration rejected at construction time.
///
/// The only error class in this crate: every runtime failure is a degraded
/// decision instead (an invalid grid buffer yields no sample, a missing caret
/// keeps the previous focus).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must lie in [0, 1], got {value}")]
    OutsideUnitRange { field: &'static str, value: f64 },
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("zoom range is empty: min {min} must not exceed max {max}")]
    EmptyZoomRange { min: f64, max: f64 },
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) fn require_unit_range(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutsideUnitRange { field, value })
    }
}

pub(crate) fn require_at_least(
    field: &'static str,
    min: u64,
    value: u64,
) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::BelowMinimum { field, min, value })
    }
}
