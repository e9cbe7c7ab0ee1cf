//! Session identity and the per-tick camera trace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of one recording session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    /// UUID of the session, shared with downstream artifacts.
    pub session_id: String,
    /// Wall-clock anchor; all trace timestamps are relative to this.
    pub started_at: DateTime<Utc>,
    pub tick_rate_hz: f64,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// One row of the camera trace: where the camera was and where it was headed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSample {
    pub tick: u64,
    /// Milliseconds of session clock at the end of this tick.
    pub ts_ms: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub target_zoom: f64,
}

/// Returned by the session task on stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub meta: SessionMeta,
    pub ticks: u64,
    pub trace: Vec<CameraSample>,
}
