//! Tokio session runtime.
//!
//! Architecture:
//!   1. `start_session` spawns one task per recording session. The task owns
//!      the director outright; nothing else touches it.
//!   2. A fixed-rate interval drives one director step per tick. Missed
//!      ticks are burst-replayed, never dropped, so physics fidelity does
//!      not depend on how often the compositor reads frames.
//!   3. Key events arrive through an unbounded command channel and are
//!      drained at the top of each tick, ahead of the director step.
//!   4. The latest view rectangle is published through a watch channel.
//!   5. `SessionCommand::Stop` ends the loop; the task returns the
//!      accumulated `SessionReport`.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::algorithm::{require_positive, ConfigError};
use crate::director::CameraDirector;
use crate::models::geometry::{TargetPoint, ViewRect};
use crate::models::session::{CameraSample, SessionMeta, SessionReport};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Nominal physics rate. Independent of the downstream frame rate.
    pub tick_rate_hz: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { tick_rate_hz: 60.0 }
    }
}

/// Commands merged into the tick loop.
#[derive(Debug, Clone, Copy)]
pub enum SessionCommand {
    /// A qualifying keypress, with the caret position when the lookup
    /// succeeded.
    KeyDown { caret: Option<TargetPoint> },
    /// End the session; the task returns its report.
    Stop,
}

/// Caller-side handle to a running session.
#[derive(Debug)]
pub struct SessionHandle {
    meta: SessionMeta,
    commands: UnboundedSender<SessionCommand>,
    view_rx: watch::Receiver<ViewRect>,
    task: JoinHandle<SessionReport>,
}

impl SessionHandle {
    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    /// Entry point for the typing path. Safe from any task; the event is
    /// merged at the next tick boundary.
    pub fn notify_keydown(&self, caret: Option<TargetPoint>) {
        self.commands.send(SessionCommand::KeyDown { caret }).ok();
    }

    /// Latest published view rectangle.
    pub fn view_rect(&self) -> ViewRect {
        *self.view_rx.borrow()
    }

    /// A fresh receiver for the compositor to await rect updates on.
    pub fn subscribe(&self) -> watch::Receiver<ViewRect> {
        self.view_rx.clone()
    }

    pub fn stop(&self) {
        self.commands.send(SessionCommand::Stop).ok();
    }

    /// Stops the session and waits for its report.
    pub async fn join(self) -> SessionReport {
        self.stop();
        match self.task.await {
            Ok(report) => report,
            Err(err) => {
                log::error!("session task failed: {err}");
                SessionReport {
                    meta: self.meta,
                    ticks: 0,
                    trace: Vec::new(),
                }
            }
        }
    }
}

/// Starts a recording session around `director`.
///
/// `grid_source` is polled once per tick for the downsampled RGB buffer;
/// `None` means no frame was delivered this tick and the director still
/// steps its physics.
pub fn start_session<F>(
    director: CameraDirector,
    grid_source: F,
    config: SessionConfig,
) -> Result<SessionHandle, ConfigError>
where
    F: FnMut() -> Option<Vec<u8>> + Send + 'static,
{
    require_positive("tick_rate_hz", config.tick_rate_hz)?;

    let (frame_width, frame_height) = director.frame_size();
    let meta = SessionMeta {
        session_id: uuid::Uuid::new_v4().to_string(),
        started_at: chrono::Utc::now(),
        tick_rate_hz: config.tick_rate_hz,
        frame_width,
        frame_height,
    };
    log::info!(
        "session start: id={} rate={}Hz frame={}x{}",
        meta.session_id,
        config.tick_rate_hz,
        frame_width,
        frame_height
    );

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(director.view_rect());
    let task = tokio::spawn(run_loop(
        director,
        grid_source,
        config,
        meta.clone(),
        command_rx,
        view_tx,
    ));

    Ok(SessionHandle {
        meta,
        commands: command_tx,
        view_rx,
        task,
    })
}

async fn run_loop<F>(
    mut director: CameraDirector,
    mut grid_source: F,
    config: SessionConfig,
    meta: SessionMeta,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    view_tx: watch::Sender<ViewRect>,
) -> SessionReport
where
    F: FnMut() -> Option<Vec<u8>> + Send + 'static,
{
    let dt = 1.0 / config.tick_rate_hz;
    let mut ticker = time::interval(Duration::from_secs_f64(dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    let mut trace: Vec<CameraSample> = Vec::new();

    'session: loop {
        ticker.tick().await;

        loop {
            match commands.try_recv() {
                Ok(SessionCommand::KeyDown { caret }) => director.notify_keydown(caret),
                Ok(SessionCommand::Stop) | Err(TryRecvError::Disconnected) => break 'session,
                Err(TryRecvError::Empty) => break,
            }
        }

        let grid = grid_source();
        let rect = director.advance(grid.as_deref(), dt);
        trace.push(director.trace_sample());

        if view_tx.send(rect).is_err() {
            // Every receiver is gone; nobody is watching this camera.
            break 'session;
        }
    }

    log::info!("session stop: id={} ticks={}", meta.session_id, trace.len());
    SessionReport {
        meta,
        ticks: trace.len() as u64,
        trace,
    }
}
