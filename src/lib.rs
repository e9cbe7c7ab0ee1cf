//! Autonomous virtual camera for screen-capture recordings: infers what the
//! user is doing from pixel-difference samples and key events, then pans and
//! zooms a spring-damped view rectangle to keep the action in frame.

pub mod algorithm;
pub mod director;
pub mod models;
pub mod session;

pub use algorithm::ConfigError;
pub use director::{CameraDirector, DirectorConfig};
pub use models::geometry::{TargetPoint, ViewRect};
pub use session::driver::{start_session, SessionConfig, SessionHandle};
