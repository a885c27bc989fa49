//! Tracking session lifecycle
//!
//! [`TrackingController`] is the Idle/Active state machine. It owns the wake
//! resource, the foreground mode and the provider subscription, and keeps all
//! three in step with the session state.

pub mod state;
pub mod error;
pub mod controller;

pub use state::{ActiveSession, SessionState, SessionStatus};
pub use error::{TrackingError, TrackingResult};
pub use controller::TrackingController;
