//! Service-facing API
//!
//! The context, event sink and command types the UI layer talks to, plus the
//! owner-thread service and the JSON method bridge built on them.

pub mod context;
pub mod sink;
pub mod types;
pub mod service;
pub mod bridge;

pub use context::TrackingContext;
pub use sink::{EventSink, FixEvent, JsonLinesSink, RecordingSink, SinkError};
pub use types::{Command, CommandOutcome, CommandResponse};
pub use service::{ServiceHandle, TrackingService};
pub use bridge::{decode_settings, handle_call, MethodCall, MethodResult};
