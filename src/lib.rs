//! GPS Tracking Session
//!
//! A long-running location-tracking session controller with an acquisition
//! policy, wake/foreground resource lifecycle and a fix event stream for an
//! attachable UI-layer sink.

pub mod core;
pub mod policy;
pub mod hardware;
pub mod session;
pub mod api;
pub mod utils;

// Re-export commonly used types
pub use core::{FixRecord, Priority, SubscriptionId};
pub use policy::{build_request, AcquisitionConfig, RequestDescriptor, SettingsUpdate};
pub use hardware::{
    DeadlineWakeLock, FixCallback, ForegroundHost, LocationProvider, ProviderError,
    SimulatedProvider, StatusIndicator, TracingForeground, WakeResource,
};
pub use session::{SessionState, SessionStatus, TrackingController, TrackingError, TrackingResult};
pub use api::{
    handle_call, Command, CommandOutcome, EventSink, FixEvent, JsonLinesSink, MethodCall,
    MethodResult, ServiceHandle, TrackingContext, TrackingService,
};
pub use utils::{init_logging, ConfigurationManager, ServiceConfig};
