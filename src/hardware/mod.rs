//! Platform abstraction layer
//!
//! The session talks to the positioning provider, the wake resource and the
//! foreground host only through the traits in this module. Mock and simulated
//! implementations live alongside for tests and the demo binary.

pub mod provider;
pub mod wake;
pub mod foreground;
pub mod simulated;
pub mod mock;
pub mod error;

pub use provider::{FixCallback, FixDelivery, FixRoute, LocationProvider};
pub use wake::{DeadlineWakeLock, WakeResource};
pub use foreground::{ForegroundHost, StatusIndicator, TracingForeground};
pub use simulated::SimulatedProvider;
pub use mock::{CallJournal, MockForeground, MockProvider, MockWakeLock};
pub use error::{ProviderError, ProviderResult, ResourceError, ResourceKind};
