//! Acquisition policy
//!
//! Translates the tunable session parameters into the request descriptor the
//! positioning provider understands. `start` and `reconfigure` both go through
//! [`build_request`], so the descriptor a provider sees depends only on the
//! stored [`AcquisitionConfig`].

pub mod acquisition;
pub mod request;

pub use acquisition::{AcquisitionConfig, SettingsUpdate};
pub use request::{build_request, RequestDescriptor};
