//! Provider and platform resource error types

use std::fmt;

/// Errors reported by a positioning provider
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The caller lacks the location permission
    PermissionDenied { permission: String },
    /// Cancellation found no live subscription
    NoActiveSubscription,
    /// The provider backend is not reachable
    Unavailable { details: String },
    /// The provider refused a request parameter
    InvalidRequest { parameter: String, value: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::PermissionDenied { permission } => {
                write!(f, "Permission denied: {}", permission)
            }
            ProviderError::NoActiveSubscription => {
                write!(f, "No active location subscription")
            }
            ProviderError::Unavailable { details } => {
                write!(f, "Location provider unavailable: {}", details)
            }
            ProviderError::InvalidRequest { parameter, value } => {
                write!(f, "Provider rejected {} = {}", parameter, value)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// True when the rejection stems from missing authorization
    pub fn is_authorization(&self) -> bool {
        matches!(self, ProviderError::PermissionDenied { .. })
    }

    /// True when the error only reports that nothing was subscribed
    pub fn is_absent_subscription(&self) -> bool {
        matches!(self, ProviderError::NoActiveSubscription)
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Platform resources a session holds while active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Keeps the device from suspending
    WakeLock,
    /// Elevated priority with a persistent status indicator
    Foreground,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::WakeLock => write!(f, "wake lock"),
            ResourceKind::Foreground => write!(f, "foreground mode"),
        }
    }
}

/// Failure to acquire a platform resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceError {
    pub resource: ResourceKind,
    pub details: String,
}

impl ResourceError {
    pub fn new(resource: ResourceKind, details: impl Into<String>) -> Self {
        Self {
            resource,
            details: details.into(),
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to acquire {}: {}", self.resource, self.details)
    }
}

impl std::error::Error for ResourceError {}
