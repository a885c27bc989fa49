//! Session error types

use crate::hardware::{ProviderError, ResourceError, ResourceKind};
use std::fmt;

/// Result type for session operations
pub type TrackingResult<T> = Result<T, TrackingError>;

/// Failures surfaced to callers of session commands
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingError {
    /// The provider rejected the request for lack of permission
    Authorization { reason: String },
    /// Wake resource or foreground mode could not be acquired
    ResourceAcquisition { resource: ResourceKind, details: String },
    /// Any other provider failure while subscribing
    Provider { error: ProviderError },
    /// The session owner thread is gone
    ServiceUnavailable,
    /// Malformed command arguments
    InvalidRequest { reason: String },
}

impl From<ProviderError> for TrackingError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::PermissionDenied { permission } => TrackingError::Authorization {
                reason: format!("missing permission {}", permission),
            },
            error => TrackingError::Provider { error },
        }
    }
}

impl From<ResourceError> for TrackingError {
    fn from(error: ResourceError) -> Self {
        TrackingError::ResourceAcquisition {
            resource: error.resource,
            details: error.details,
        }
    }
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::Authorization { reason } => {
                write!(f, "Location access not authorized: {}", reason)
            }
            TrackingError::ResourceAcquisition { resource, details } => {
                write!(f, "Failed to acquire {}: {}", resource, details)
            }
            TrackingError::Provider { error } => {
                write!(f, "Location provider error: {}", error)
            }
            TrackingError::ServiceUnavailable => {
                write!(f, "Tracking service is not running")
            }
            TrackingError::InvalidRequest { reason } => {
                write!(f, "Invalid request: {}", reason)
            }
        }
    }
}

impl std::error::Error for TrackingError {}

impl TrackingError {
    /// Short machine-readable code for the bridge layer
    pub fn code(&self) -> &'static str {
        match self {
            TrackingError::Authorization { .. } => "AUTHORIZATION",
            TrackingError::ResourceAcquisition { .. } => "RESOURCE_ACQUISITION",
            TrackingError::Provider { .. } => "PROVIDER",
            TrackingError::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            TrackingError::InvalidRequest { .. } => "INVALID_REQUEST",
        }
    }

    /// Whether the caller may retry after fixing the cause
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TrackingError::ServiceUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_maps_to_authorization() {
        let error: TrackingError = ProviderError::PermissionDenied {
            permission: "ACCESS_FINE_LOCATION".to_string(),
        }
        .into();
        assert_eq!(error.code(), "AUTHORIZATION");
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_other_provider_errors_preserved() {
        let error: TrackingError = ProviderError::Unavailable {
            details: "offline".to_string(),
        }
        .into();
        assert!(matches!(error, TrackingError::Provider { .. }));
    }

    #[test]
    fn test_resource_error_conversion() {
        let error: TrackingError = ResourceError::new(ResourceKind::Foreground, "denied").into();
        assert_eq!(
            error,
            TrackingError::ResourceAcquisition {
                resource: ResourceKind::Foreground,
                details: "denied".to_string(),
            }
        );
        assert!(!TrackingError::ServiceUnavailable.is_recoverable());
    }
}
