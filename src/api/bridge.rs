//! Method-call bridge for the UI layer
//!
//! Decodes JSON method calls into service commands and encodes the replies.
//! Settings arguments are a camelCase map; any subset may be present and
//! absent or `null` fields keep their previous value.

use crate::api::service::ServiceHandle;
use crate::core::Priority;
use crate::policy::SettingsUpdate;
use crate::session::{TrackingError, TrackingResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

pub const METHOD_START: &str = "startGPSTracking";
pub const METHOD_STOP: &str = "stopGPSTracking";
pub const METHOD_UPDATE_SETTINGS: &str = "updateGPSSettings";
pub const METHOD_IS_TRACKING: &str = "isGPSTracking";
pub const METHOD_STATUS: &str = "getTrackingStatus";

/// Incoming method call
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: None,
        }
    }

    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = Some(arguments);
        self
    }
}

/// Reply to a method call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResult {
    Success { result: Value },
    Error { code: String, message: String },
    NotImplemented { method: String },
}

impl MethodResult {
    fn success(result: impl Into<Value>) -> Self {
        MethodResult::Success {
            result: result.into(),
        }
    }

    fn from_error(error: &TrackingError) -> Self {
        MethodResult::Error {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResult::Success { .. })
    }
}

/// Dispatch one method call against the service
pub fn handle_call(service: &ServiceHandle, call: &MethodCall) -> MethodResult {
    let outcome = match call.method.as_str() {
        METHOD_START => service.start_tracking().map(|_| Value::Bool(true)),
        METHOD_STOP => service.stop_tracking().map(|_| Value::Bool(true)),
        METHOD_UPDATE_SETTINGS => decode_settings(call.arguments.as_ref())
            .and_then(|update| service.update_settings(update))
            .map(|_| Value::Bool(true)),
        METHOD_IS_TRACKING => Ok(Value::Bool(service.is_running())),
        METHOD_STATUS => service.status().and_then(|status| {
            serde_json::to_value(status).map_err(|e| TrackingError::InvalidRequest {
                reason: format!("status not serializable: {}", e),
            })
        }),
        other => {
            tracing::debug!(method = other, "unknown method call");
            return MethodResult::NotImplemented {
                method: other.to_string(),
            };
        }
    };

    match outcome {
        Ok(value) => MethodResult::success(value),
        Err(e) => {
            tracing::warn!(method = %call.method, error = %e, "method call failed");
            MethodResult::from_error(&e)
        }
    }
}

/// Decode `updateGPSSettings` arguments into a partial update
pub fn decode_settings(arguments: Option<&Value>) -> TrackingResult<SettingsUpdate> {
    let empty = Map::new();
    let fields = match arguments {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            return Err(invalid(format!("settings must be a map, got {}", other)));
        }
    };

    let mut update = SettingsUpdate::new();
    if let Some(value) = present(fields, "intervalMs") {
        update.interval = Some(millis("intervalMs", value)?);
    }
    if let Some(value) = present(fields, "fastestIntervalMs") {
        update.fastest_interval = Some(millis("fastestIntervalMs", value)?);
    }
    if let Some(value) = present(fields, "maxWaitTimeMs") {
        update.max_wait_time = Some(millis("maxWaitTimeMs", value)?);
    }
    if let Some(value) = present(fields, "smallestDisplacementM") {
        let meters = value
            .as_f64()
            .ok_or_else(|| invalid(format!("smallestDisplacementM must be a number, got {}", value)))?;
        update.smallest_displacement = Some(meters as f32);
    }
    if let Some(value) = present(fields, "priority") {
        let priority = value
            .as_i64()
            .and_then(|code| i32::try_from(code).ok())
            .and_then(Priority::from_code)
            .ok_or_else(|| invalid(format!("unknown priority {}", value)))?;
        update.priority = Some(priority);
    }
    Ok(update)
}

fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| !value.is_null())
}

fn millis(key: &str, value: &Value) -> TrackingResult<Duration> {
    if let Some(ms) = value.as_u64() {
        return Ok(Duration::from_millis(ms));
    }
    match value.as_f64() {
        // whole numbers written as floats (1500.0) are fine, fractions are not
        Some(ms) if ms.is_finite() && ms >= 0.0 && ms.fract() == 0.0 && ms <= u64::MAX as f64 => {
            Ok(Duration::from_millis(ms as u64))
        }
        _ => Err(invalid(format!(
            "{} must be a non-negative whole number of milliseconds, got {}",
            key, value
        ))),
    }
}

fn invalid(reason: String) -> TrackingError {
    TrackingError::InvalidRequest { reason }
}
