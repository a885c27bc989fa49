//! Service configuration
//!
//! Loaded from JSON at startup; only the acquisition section can change at
//! runtime, and that goes through the session controller, not this module.

use crate::core::{
    DEFAULT_WAKE_LOCK_TIMEOUT, NOTIFICATION_CHANNEL_ID, NOTIFICATION_ID, NOTIFICATION_TEXT,
};
use crate::hardware::StatusIndicator;
use crate::policy::AcquisitionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration of the tracking service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Acquisition parameters used until the first settings update
    pub acquisition: AcquisitionConfig,
    /// Maximum time a session may hold the wake resource (milliseconds)
    pub wake_lock_timeout_ms: u64,
    /// Persistent status indicator content
    pub notification: NotificationConfig,
    /// Fallback log level when `RUST_LOG` is unset
    pub log_level: LogLevel,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            acquisition: AcquisitionConfig::default(),
            wake_lock_timeout_ms: DEFAULT_WAKE_LOCK_TIMEOUT.as_millis() as u64,
            notification: NotificationConfig::default(),
            log_level: LogLevel::Info,
        }
    }
}

impl ServiceConfig {
    pub fn wake_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.wake_lock_timeout_ms)
    }
}

/// Status indicator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub channel_id: String,
    pub channel_name: String,
    pub notification_id: u32,
    pub title: String,
    pub text: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel_id: NOTIFICATION_CHANNEL_ID.to_string(),
            channel_name: "GPS Tracking".to_string(),
            notification_id: NOTIFICATION_ID,
            title: String::new(),
            text: NOTIFICATION_TEXT.to_string(),
        }
    }
}

impl NotificationConfig {
    /// Indicator shown when a session enters foreground mode
    pub fn indicator(&self) -> StatusIndicator {
        StatusIndicator::new(self.channel_id.clone(), self.notification_id)
            .with_title(self.title.clone())
            .with_text(self.text.clone())
    }
}

/// Logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and info messages
    Info,
    /// All messages including debug
    Debug,
    /// Everything, including per-fix traces
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::None => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter { parameter: String, value: String, reason: String },
    /// File I/O error
    IoError { message: String },
    /// JSON parsing or serialization error
    SerializationError { message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidParameter { parameter, value, reason } => {
                write!(f, "Invalid parameter '{}' = '{}': {}", parameter, value, reason)
            }
            ConfigError::IoError { message } => {
                write!(f, "I/O error: {}", message)
            }
            ConfigError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration validation result
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Whether configuration is valid
    pub is_valid: bool,
    /// Validation errors
    pub errors: Vec<ConfigError>,
    /// Validation warnings
    pub warnings: Vec<String>,
}

/// Owns the service configuration and its backing file
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: ServiceConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a new configuration manager with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn update_config(&mut self, config: ServiceConfig) -> Result<(), ConfigError> {
        let validation = Self::validate(&config);
        if let Some(error) = validation.errors.into_iter().next() {
            return Err(error);
        }
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: ServiceConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;

        let validation = Self::validate(&config);
        for warning in &validation.warnings {
            tracing::warn!(file = %path_str, "{}", warning);
        }
        if let Some(error) = validation.errors.into_iter().next() {
            return Err(error);
        }

        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            }
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = self.config_file_path.clone() {
            self.save_to_file(path)
        } else {
            Err(ConfigError::IoError {
                message: "No file path set for saving configuration".to_string(),
            })
        }
    }

    /// Check if configuration has been modified since last save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Validate a service configuration
    pub fn validate(config: &ServiceConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        if config.wake_lock_timeout_ms == 0 {
            result.errors.push(ConfigError::InvalidParameter {
                parameter: "wake_lock_timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "wake lock needs a non-zero safety timeout".to_string(),
            });
        }

        let displacement = config.acquisition.smallest_displacement;
        if !displacement.is_finite() || displacement < 0.0 {
            result.errors.push(ConfigError::InvalidParameter {
                parameter: "acquisition.smallest_displacement_m".to_string(),
                value: displacement.to_string(),
                reason: "must be a non-negative distance".to_string(),
            });
        }

        if config.notification.channel_id.trim().is_empty() {
            result.errors.push(ConfigError::InvalidParameter {
                parameter: "notification.channel_id".to_string(),
                value: config.notification.channel_id.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        if config.acquisition.fastest_interval > config.acquisition.interval {
            result.warnings.push(format!(
                "fastest interval {}ms exceeds interval {}ms",
                config.acquisition.fastest_interval.as_millis(),
                config.acquisition.interval.as_millis()
            ));
        }

        result.is_valid = result.errors.is_empty();
        result
    }
}
