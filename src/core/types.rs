//! Core data types for the tracking session

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// One positioning update as produced by the provider.
///
/// `timestamp_ms` is the epoch time at which the fix was taken, not the time
/// it reached the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixRecord {
    /// Latitude in WGS84 degrees
    pub latitude: f64,
    /// Longitude in WGS84 degrees
    pub longitude: f64,
    /// Horizontal accuracy (meters)
    pub accuracy: f32,
    /// Ground speed (m/s)
    pub speed: f32,
    /// Altitude (meters)
    pub altitude: f64,
    /// Fix time (milliseconds since epoch)
    pub timestamp_ms: i64,
}

impl FixRecord {
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: 0.0,
            speed: 0.0,
            altitude: 0.0,
            timestamp_ms,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f32) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }
}

/// Acquisition priority requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Most accurate fixes, highest power draw
    #[default]
    HighAccuracy,
    /// Block-level accuracy
    BalancedPowerAccuracy,
    /// City-level accuracy
    LowPower,
    /// Only fixes requested by other consumers
    Passive,
}

impl Priority {
    /// Provider wire code for this priority
    pub fn code(self) -> i32 {
        match self {
            Priority::HighAccuracy => 100,
            Priority::BalancedPowerAccuracy => 102,
            Priority::LowPower => 104,
            Priority::Passive => 105,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            100 => Some(Priority::HighAccuracy),
            102 => Some(Priority::BalancedPowerAccuracy),
            104 => Some(Priority::LowPower),
            105 => Some(Priority::Passive),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::HighAccuracy => "high-accuracy",
            Priority::BalancedPowerAccuracy => "balanced-power",
            Priority::LowPower => "low-power",
            Priority::Passive => "passive",
        };
        f.write_str(name)
    }
}

/// Identifies one provider subscription within a controller's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(id: u64) -> Self {
        SubscriptionId(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        SubscriptionId(self.0 + 1)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Current wall-clock time in milliseconds since epoch
pub fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
