//! Tunable acquisition parameters and partial updates

use crate::core::{
    Priority, DEFAULT_FASTEST_INTERVAL, DEFAULT_INTERVAL, DEFAULT_MAX_WAIT_TIME,
    DEFAULT_SMALLEST_DISPLACEMENT_M,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable parameters of a tracking session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Desired fix period
    #[serde(rename = "interval_ms", with = "duration_ms")]
    pub interval: Duration,
    /// Fastest period the consumer can accept (not enforced to be <= interval)
    #[serde(rename = "fastest_interval_ms", with = "duration_ms")]
    pub fastest_interval: Duration,
    /// Maximum batching delay before a fix must be delivered
    #[serde(rename = "max_wait_time_ms", with = "duration_ms")]
    pub max_wait_time: Duration,
    /// Minimum movement before a new fix is significant (meters)
    #[serde(rename = "smallest_displacement_m")]
    pub smallest_displacement: f32,
    /// Accuracy/power trade-off
    pub priority: Priority,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            fastest_interval: DEFAULT_FASTEST_INTERVAL,
            max_wait_time: DEFAULT_MAX_WAIT_TIME,
            smallest_displacement: DEFAULT_SMALLEST_DISPLACEMENT_M,
            priority: Priority::HighAccuracy,
        }
    }
}

impl AcquisitionConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fastest_interval(mut self, fastest_interval: Duration) -> Self {
        self.fastest_interval = fastest_interval;
        self
    }

    pub fn with_max_wait_time(mut self, max_wait_time: Duration) -> Self {
        self.max_wait_time = max_wait_time;
        self
    }

    pub fn with_smallest_displacement(mut self, meters: f32) -> Self {
        self.smallest_displacement = meters;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Returns a copy with every field present in `update` replaced
    pub fn merged(&self, update: &SettingsUpdate) -> Self {
        Self {
            interval: update.interval.unwrap_or(self.interval),
            fastest_interval: update.fastest_interval.unwrap_or(self.fastest_interval),
            max_wait_time: update.max_wait_time.unwrap_or(self.max_wait_time),
            smallest_displacement: update
                .smallest_displacement
                .unwrap_or(self.smallest_displacement),
            priority: update.priority.unwrap_or(self.priority),
        }
    }
}

/// Partial settings change; unset fields keep their previous value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsUpdate {
    pub interval: Option<Duration>,
    pub fastest_interval: Option<Duration>,
    pub max_wait_time: Option<Duration>,
    pub smallest_displacement: Option<f32>,
    pub priority: Option<Priority>,
}

impl SettingsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_fastest_interval(mut self, fastest_interval: Duration) -> Self {
        self.fastest_interval = Some(fastest_interval);
        self
    }

    pub fn with_max_wait_time(mut self, max_wait_time: Duration) -> Self {
        self.max_wait_time = Some(max_wait_time);
        self
    }

    pub fn with_smallest_displacement(mut self, meters: f32) -> Self {
        self.smallest_displacement = Some(meters);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Number of fields this update touches
    pub fn count_updates(&self) -> usize {
        [
            self.interval.is_some(),
            self.fastest_interval.is_some(),
            self.max_wait_time.is_some(),
            self.smallest_displacement.is_some(),
            self.priority.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count_updates() == 0
    }
}

/// Serializes a `Duration` as whole milliseconds
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
