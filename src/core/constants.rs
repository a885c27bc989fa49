//! Acquisition defaults and resource limits

use std::time::Duration;

/// Default desired fix period
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(4000);

/// Default fastest period the consumer accepts
pub const DEFAULT_FASTEST_INTERVAL: Duration = Duration::from_millis(2000);

/// Default maximum batching delay
pub const DEFAULT_MAX_WAIT_TIME: Duration = Duration::from_millis(6000);

/// Default minimum displacement between significant fixes (meters)
pub const DEFAULT_SMALLEST_DISPLACEMENT_M: f32 = 1.0;

/// Safety net on how long a session may keep the device awake
pub const DEFAULT_WAKE_LOCK_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Tag attached to the wake resource
pub const WAKE_LOCK_TAG: &str = "GPSTrackingService::WakeLock";

/// Status indicator channel
pub const NOTIFICATION_CHANNEL_ID: &str = "gps_tracking_channel";

/// Status indicator identifier
pub const NOTIFICATION_ID: u32 = 1001;

/// Status indicator body text
pub const NOTIFICATION_TEXT: &str = "Tap to view tracking details";
