//! Provider-facing request construction

use crate::policy::AcquisitionConfig;
use serde::{Deserialize, Serialize};

/// Acquisition request in the shape the provider consumes.
///
/// Carries the five configuration fields verbatim; durations become
/// milliseconds and priority becomes its wire code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub interval_ms: u64,
    pub fastest_interval_ms: u64,
    pub max_wait_time_ms: u64,
    pub smallest_displacement_m: f32,
    pub priority: i32,
}

/// Builds the provider request for `config`.
///
/// Total over every config value: out-of-range values pass through untouched
/// and are left for the provider to reject.
pub fn build_request(config: &AcquisitionConfig) -> RequestDescriptor {
    RequestDescriptor {
        interval_ms: config.interval.as_millis() as u64,
        fastest_interval_ms: config.fastest_interval.as_millis() as u64,
        max_wait_time_ms: config.max_wait_time.as_millis() as u64,
        smallest_displacement_m: config.smallest_displacement,
        priority: config.priority.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Priority;
    use std::time::Duration;

    #[test]
    fn test_default_request() {
        let request = build_request(&AcquisitionConfig::default());
        assert_eq!(request.interval_ms, 4000);
        assert_eq!(request.fastest_interval_ms, 2000);
        assert_eq!(request.max_wait_time_ms, 6000);
        assert_eq!(request.smallest_displacement_m, 1.0);
        assert_eq!(request.priority, 100);
    }

    #[test]
    fn test_fields_copied_verbatim() {
        let config = AcquisitionConfig::default()
            .with_interval(Duration::from_millis(1000))
            .with_fastest_interval(Duration::from_millis(500))
            .with_max_wait_time(Duration::from_millis(0))
            .with_smallest_displacement(12.5)
            .with_priority(Priority::Passive);

        let request = build_request(&config);
        assert_eq!(request.interval_ms, 1000);
        assert_eq!(request.fastest_interval_ms, 500);
        assert_eq!(request.max_wait_time_ms, 0);
        assert_eq!(request.smallest_displacement_m, 12.5);
        assert_eq!(request.priority, 105);
    }

    #[test]
    fn test_unconventional_values_pass_through() {
        // fastest > interval and a negative displacement are the provider's problem
        let config = AcquisitionConfig::default()
            .with_interval(Duration::from_millis(100))
            .with_fastest_interval(Duration::from_millis(9000))
            .with_smallest_displacement(-3.0);

        let request = build_request(&config);
        assert_eq!(request.interval_ms, 100);
        assert_eq!(request.fastest_interval_ms, 9000);
        assert_eq!(request.smallest_displacement_m, -3.0);
    }

    #[test]
    fn test_deterministic() {
        let config = AcquisitionConfig::default().with_priority(Priority::BalancedPowerAccuracy);
        assert_eq!(build_request(&config), build_request(&config));
    }
}
