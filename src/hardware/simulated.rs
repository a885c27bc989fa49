//! Simulated positioning provider for development without GPS hardware
//!
//! Each subscription runs a worker thread that emits a random walk around a
//! starting point at the requested interval.

use crate::core::{epoch_millis, FixRecord, Priority};
use crate::hardware::{FixCallback, LocationProvider, ProviderError, ProviderResult};
use crate::policy::RequestDescriptor;
use rand::Rng;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Lower bound on emission period so a zero interval cannot spin
const MIN_EMIT_INTERVAL: Duration = Duration::from_millis(50);

/// Largest per-fix step of the random walk (degrees, ~11 m)
const MAX_STEP_DEGREES: f64 = 0.0001;

/// Provider that fabricates fixes on a background thread
pub struct SimulatedProvider {
    origin: (f64, f64),
    altitude: f64,
    permitted: bool,
    /// Dropping the sender stops the worker
    worker: Option<mpsc::Sender<()>>,
}

impl SimulatedProvider {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            origin: (latitude, longitude),
            altitude: 0.0,
            permitted: true,
            worker: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    /// Toggle the simulated location permission
    pub fn set_permitted(&mut self, permitted: bool) {
        self.permitted = permitted;
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    fn accuracy_range(priority: i32) -> (f32, f32) {
        match Priority::from_code(priority) {
            Some(Priority::HighAccuracy) | None => (3.0, 8.0),
            Some(Priority::BalancedPowerAccuracy) => (20.0, 40.0),
            Some(Priority::LowPower) | Some(Priority::Passive) => (100.0, 500.0),
        }
    }
}

impl LocationProvider for SimulatedProvider {
    fn request_updates(
        &mut self,
        request: &RequestDescriptor,
        callback: FixCallback,
    ) -> ProviderResult<()> {
        if !self.permitted {
            return Err(ProviderError::PermissionDenied {
                permission: "ACCESS_FINE_LOCATION".to_string(),
            });
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = Duration::from_millis(request.interval_ms).max(MIN_EMIT_INTERVAL);
        let (min_accuracy, max_accuracy) = Self::accuracy_range(request.priority);
        let (mut latitude, mut longitude) = self.origin;
        let altitude = self.altitude;

        thread::Builder::new()
            .name(format!("sim-provider-{}", callback.subscription().id()))
            .spawn(move || {
                let mut rng = rand::thread_rng();
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    let step_lat = rng.gen_range(-1.0..=1.0) * MAX_STEP_DEGREES;
                    let step_lon = rng.gen_range(-1.0..=1.0) * MAX_STEP_DEGREES;
                    latitude += step_lat;
                    longitude += step_lon;

                    // ~111 km per degree is close enough for a synthetic speed
                    let meters = (step_lat.hypot(step_lon) * 111_000.0) as f32;
                    let speed = meters / interval.as_secs_f32();

                    let fix = FixRecord::new(latitude, longitude, epoch_millis())
                        .with_accuracy(rng.gen_range(min_accuracy..=max_accuracy))
                        .with_speed(speed)
                        .with_altitude(altitude + rng.gen_range(-2.0..=2.0));
                    callback.deliver(fix);
                }
            })
            .map_err(|e| ProviderError::Unavailable {
                details: format!("failed to spawn simulation worker: {}", e),
            })?;

        // replacing the sender stops any previous worker
        self.worker = Some(stop_tx);
        Ok(())
    }

    fn remove_updates(&mut self) -> ProviderResult<()> {
        match self.worker.take() {
            Some(stop) => {
                let _ = stop.send(());
                Ok(())
            }
            None => Err(ProviderError::NoActiveSubscription),
        }
    }

    fn name(&self) -> &str {
        "simulated-provider"
    }
}

impl Drop for SimulatedProvider {
    fn drop(&mut self) {
        let _ = self.remove_updates();
    }
}
