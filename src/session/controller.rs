//! Tracking session controller
//!
//! Runs on a single owner thread. Provider deliveries reach it as
//! [`FixDelivery`] messages routed through the same ordered channel as
//! commands, so `&mut self` is the only synchronization the state needs.
//!
//! Resource ordering:
//! - `start`: running flag, wake lock, foreground mode, then subscription
//! - `stop`: running flag, subscription, wake lock, then foreground mode
//! - `reconfigure`: the old subscription is cancelled before the new one is
//!   submitted, so two are never live at once

use crate::api::context::TrackingContext;
use crate::core::{epoch_millis, FixRecord, SubscriptionId, DEFAULT_WAKE_LOCK_TIMEOUT};
use crate::hardware::{
    FixCallback, FixDelivery, FixRoute, ForegroundHost, LocationProvider, ProviderResult,
    StatusIndicator, WakeResource,
};
use crate::policy::{build_request, AcquisitionConfig, SettingsUpdate};
use crate::session::{ActiveSession, SessionState, SessionStatus, TrackingResult};
use crate::utils::ServiceConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Idle/Active state machine for one tracking session
pub struct TrackingController {
    provider: Box<dyn LocationProvider>,
    wake: Box<dyn WakeResource>,
    foreground: Box<dyn ForegroundHost>,
    context: Arc<TrackingContext>,
    /// Where provider callbacks send their deliveries
    route: FixRoute,
    config: AcquisitionConfig,
    wake_timeout: Duration,
    /// Indicator template; session fields are filled in per update
    indicator: StatusIndicator,
    state: SessionState,
    last_subscription: SubscriptionId,
    fixes_discarded: u64,
}

impl TrackingController {
    /// Create an idle controller with default acquisition settings
    pub fn new(
        provider: impl LocationProvider + 'static,
        wake: impl WakeResource + 'static,
        foreground: impl ForegroundHost + 'static,
        context: Arc<TrackingContext>,
        route: FixRoute,
    ) -> Self {
        Self {
            provider: Box::new(provider),
            wake: Box::new(wake),
            foreground: Box::new(foreground),
            context,
            route,
            config: AcquisitionConfig::default(),
            wake_timeout: DEFAULT_WAKE_LOCK_TIMEOUT,
            indicator: StatusIndicator::default(),
            state: SessionState::Idle,
            last_subscription: SubscriptionId::new(0),
            fixes_discarded: 0,
        }
    }

    pub fn with_config(mut self, config: AcquisitionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_wake_timeout(mut self, timeout: Duration) -> Self {
        self.wake_timeout = timeout;
        self
    }

    pub fn with_indicator(mut self, indicator: StatusIndicator) -> Self {
        self.indicator = indicator;
        self
    }

    /// Apply acquisition defaults, wake timeout and indicator from a service config
    pub fn with_service_config(self, config: &ServiceConfig) -> Self {
        self.with_config(config.acquisition)
            .with_wake_timeout(config.wake_lock_timeout())
            .with_indicator(config.notification.indicator())
    }

    /// Begin tracking with the stored configuration.
    ///
    /// A no-op when already active. On failure every resource acquired so far
    /// is released and the controller stays idle.
    pub fn start(&mut self) -> TrackingResult<()> {
        if self.state.is_active() {
            debug!("start ignored, session already active");
            return Ok(());
        }

        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            priority = %self.config.priority,
            "starting tracking session"
        );
        self.context.set_running(true);

        if !self.wake.is_held() {
            if let Err(e) = self.wake.acquire(self.wake_timeout) {
                error!(error = %e, "could not acquire wake lock");
                self.context.set_running(false);
                return Err(e.into());
            }
        }

        let started_at_ms = epoch_millis();
        let indicator = self.indicator.clone().with_session(started_at_ms, None, 0);
        if let Err(e) = self.foreground.enter_foreground(&indicator) {
            error!(error = %e, "could not enter foreground mode");
            self.wake.release();
            self.context.set_running(false);
            return Err(e.into());
        }

        let subscription = self.next_subscription();
        if let Err(e) = self.subscribe(subscription) {
            error!(error = %e, provider = self.provider.name(), "location request rejected");
            self.foreground.exit_foreground();
            self.wake.release();
            self.context.set_running(false);
            return Err(e.into());
        }

        self.state = SessionState::Active(ActiveSession::new(started_at_ms, subscription));
        info!(%subscription, "tracking session active");
        Ok(())
    }

    /// End tracking. A no-op when already idle; never fails.
    pub fn stop(&mut self) {
        if !self.state.is_active() {
            debug!("stop ignored, session already idle");
            return;
        }

        info!("stopping tracking session");
        self.teardown(true);
    }

    /// Replace the stored configuration.
    ///
    /// While active the provider subscription is cancelled and re-issued
    /// from `config`. If the new request is rejected the session is torn
    /// down and the error returned.
    pub fn reconfigure(&mut self, config: AcquisitionConfig) -> TrackingResult<()> {
        self.config = config;
        info!(
            interval_ms = config.interval.as_millis() as u64,
            fastest_ms = config.fastest_interval.as_millis() as u64,
            max_wait_ms = config.max_wait_time.as_millis() as u64,
            smallest_displacement_m = config.smallest_displacement,
            priority = %config.priority,
            "acquisition settings updated"
        );

        if !self.state.is_active() {
            return Ok(());
        }

        self.cancel_subscription();
        let subscription = self.next_subscription();
        if let Err(e) = self.subscribe(subscription) {
            error!(error = %e, "re-request after settings update failed, ending session");
            self.teardown(false);
            return Err(e.into());
        }

        if let SessionState::Active(session) = &mut self.state {
            session.subscription = subscription;
        }
        debug!(%subscription, "location updates re-requested");
        Ok(())
    }

    /// Merge a partial update into the stored configuration and reconfigure
    pub fn apply_settings(&mut self, update: &SettingsUpdate) -> TrackingResult<()> {
        let config = self.config.merged(update);
        self.reconfigure(config)
    }

    /// Record a fix, refresh the indicator and forward it to the sink.
    ///
    /// Fixes arriving while idle are discarded; this path never fails.
    pub fn on_fix_delivered(&mut self, fix: FixRecord) {
        let SessionState::Active(session) = &mut self.state else {
            self.fixes_discarded += 1;
            debug!(timestamp_ms = fix.timestamp_ms, "fix arrived while idle, discarded");
            return;
        };

        session.record(fix);
        trace!(
            latitude = fix.latitude,
            longitude = fix.longitude,
            accuracy = fix.accuracy,
            "location update"
        );

        let indicator = self.indicator.clone().with_session(
            session.started_at_ms,
            session.last_fix,
            session.fixes_received,
        );
        self.foreground.update_indicator(&indicator);

        if !self.context.dispatch(&fix) {
            debug!(timestamp_ms = fix.timestamp_ms, "no sink attached, fix dropped");
        }
    }

    /// Entry point for provider deliveries; drops those from a cancelled subscription
    pub fn on_delivery(&mut self, delivery: FixDelivery) {
        if let Some(live) = self.state.subscription() {
            if live != delivery.subscription {
                self.fixes_discarded += 1;
                debug!(
                    stale = %delivery.subscription,
                    live = %live,
                    "fix from cancelled subscription discarded"
                );
                return;
            }
        }
        self.on_fix_delivered(delivery.fix);
    }

    /// Whether a session is active
    pub fn is_running(&self) -> bool {
        self.state.is_active()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    pub fn last_fix(&self) -> Option<FixRecord> {
        self.state.last_fix()
    }

    pub fn context(&self) -> &Arc<TrackingContext> {
        &self.context
    }

    pub fn status(&self) -> SessionStatus {
        let session = self.state.session();
        SessionStatus {
            running: self.state.is_active(),
            started_at_ms: session.map(|s| s.started_at_ms),
            uptime_ms: session.map(ActiveSession::uptime_ms),
            subscription: session.map(|s| s.subscription.id()),
            last_fix: session.and_then(|s| s.last_fix),
            fixes_received: session.map_or(0, |s| s.fixes_received),
            fixes_discarded: self.fixes_discarded,
            config: self.config,
        }
    }

    /// Force the controller idle and clear the running flag
    pub fn shutdown(&mut self) {
        self.stop();
        self.context.set_running(false);
    }

    fn next_subscription(&mut self) -> SubscriptionId {
        self.last_subscription = self.last_subscription.next();
        self.last_subscription
    }

    fn subscribe(&mut self, subscription: SubscriptionId) -> ProviderResult<()> {
        let request = build_request(&self.config);
        let callback = FixCallback::new(subscription, Arc::clone(&self.route));
        self.provider.request_updates(&request, callback)
    }

    fn cancel_subscription(&mut self) {
        match self.provider.remove_updates() {
            Ok(()) => debug!(provider = self.provider.name(), "location updates removed"),
            Err(e) if e.is_absent_subscription() => {
                warn!(provider = self.provider.name(), "subscription already gone during teardown")
            }
            Err(e) => warn!(error = %e, "failed to remove location updates"),
        }
    }

    fn teardown(&mut self, cancel: bool) {
        self.context.set_running(false);
        if cancel {
            self.cancel_subscription();
        }
        if !self.wake.release() {
            debug!("wake lock already released");
        }
        self.foreground.exit_foreground();

        if let SessionState::Active(session) = std::mem::take(&mut self.state) {
            info!(
                fixes = session.fixes_received,
                uptime_ms = session.uptime_ms(),
                "tracking session ended"
            );
        }
    }
}

impl Drop for TrackingController {
    fn drop(&mut self) {
        if self.state.is_active() {
            warn!("controller dropped while tracking, forcing stop");
        }
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sink::RecordingSink;
    use crate::core::Priority;
    use crate::hardware::{
        CallJournal, MockForeground, MockProvider, MockWakeLock, ResourceError, ResourceKind,
    };
    use crate::session::TrackingError;
    use std::sync::mpsc;

    struct Harness {
        controller: TrackingController,
        provider: MockProvider,
        wake: MockWakeLock,
        foreground: MockForeground,
        context: Arc<TrackingContext>,
        sink: RecordingSink,
        deliveries: mpsc::Receiver<FixDelivery>,
    }

    impl Harness {
        fn new() -> Self {
            let provider = MockProvider::new();
            let wake = MockWakeLock::new();
            let foreground = MockForeground::new();
            let context = Arc::new(TrackingContext::new());
            let sink = RecordingSink::new();
            context.attach_sink(Box::new(sink.clone()));

            let (tx, deliveries) = mpsc::channel();
            let route: FixRoute = Arc::new(move |delivery| {
                let _ = tx.send(delivery);
            });
            let controller = TrackingController::new(
                provider.clone(),
                wake.clone(),
                foreground.clone(),
                Arc::clone(&context),
                route,
            );

            Self {
                controller,
                provider,
                wake,
                foreground,
                context,
                sink,
                deliveries,
            }
        }

        /// Drain routed deliveries into the controller, as the owner loop would
        fn pump(&mut self) {
            while let Ok(delivery) = self.deliveries.try_recv() {
                self.controller.on_delivery(delivery);
            }
        }

        fn assert_invariants(&self) {
            let active = self.controller.is_running();
            assert_eq!(self.wake.is_held(), active);
            assert_eq!(self.provider.is_subscribed(), active);
            assert_eq!(self.foreground.is_foreground(), active);
            assert_eq!(self.context.is_running(), active);
            assert_eq!(self.provider.overlapping_request_count(), 0);
        }
    }

    fn sample_fix() -> FixRecord {
        FixRecord::new(50.1, 14.4, 1_700_000_000_000)
            .with_accuracy(5.0)
            .with_speed(0.0)
            .with_altitude(200.0)
    }

    #[test]
    fn test_start_acquires_everything() {
        let mut h = Harness::new();
        h.assert_invariants();

        h.controller.start().unwrap();
        assert!(h.controller.is_running());
        assert_eq!(h.provider.request_count(), 1);
        assert_eq!(h.wake.last_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(h.foreground.entry_count(), 1);
        assert!(h.controller.status().started_at_ms.is_some());
        h.assert_invariants();
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut h = Harness::new();
        h.controller.start().unwrap();
        h.controller.start().unwrap();

        assert_eq!(h.wake.acquisition_count(), 1);
        assert_eq!(h.provider.request_count(), 1);
        assert_eq!(h.foreground.entry_count(), 1);
        h.assert_invariants();
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut h = Harness::new();
        h.controller.stop();
        assert_eq!(h.provider.removal_count(), 0);

        h.controller.start().unwrap();
        h.controller.stop();
        h.controller.stop();

        assert!(!h.controller.is_running());
        assert_eq!(h.provider.removal_count(), 1);
        assert_eq!(h.wake.release_count(), 1);
        assert_eq!(h.foreground.exit_count(), 1);
        h.assert_invariants();
    }

    #[test]
    fn test_start_uses_default_config() {
        let mut h = Harness::new();
        h.controller.start().unwrap();
        assert_eq!(
            h.provider.last_request(),
            Some(build_request(&AcquisitionConfig::default()))
        );
    }

    #[test]
    fn test_reconfigure_while_idle() {
        let mut h = Harness::new();
        let config = AcquisitionConfig::default()
            .with_interval(Duration::from_millis(1000))
            .with_priority(Priority::BalancedPowerAccuracy);

        h.controller.reconfigure(config).unwrap();
        assert_eq!(h.controller.config(), &config);
        assert_eq!(h.provider.request_count(), 0);
        assert_eq!(h.provider.removal_count(), 0);

        h.controller.start().unwrap();
        let request = h.provider.last_request().unwrap();
        assert_eq!(request.interval_ms, 1000);
        assert_eq!(request.priority, 102);
    }

    #[test]
    fn test_reconfigure_while_active() {
        let mut h = Harness::new();
        h.controller.start().unwrap();

        let config = AcquisitionConfig::default().with_interval(Duration::from_millis(1000));
        h.controller.reconfigure(config).unwrap();

        assert_eq!(h.provider.removal_count(), 1);
        assert_eq!(h.provider.request_count(), 2);
        assert_eq!(h.provider.last_request().unwrap().interval_ms, 1000);
        assert_eq!(h.wake.acquisition_count(), 1);
        assert!(h.controller.is_running());
        h.assert_invariants();
    }

    #[test]
    fn test_reconfigure_tolerates_missing_subscription() {
        let mut h = Harness::new();
        h.controller.start().unwrap();
        h.provider.drop_subscription();

        h.controller
            .apply_settings(&SettingsUpdate::new().with_smallest_displacement(10.0))
            .unwrap();

        assert_eq!(h.provider.absent_removal_count(), 1);
        assert_eq!(h.provider.last_request().unwrap().smallest_displacement_m, 10.0);
        h.assert_invariants();
    }

    #[test]
    fn test_failed_resubscribe_ends_session() {
        let mut h = Harness::new();
        h.controller.start().unwrap();
        h.provider.deny_permission(true);

        let result = h.controller.reconfigure(AcquisitionConfig::default());
        assert!(matches!(result, Err(TrackingError::Authorization { .. })));
        assert!(!h.controller.is_running());
        assert_eq!(h.provider.absent_removal_count(), 0);
        h.assert_invariants();
    }

    #[test]
    fn test_rollback_on_authorization_failure() {
        let mut h = Harness::new();
        h.provider.deny_permission(true);

        let result = h.controller.start();
        assert!(matches!(result, Err(TrackingError::Authorization { .. })));
        assert!(!h.controller.is_running());
        assert_eq!(h.wake.acquisition_count(), 1);
        assert_eq!(h.wake.release_count(), 1);
        assert_eq!(h.foreground.exit_count(), 1);
        h.assert_invariants();

        // recoverable: granting permission lets the next start succeed
        h.provider.deny_permission(false);
        h.controller.start().unwrap();
        h.assert_invariants();
    }

    #[test]
    fn test_rollback_on_wake_failure() {
        let mut h = Harness::new();
        h.wake.fail_acquire(true);

        let result = h.controller.start();
        assert!(matches!(
            result,
            Err(TrackingError::ResourceAcquisition { resource: ResourceKind::WakeLock, .. })
        ));
        assert_eq!(h.foreground.entry_count(), 0);
        assert_eq!(h.provider.request_count(), 0);
        h.assert_invariants();
    }

    #[test]
    fn test_rollback_on_foreground_failure() {
        let mut h = Harness::new();
        h.foreground.deny(true);

        let result = h.controller.start();
        assert!(matches!(
            result,
            Err(TrackingError::ResourceAcquisition { resource: ResourceKind::Foreground, .. })
        ));
        assert_eq!(h.wake.release_count(), 1);
        assert_eq!(h.provider.request_count(), 0);
        h.assert_invariants();
    }

    #[test]
    fn test_provider_unavailable_rolls_back() {
        let mut h = Harness::new();
        h.provider.set_unavailable(true);

        let result = h.controller.start();
        assert!(matches!(result, Err(TrackingError::Provider { .. })));
        h.assert_invariants();
    }

    #[test]
    fn test_fix_propagation() {
        let mut h = Harness::new();
        h.controller.start().unwrap();

        let fix = sample_fix();
        assert!(h.provider.emit(fix));
        h.pump();

        assert_eq!(h.controller.last_fix(), Some(fix));
        let events = h.sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].latitude, 50.1);
        assert_eq!(events[0].longitude, 14.4);
        assert_eq!(events[0].accuracy, 5.0);
        assert_eq!(events[0].speed, 0.0);
        assert_eq!(events[0].altitude, 200.0);
        assert_eq!(events[0].timestamp, 1_700_000_000_000);

        let updates = h.foreground.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].last_fix, Some(fix));
        assert_eq!(updates[0].fixes_received, 1);
    }

    #[test]
    fn test_sink_detached_drops_without_replay() {
        let mut h = Harness::new();
        h.controller.start().unwrap();
        let detached = h.context.detach_sink();
        assert!(detached.is_some());

        let dropped = sample_fix();
        h.controller.on_fix_delivered(dropped);
        assert_eq!(h.controller.last_fix(), Some(dropped));
        assert!(h.sink.events().is_empty());

        h.context.attach_sink(Box::new(h.sink.clone()));
        assert!(h.sink.events().is_empty());

        let next = FixRecord::new(50.2, 14.5, 1_700_000_001_000);
        h.controller.on_fix_delivered(next);
        let events = h.sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, 1_700_000_001_000);
    }

    #[test]
    fn test_fix_while_idle_discarded() {
        let mut h = Harness::new();
        h.controller.on_fix_delivered(sample_fix());

        assert!(h.controller.last_fix().is_none());
        assert!(h.sink.events().is_empty());
        assert!(h.foreground.updates().is_empty());
        assert_eq!(h.controller.status().fixes_discarded, 1);
    }

    #[test]
    fn test_in_flight_fix_after_stop_discarded() {
        let mut h = Harness::new();
        h.controller.start().unwrap();
        let callback = h.provider.live_callback().unwrap();

        h.controller.stop();
        // provider thread raced the cancellation
        callback.deliver(sample_fix());
        h.pump();

        assert!(h.controller.last_fix().is_none());
        assert!(h.sink.events().is_empty());
        h.assert_invariants();
    }

    #[test]
    fn test_stale_subscription_fix_discarded() {
        let mut h = Harness::new();
        h.controller.start().unwrap();
        let old_callback = h.provider.live_callback().unwrap();

        h.controller
            .apply_settings(&SettingsUpdate::new().with_interval(Duration::from_millis(500)))
            .unwrap();
        old_callback.deliver(sample_fix());
        h.pump();

        assert!(h.controller.last_fix().is_none());
        assert_eq!(h.controller.status().fixes_discarded, 1);

        assert!(h.provider.emit(sample_fix()));
        h.pump();
        assert_eq!(h.controller.last_fix(), Some(sample_fix()));
    }

    #[test]
    fn test_wake_expiry_tolerated_on_stop() {
        let mut h = Harness::new();
        h.controller.start().unwrap();
        h.wake.expire();

        // expiry does not end the session
        assert!(h.controller.is_running());

        h.controller.stop();
        assert!(!h.controller.is_running());
        assert_eq!(h.wake.release_count(), 0);
        assert!(!h.provider.is_subscribed());
    }

    #[test]
    fn test_stop_clears_last_fix() {
        let mut h = Harness::new();
        h.controller.start().unwrap();
        h.controller.on_fix_delivered(sample_fix());
        assert!(h.controller.last_fix().is_some());

        h.controller.stop();
        assert!(h.controller.last_fix().is_none());

        h.controller.start().unwrap();
        assert!(h.controller.last_fix().is_none());
        assert_eq!(h.controller.status().fixes_received, 0);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut h = Harness::new();
        let fix1 = sample_fix();
        let fix2 = FixRecord::new(50.1001, 14.4002, 1_700_000_004_000).with_accuracy(4.0);

        h.controller.start().unwrap();
        assert!(h.provider.emit(fix1));
        h.pump();

        h.controller
            .reconfigure(AcquisitionConfig::default().with_interval(Duration::from_millis(1000)))
            .unwrap();
        assert!(h.provider.emit(fix2));
        h.pump();

        h.controller.stop();

        assert_eq!(h.provider.request_count(), 2);
        assert_eq!(h.provider.requests()[1].interval_ms, 1000);
        // one cancel for reconfigure, one for stop
        assert_eq!(h.provider.removal_count(), 2);
        let timestamps: Vec<i64> = h.sink.events().iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![fix1.timestamp_ms, fix2.timestamp_ms]);
        assert!(!h.controller.is_running());
        assert!(h.controller.last_fix().is_none());
        assert!(!h.wake.is_held());
        h.assert_invariants();
    }

    #[test]
    fn test_drop_forces_idle() {
        let h = Harness::new();
        let Harness {
            mut controller,
            provider,
            wake,
            foreground,
            context,
            ..
        } = h;
        controller.start().unwrap();
        drop(controller);

        assert!(!provider.is_subscribed());
        assert!(!wake.is_held());
        assert!(!foreground.is_foreground());
        assert!(!context.is_running());
    }

    #[test]
    fn test_service_config_applied() {
        let mut service = ServiceConfig::default();
        service.wake_lock_timeout_ms = 30_000;
        service.notification.title = "Trail".to_string();
        service.acquisition = service.acquisition.with_priority(Priority::LowPower);

        let provider = MockProvider::new();
        let wake = MockWakeLock::new();
        let foreground = MockForeground::new();
        let mut controller = TrackingController::new(
            provider.clone(),
            wake.clone(),
            foreground.clone(),
            Arc::new(TrackingContext::new()),
            Arc::new(|_| {}),
        )
        .with_service_config(&service);

        controller.start().unwrap();
        assert_eq!(wake.last_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(provider.last_request().unwrap().priority, 104);
        assert_eq!(foreground.indicator().unwrap().title, "Trail");
    }

    fn discard_route() -> FixRoute {
        Arc::new(|_delivery: FixDelivery| {})
    }

    fn journaled() -> (TrackingController, CallJournal) {
        let journal = CallJournal::new();
        let controller = TrackingController::new(
            MockProvider::new().with_journal(journal.clone()),
            MockWakeLock::new().with_journal(journal.clone()),
            MockForeground::new().with_journal(journal.clone()),
            Arc::new(TrackingContext::new()),
            discard_route(),
        );
        (controller, journal)
    }

    #[test]
    fn test_start_acquires_before_subscribing() {
        let (mut controller, journal) = journaled();
        controller.start().unwrap();
        assert_eq!(
            journal.entries(),
            vec!["wake.acquire", "foreground.enter", "provider.request"]
        );
    }

    #[test]
    fn test_stop_cancels_before_releasing() {
        let (mut controller, journal) = journaled();
        controller.start().unwrap();
        journal.clear();

        controller.stop();
        assert_eq!(
            journal.entries(),
            vec!["provider.remove", "wake.release", "foreground.exit"]
        );
    }

    #[test]
    fn test_reconfigure_cancels_before_resubmitting() {
        let (mut controller, journal) = journaled();
        controller.start().unwrap();
        journal.clear();

        let config = AcquisitionConfig::default().with_interval(Duration::from_millis(1000));
        controller.reconfigure(config).unwrap();
        assert_eq!(journal.entries(), vec!["provider.remove", "provider.request"]);
    }

    #[test]
    fn test_failed_subscribe_rolls_back_in_reverse() {
        let journal = CallJournal::new();
        let provider = MockProvider::new().with_journal(journal.clone());
        provider.deny_permission(true);
        let mut controller = TrackingController::new(
            provider,
            MockWakeLock::new().with_journal(journal.clone()),
            MockForeground::new().with_journal(journal.clone()),
            Arc::new(TrackingContext::new()),
            discard_route(),
        );

        assert!(controller.start().is_err());
        assert_eq!(
            journal.entries(),
            vec![
                "wake.acquire",
                "foreground.enter",
                "provider.request",
                "foreground.exit",
                "wake.release",
            ]
        );
    }

    /// Wake lock that notes the running flag at acquisition time
    struct FlagCheckingWake {
        inner: MockWakeLock,
        context: Arc<TrackingContext>,
        running_at_acquire: Arc<std::sync::Mutex<Option<bool>>>,
    }

    impl WakeResource for FlagCheckingWake {
        fn acquire(&mut self, timeout: Duration) -> Result<(), ResourceError> {
            *self.running_at_acquire.lock().unwrap() = Some(self.context.is_running());
            self.inner.acquire(timeout)
        }

        fn release(&mut self) -> bool {
            self.inner.release()
        }

        fn is_held(&self) -> bool {
            self.inner.is_held()
        }
    }

    #[test]
    fn test_running_flag_set_before_wake_acquire() {
        let context = Arc::new(TrackingContext::new());
        let running_at_acquire = Arc::new(std::sync::Mutex::new(None));
        let wake = FlagCheckingWake {
            inner: MockWakeLock::new(),
            context: Arc::clone(&context),
            running_at_acquire: Arc::clone(&running_at_acquire),
        };
        let mut controller = TrackingController::new(
            MockProvider::new(),
            wake,
            MockForeground::new(),
            Arc::clone(&context),
            discard_route(),
        );

        assert!(!context.is_running());
        controller.start().unwrap();
        assert_eq!(*running_at_acquire.lock().unwrap(), Some(true));
    }
}
