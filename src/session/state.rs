//! Session state and status snapshots

use crate::core::{FixRecord, SubscriptionId};
use crate::policy::AcquisitionConfig;
use serde::Serialize;
use std::time::Instant;

/// Bookkeeping for one Active period
#[derive(Debug, Clone)]
pub struct ActiveSession {
    /// Wall-clock start (milliseconds since epoch)
    pub started_at_ms: i64,
    started: Instant,
    /// Provider subscription currently feeding this session
    pub subscription: SubscriptionId,
    /// Most recent fix of this period
    pub last_fix: Option<FixRecord>,
    pub fixes_received: u64,
}

impl ActiveSession {
    pub fn new(started_at_ms: i64, subscription: SubscriptionId) -> Self {
        Self {
            started_at_ms,
            started: Instant::now(),
            subscription,
            last_fix: None,
            fixes_received: 0,
        }
    }

    pub fn record(&mut self, fix: FixRecord) {
        self.last_fix = Some(fix);
        self.fixes_received += 1;
    }

    pub fn uptime_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Session state machine: `Idle` <-> `Active`
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Active(ActiveSession),
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        match self {
            SessionState::Active(session) => Some(session),
            SessionState::Idle => None,
        }
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.session().map(|session| session.subscription)
    }

    pub fn last_fix(&self) -> Option<FixRecord> {
        self.session().and_then(|session| session.last_fix)
    }
}

/// Point-in-time view of the controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub running: bool,
    pub started_at_ms: Option<i64>,
    pub uptime_ms: Option<u64>,
    pub subscription: Option<u64>,
    pub last_fix: Option<FixRecord>,
    pub fixes_received: u64,
    /// Deliveries dropped because they arrived while idle or from a cancelled subscription
    pub fixes_discarded: u64,
    pub config: AcquisitionConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_has_no_session_data() {
        let state = SessionState::default();
        assert!(!state.is_active());
        assert!(state.subscription().is_none());
        assert!(state.last_fix().is_none());
    }

    #[test]
    fn test_active_session_records_latest_fix() {
        let mut session = ActiveSession::new(1_000, SubscriptionId::new(3));
        session.record(FixRecord::new(1.0, 1.0, 10));
        session.record(FixRecord::new(2.0, 2.0, 20));

        let state = SessionState::Active(session);
        assert_eq!(state.subscription(), Some(SubscriptionId::new(3)));
        assert_eq!(state.last_fix().map(|fix| fix.timestamp_ms), Some(20));
        assert_eq!(state.session().map(|s| s.fixes_received), Some(2));
    }
}
