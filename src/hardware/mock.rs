//! Mock platform collaborators for testing and development
//!
//! Each mock is a cheap handle over shared state, so a test can keep a clone
//! for inspection after moving the other into a controller.

use crate::core::FixRecord;
use crate::hardware::{
    FixCallback, ForegroundHost, LocationProvider, ProviderError, ProviderResult, ResourceError,
    ResourceKind, StatusIndicator, WakeResource,
};
use crate::policy::RequestDescriptor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered log of collaborator calls shared between mocks
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    entries: Arc<Mutex<Vec<&'static str>>>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: &'static str) {
        lock(&self.entries).push(call);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        lock(&self.entries).clone()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

fn note(journal: &Option<CallJournal>, call: &'static str) {
    if let Some(journal) = journal {
        journal.record(call);
    }
}

#[derive(Debug, Default)]
struct ProviderState {
    journal: Option<CallJournal>,
    live: Option<FixCallback>,
    requests: Vec<RequestDescriptor>,
    removals: u32,
    absent_removals: u32,
    overlapping_requests: u32,
    denied: bool,
    unavailable: bool,
}

/// Mock positioning provider that records every call
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `provider.request` and `provider.remove` calls into `journal`
    pub fn with_journal(self, journal: CallJournal) -> Self {
        lock(&self.state).journal = Some(journal);
        self
    }

    /// Reject future requests as unauthorized
    pub fn deny_permission(&self, denied: bool) {
        lock(&self.state).denied = denied;
    }

    /// Fail future requests with a non-authorization error
    pub fn set_unavailable(&self, unavailable: bool) {
        lock(&self.state).unavailable = unavailable;
    }

    /// Deliver a fix through the live subscription, if any
    pub fn emit(&self, fix: FixRecord) -> bool {
        let callback = lock(&self.state).live.clone();
        match callback {
            Some(callback) => {
                callback.deliver(fix);
                true
            }
            None => false,
        }
    }

    /// Drop the subscription without the controller asking, as a platform may
    pub fn drop_subscription(&self) {
        lock(&self.state).live = None;
    }

    pub fn is_subscribed(&self) -> bool {
        lock(&self.state).live.is_some()
    }

    pub fn live_callback(&self) -> Option<FixCallback> {
        lock(&self.state).live.clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.state).requests.len()
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        lock(&self.state).requests.clone()
    }

    pub fn last_request(&self) -> Option<RequestDescriptor> {
        lock(&self.state).requests.last().copied()
    }

    /// Successful and absent cancellations combined
    pub fn removal_count(&self) -> u32 {
        let state = lock(&self.state);
        state.removals + state.absent_removals
    }

    pub fn absent_removal_count(&self) -> u32 {
        lock(&self.state).absent_removals
    }

    /// Requests issued while another subscription was still live
    pub fn overlapping_request_count(&self) -> u32 {
        lock(&self.state).overlapping_requests
    }
}

impl LocationProvider for MockProvider {
    fn request_updates(
        &mut self,
        request: &RequestDescriptor,
        callback: FixCallback,
    ) -> ProviderResult<()> {
        let mut state = lock(&self.state);
        note(&state.journal, "provider.request");
        if state.denied {
            return Err(ProviderError::PermissionDenied {
                permission: "ACCESS_FINE_LOCATION".to_string(),
            });
        }
        if state.unavailable {
            return Err(ProviderError::Unavailable {
                details: "mock provider offline".to_string(),
            });
        }
        if state.live.is_some() {
            state.overlapping_requests += 1;
        }
        state.requests.push(*request);
        state.live = Some(callback);
        Ok(())
    }

    fn remove_updates(&mut self) -> ProviderResult<()> {
        let mut state = lock(&self.state);
        note(&state.journal, "provider.remove");
        if state.live.take().is_some() {
            state.removals += 1;
            Ok(())
        } else {
            state.absent_removals += 1;
            Err(ProviderError::NoActiveSubscription)
        }
    }

    fn name(&self) -> &str {
        "mock-provider"
    }
}

#[derive(Debug, Default)]
struct WakeState {
    journal: Option<CallJournal>,
    held: bool,
    acquisitions: u32,
    releases: u32,
    last_timeout: Option<Duration>,
    fail: bool,
}

/// Mock wake lock with manual expiry
#[derive(Debug, Clone, Default)]
pub struct MockWakeLock {
    state: Arc<Mutex<WakeState>>,
}

impl MockWakeLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `wake.acquire` and `wake.release` calls into `journal`
    pub fn with_journal(self, journal: CallJournal) -> Self {
        lock(&self.state).journal = Some(journal);
        self
    }

    /// Make future acquisitions fail
    pub fn fail_acquire(&self, fail: bool) {
        lock(&self.state).fail = fail;
    }

    /// Simulate the maximum hold timer firing
    pub fn expire(&self) {
        lock(&self.state).held = false;
    }

    pub fn acquisition_count(&self) -> u32 {
        lock(&self.state).acquisitions
    }

    pub fn release_count(&self) -> u32 {
        lock(&self.state).releases
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        lock(&self.state).last_timeout
    }
}

impl WakeResource for MockWakeLock {
    fn acquire(&mut self, timeout: Duration) -> Result<(), ResourceError> {
        let mut state = lock(&self.state);
        note(&state.journal, "wake.acquire");
        if state.fail {
            return Err(ResourceError::new(ResourceKind::WakeLock, "simulated acquire failure"));
        }
        state.held = true;
        state.acquisitions += 1;
        state.last_timeout = Some(timeout);
        Ok(())
    }

    fn release(&mut self) -> bool {
        let mut state = lock(&self.state);
        note(&state.journal, "wake.release");
        if state.held {
            state.held = false;
            state.releases += 1;
            true
        } else {
            false
        }
    }

    fn is_held(&self) -> bool {
        lock(&self.state).held
    }
}

#[derive(Debug, Default)]
struct ForegroundState {
    journal: Option<CallJournal>,
    current: Option<StatusIndicator>,
    entries: u32,
    exits: u32,
    updates: Vec<StatusIndicator>,
    denied: bool,
}

/// Mock foreground host that keeps every indicator it was shown
#[derive(Debug, Clone, Default)]
pub struct MockForeground {
    state: Arc<Mutex<ForegroundState>>,
}

impl MockForeground {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `foreground.enter` and `foreground.exit` calls into `journal`
    pub fn with_journal(self, journal: CallJournal) -> Self {
        lock(&self.state).journal = Some(journal);
        self
    }

    /// Make future foreground requests fail
    pub fn deny(&self, denied: bool) {
        lock(&self.state).denied = denied;
    }

    pub fn entry_count(&self) -> u32 {
        lock(&self.state).entries
    }

    pub fn exit_count(&self) -> u32 {
        lock(&self.state).exits
    }

    pub fn updates(&self) -> Vec<StatusIndicator> {
        lock(&self.state).updates.clone()
    }

    pub fn indicator(&self) -> Option<StatusIndicator> {
        lock(&self.state).current.clone()
    }
}

impl ForegroundHost for MockForeground {
    fn enter_foreground(&mut self, indicator: &StatusIndicator) -> Result<(), ResourceError> {
        let mut state = lock(&self.state);
        note(&state.journal, "foreground.enter");
        if state.denied {
            return Err(ResourceError::new(ResourceKind::Foreground, "simulated denial"));
        }
        state.current = Some(indicator.clone());
        state.entries += 1;
        Ok(())
    }

    fn update_indicator(&mut self, indicator: &StatusIndicator) {
        let mut state = lock(&self.state);
        if state.current.is_some() {
            state.current = Some(indicator.clone());
            state.updates.push(indicator.clone());
        }
    }

    fn exit_foreground(&mut self) {
        let mut state = lock(&self.state);
        note(&state.journal, "foreground.exit");
        if state.current.take().is_some() {
            state.exits += 1;
        }
    }

    fn is_foreground(&self) -> bool {
        lock(&self.state).current.is_some()
    }
}
