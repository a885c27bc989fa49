//! Shared tracking context
//!
//! Holds the state other parts of the process observe: the running flag and
//! the attachable event sink. The composer creates one context and hands an
//! `Arc` to both the controller and the transport layer. Only the controller
//! writes the running flag.

use crate::api::sink::{EventSink, FixEvent};
use crate::core::FixRecord;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
pub struct TrackingContext {
    running: AtomicBool,
    sink: Mutex<Option<Box<dyn EventSink>>>,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl TrackingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last published running flag; never blocks
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Attach a sink, returning the one it replaces
    pub fn attach_sink(&self, sink: Box<dyn EventSink>) -> Option<Box<dyn EventSink>> {
        tracing::debug!("event sink attached");
        self.sink_slot().replace(sink)
    }

    pub fn detach_sink(&self) -> Option<Box<dyn EventSink>> {
        let previous = self.sink_slot().take();
        if previous.is_some() {
            tracing::debug!("event sink detached");
        }
        previous
    }

    pub fn has_sink(&self) -> bool {
        self.sink_slot().is_some()
    }

    /// Forward a fix to the attached sink.
    ///
    /// Returns `false` when no sink is attached or it failed; the fix is
    /// dropped either way and is never replayed.
    pub fn dispatch(&self, fix: &FixRecord) -> bool {
        let mut slot = self.sink_slot();
        let Some(sink) = slot.as_mut() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        };

        match sink.emit(&FixEvent::from(fix)) {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "event sink rejected fix");
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn delivered_events(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn sink_slot(&self) -> MutexGuard<'_, Option<Box<dyn EventSink>>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for TrackingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingContext")
            .field("running", &self.is_running())
            .field("has_sink", &self.has_sink())
            .field("delivered", &self.delivered_events())
            .field("dropped", &self.dropped_events())
            .finish()
    }
}
