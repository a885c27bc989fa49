//! Wake resource abstraction

use crate::core::WAKE_LOCK_TAG;
use crate::hardware::ResourceError;
use std::time::{Duration, Instant};

/// Keeps the host from suspending while a session is active
pub trait WakeResource: Send {
    /// Acquire the resource; it releases itself after `timeout`
    fn acquire(&mut self, timeout: Duration) -> Result<(), ResourceError>;

    /// Release the resource. Returns `false` if it was not held, e.g. because
    /// the timeout already expired.
    fn release(&mut self) -> bool;

    /// Whether the resource is currently held
    fn is_held(&self) -> bool;
}

/// Host wake lock that honours the maximum hold duration.
///
/// Holding is tracked as a deadline, so expiry needs no timer thread.
#[derive(Debug, Clone)]
pub struct DeadlineWakeLock {
    tag: String,
    held_until: Option<Instant>,
}

impl DeadlineWakeLock {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            held_until: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Time left before the lock lapses on its own
    pub fn remaining(&self) -> Option<Duration> {
        self.held_until
            .and_then(|deadline| deadline.checked_duration_since(Instant::now()))
            .filter(|left| !left.is_zero())
    }
}

impl Default for DeadlineWakeLock {
    fn default() -> Self {
        Self::new(WAKE_LOCK_TAG)
    }
}

impl WakeResource for DeadlineWakeLock {
    fn acquire(&mut self, timeout: Duration) -> Result<(), ResourceError> {
        self.held_until = Some(Instant::now() + timeout);
        tracing::debug!(tag = %self.tag, timeout_ms = timeout.as_millis() as u64, "wake lock acquired");
        Ok(())
    }

    fn release(&mut self) -> bool {
        let was_held = self.is_held();
        self.held_until = None;
        if was_held {
            tracing::debug!(tag = %self.tag, "wake lock released");
        }
        was_held
    }

    fn is_held(&self) -> bool {
        self.remaining().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let mut lock = DeadlineWakeLock::default();
        assert!(!lock.is_held());
        assert_eq!(lock.tag(), WAKE_LOCK_TAG);

        lock.acquire(Duration::from_secs(60)).unwrap();
        assert!(lock.is_held());
        assert!(lock.release());
        assert!(!lock.is_held());

        // second release is tolerated
        assert!(!lock.release());
    }

    #[test]
    fn test_timeout_expiry() {
        let mut lock = DeadlineWakeLock::new("test");
        lock.acquire(Duration::from_millis(5)).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(!lock.is_held());
        assert!(!lock.release());
    }
}
