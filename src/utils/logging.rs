//! Logging setup.
//!
//! Diagnostics go to stderr so stdout stays free for the JSON event stream.
//! `RUST_LOG` takes precedence over the configured level.

use crate::utils::LogLevel;
use std::io;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber was already installed.
pub fn init_logging(level: LogLevel) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init_logging(LogLevel::Warn);
        assert!(init_logging(LogLevel::Debug).is_err());
    }
}
