//! Outward fix event stream

use crate::core::FixRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Record emitted toward the sink once per delivered fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixEvent {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f32,
    pub speed: f32,
    pub altitude: f64,
    /// Fix time in milliseconds since epoch
    pub timestamp: i64,
}

impl From<&FixRecord> for FixEvent {
    fn from(fix: &FixRecord) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy: fix.accuracy,
            speed: fix.speed,
            altitude: fix.altitude,
            timestamp: fix.timestamp_ms,
        }
    }
}

/// Sink-side failure; logged by the dispatcher, never propagated
#[derive(Debug, Clone, PartialEq)]
pub struct SinkError {
    pub details: String,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event sink error: {}", self.details)
    }
}

impl std::error::Error for SinkError {}

/// Consumer of fix events, attached and detached at runtime
pub trait EventSink: Send {
    fn emit(&mut self, event: &FixEvent) -> Result<(), SinkError>;
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &FixEvent) -> Result<(), SinkError> {
        let to_sink_error = |details: String| SinkError { details };
        serde_json::to_writer(&mut self.writer, event).map_err(|e| to_sink_error(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .map_err(|e| to_sink_error(e.to_string()))
    }
}

/// Sink that keeps every event it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<FixEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FixEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &FixEvent) -> Result<(), SinkError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*event);
        Ok(())
    }
}
