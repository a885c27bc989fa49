//! Commands accepted by the tracking service

use crate::policy::SettingsUpdate;
use crate::session::{SessionStatus, TrackingResult};

/// External command routed to the session owner thread
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    StartTracking,
    StopTracking,
    UpdateSettings(SettingsUpdate),
    QueryRunning,
    QueryStatus,
}

impl Command {
    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::StartTracking => "start-tracking",
            Command::StopTracking => "stop-tracking",
            Command::UpdateSettings(_) => "update-settings",
            Command::QueryRunning => "query-running",
            Command::QueryStatus => "query-status",
        }
    }
}

/// Successful command outcome
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Done,
    Running(bool),
    Status(SessionStatus),
}

/// Reply sent back to the caller of a command
pub type CommandResponse = TrackingResult<CommandOutcome>;
