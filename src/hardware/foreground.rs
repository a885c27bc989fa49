//! Foreground mode and the persistent status indicator

use crate::core::{FixRecord, NOTIFICATION_CHANNEL_ID, NOTIFICATION_ID, NOTIFICATION_TEXT};
use crate::hardware::ResourceError;

/// Content of the persistent indicator shown while tracking
#[derive(Debug, Clone, PartialEq)]
pub struct StatusIndicator {
    pub channel_id: String,
    pub notification_id: u32,
    pub title: String,
    pub text: String,
    /// Indicator cannot be dismissed while tracking
    pub ongoing: bool,
    pub started_at_ms: Option<i64>,
    pub last_fix: Option<FixRecord>,
    pub fixes_received: u64,
}

impl StatusIndicator {
    pub fn new(channel_id: impl Into<String>, notification_id: u32) -> Self {
        Self {
            channel_id: channel_id.into(),
            notification_id,
            title: String::new(),
            text: NOTIFICATION_TEXT.to_string(),
            ongoing: true,
            started_at_ms: None,
            last_fix: None,
            fixes_received: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_session(mut self, started_at_ms: i64, last_fix: Option<FixRecord>, fixes_received: u64) -> Self {
        self.started_at_ms = Some(started_at_ms);
        self.last_fix = last_fix;
        self.fixes_received = fixes_received;
        self
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new(NOTIFICATION_CHANNEL_ID, NOTIFICATION_ID)
    }
}

/// Host for the elevated-priority mode a session runs in
pub trait ForegroundHost: Send {
    /// Enter foreground mode showing `indicator`
    fn enter_foreground(&mut self, indicator: &StatusIndicator) -> Result<(), ResourceError>;

    /// Replace the indicator content; ignored when not in foreground mode
    fn update_indicator(&mut self, indicator: &StatusIndicator);

    /// Leave foreground mode and remove the indicator
    fn exit_foreground(&mut self);

    fn is_foreground(&self) -> bool;
}

/// Foreground host that reports indicator changes through `tracing`
#[derive(Debug, Default)]
pub struct TracingForeground {
    current: Option<StatusIndicator>,
}

impl TracingForeground {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indicator(&self) -> Option<&StatusIndicator> {
        self.current.as_ref()
    }
}

impl ForegroundHost for TracingForeground {
    fn enter_foreground(&mut self, indicator: &StatusIndicator) -> Result<(), ResourceError> {
        tracing::info!(
            channel = %indicator.channel_id,
            id = indicator.notification_id,
            text = %indicator.text,
            "entered foreground mode"
        );
        self.current = Some(indicator.clone());
        Ok(())
    }

    fn update_indicator(&mut self, indicator: &StatusIndicator) {
        if self.current.is_none() {
            return;
        }
        if let Some(fix) = indicator.last_fix {
            tracing::trace!(
                id = indicator.notification_id,
                latitude = fix.latitude,
                longitude = fix.longitude,
                fixes = indicator.fixes_received,
                "status indicator refreshed"
            );
        }
        self.current = Some(indicator.clone());
    }

    fn exit_foreground(&mut self) {
        if self.current.take().is_some() {
            tracing::info!("left foreground mode");
        }
    }

    fn is_foreground(&self) -> bool {
        self.current.is_some()
    }
}
