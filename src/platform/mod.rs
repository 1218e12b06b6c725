//! Platform abstraction layer
//!
//! The simulation never draws, stores or shows anything itself. These
//! contracts are implemented by the host:
//! - Render sink (canvas on web, text on native)
//! - Notification sink (toasts on web, log on native)
//! - Input mapping from pointer/touch to player velocity

pub mod input;

use crate::error::RenderError;
use crate::sim::Snapshot;

/// Draws one frame from a read-only snapshot
pub trait RenderSink {
    fn render(&mut self, snapshot: &Snapshot<'_>) -> Result<(), RenderError>;
}

/// Receives short player-facing messages. Fire and forget.
pub trait NotificationSink {
    fn notify(&mut self, message: &str);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&mut self, message: &str) {
        log::info!("{}", message);
    }
}

/// Keeps every notification (HUD history, tests)
#[derive(Debug, Default, Clone)]
pub struct NotificationLog {
    pub messages: Vec<String>,
}

impl NotificationSink for NotificationLog {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
