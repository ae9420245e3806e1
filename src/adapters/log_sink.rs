//! Log-based notification sink adapter.
//!
//! Implements [`NotificationSink`] by writing every protection
//! notification to the ESP-IDF logger (UART / USB-CDC in production).
//! Relay-on alerts go out at `warn` so they stand out on the console.

use log::{info, warn};

use crate::app::events::Notification;
use crate::app::ports::NotificationSink;

/// Adapter that logs every [`Notification`] to the serial console.
#[derive(Debug, Default)]
pub struct LogNotificationSink;

impl LogNotificationSink {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for LogNotificationSink {
    fn emit(&mut self, notification: &Notification) {
        if notification.is_alert() {
            warn!("PROTECT | {}", notification);
        } else {
            info!("PROTECT | {}", notification);
        }
    }
}
