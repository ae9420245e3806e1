//! Outbound operator notifications.
//!
//! The [`ProtectionController`](crate::protection::controller::ProtectionController)
//! emits these through the [`NotificationSink`](super::ports::NotificationSink)
//! port.  Adapters on the other side decide where the text goes (serial
//! log, chat broadcast, ...).  `Display` renders the operator-facing text.

use core::fmt;

/// Relay state changes and "still active" reminders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notification {
    /// Object temperature fell to or below the lower bound.
    HeatingStarted { last: f32, lower: f32, average: f32 },
    /// Object temperature rose to or above the upper bound.
    CoolingStarted { last: f32, upper: f32, average: f32 },
    /// Both relays released.
    ReturnedToSafeRange { last: f32, average: f32 },
    /// Heating has stayed on for another re-notify interval.
    HeatingContinues { last: f32, lower: f32, average: f32 },
    /// Cooling has stayed on for another re-notify interval.
    CoolingContinues { last: f32, upper: f32, average: f32 },
}

impl Notification {
    /// True for transitions that energise a relay.
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::HeatingStarted { .. } | Self::CoolingStarted { .. })
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::HeatingStarted { last, lower, average } => write!(
                f,
                "WARNING: object temperature below the lower limit. Last: {last:.2} C \
                 (< {lower:.2} C). Average: {average:.2} C. Heating started."
            ),
            Self::CoolingStarted { last, upper, average } => write!(
                f,
                "WARNING: object temperature above the upper limit. Last: {last:.2} C \
                 (> {upper:.2} C). Average: {average:.2} C. Cooling started."
            ),
            Self::ReturnedToSafeRange { last, average } => write!(
                f,
                "Info: object temperature back in the safe range. Last: {last:.2} C, \
                 average: {average:.2} C. Protection released."
            ),
            Self::HeatingContinues { last, lower, average } => write!(
                f,
                "Info: heating protection still active. Last: {last:.2} C \
                 (< {lower:.2} C). Average: {average:.2} C."
            ),
            Self::CoolingContinues { last, upper, average } => write!(
                f,
                "Info: cooling protection still active. Last: {last:.2} C \
                 (> {upper:.2} C). Average: {average:.2} C."
            ),
        }
    }
}
