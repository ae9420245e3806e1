//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ThermalService / ProtectionController (domain)
//! ```
//!
//! Driven adapters (sensor, relays, notification sinks, remote channel,
//! storage, clock) implement these traits.  The domain consumes them via
//! generics injected at call sites, so it never touches hardware directly
//! and every cadence can be driven by a simulated clock in tests.

use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Never goes backwards.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One reading from the IR thermometer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    /// Sensor die / surrounding air temperature (°C).
    pub ambient_c: f32,
    /// Target object temperature (°C), the controlled variable.
    pub object_c: f32,
}

pub trait SensorPort {
    fn read(&mut self) -> Result<TemperatureReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// The two mutually-exclusive relay outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayChannel {
    Heating,
    Cooling,
}

pub trait ActuatorPort {
    /// Energise or release one relay.  Idempotent; no feedback.
    fn write_relay(&mut self, channel: RelayChannel, energized: bool);
}

// ───────────────────────────────────────────────────────────────
// Notification sink (driven adapter: domain → operator)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget operator notifications.
///
/// Delivery failures stay inside the adapter (log, drop); the
/// controller never retries.
pub trait NotificationSink {
    fn emit(&mut self, notification: &super::events::Notification);
}

// ───────────────────────────────────────────────────────────────
// Remote channel (driven adapter: operator ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Maximum sender-id length accepted from a transport.
pub const MAX_SENDER_LEN: usize = 32;
/// Maximum command text length accepted from a transport.
pub const MAX_COMMAND_LEN: usize = 256;

/// A single text command received from a remote operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: heapless::String<MAX_SENDER_LEN>,
    pub text: heapless::String<MAX_COMMAND_LEN>,
}

impl InboundMessage {
    /// Build a message, or `None` if either field exceeds its capacity.
    pub fn new(sender: &str, text: &str) -> Option<Self> {
        let mut s = heapless::String::new();
        s.push_str(sender).ok()?;
        let mut t = heapless::String::new();
        t.push_str(text).ok()?;
        Some(Self { sender: s, text: t })
    }
}

/// Chat-style command channel.
///
/// `reply` / `broadcast` return `false` on a send failure; callers treat
/// that as non-fatal and do not retry.
pub trait RemoteChannel {
    /// Drain every command received since the previous call.
    fn receive(&mut self) -> Vec<InboundMessage>;

    /// Send `text` to a single sender.
    fn reply(&mut self, sender: &str, text: &str) -> bool;

    /// Send `text` to every configured recipient (reports, startup).
    fn broadcast(&mut self, text: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for fixed-size records.
///
/// Write operations MUST be atomic: a failed write leaves the previous
/// value readable.  ESP-IDF NVS guarantees this per `nvs_commit()`; the
/// in-memory simulation achieves it trivially.
pub trait StoragePort {
    /// Read a value.  Returns the stored length, which may exceed
    /// `buf.len()`; only `min(len, buf.len())` bytes are copied.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O or commit error.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
