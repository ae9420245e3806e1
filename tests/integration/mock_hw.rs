//! Mock adapters for integration tests.
//!
//! Each mock records every call so tests can assert on the full history
//! without touching real GPIO, I²C or flash.

use std::collections::{HashMap, VecDeque};

use thermoguard::app::events::Notification;
use thermoguard::app::ports::{
    ActuatorPort, InboundMessage, NotificationSink, RelayChannel, RemoteChannel, SensorPort,
    StorageError, StoragePort, TemperatureReading,
};
use thermoguard::error::SensorError;

// ── MockHardware ──────────────────────────────────────────────

/// Scripted thermometer plus recording relays.
///
/// Readings are served from `readings` in order; once empty, the last
/// served reading repeats.  `None` entries, or an empty script, simulate
/// a bus failure.
pub struct MockHardware {
    pub writes: Vec<(RelayChannel, bool)>,
    pub readings: VecDeque<Option<TemperatureReading>>,
    last: Option<TemperatureReading>,
    pub reads: usize,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            readings: VecDeque::new(),
            last: None,
            reads: 0,
        }
    }

    /// Queue an object temperature with a fixed 22 °C ambient.
    pub fn push_object(&mut self, object_c: f32) {
        self.readings.push_back(Some(TemperatureReading {
            ambient_c: 22.0,
            object_c,
        }));
    }

    pub fn push_failure(&mut self) {
        self.readings.push_back(None);
    }

    /// Latest level written to `channel` (false if never written).
    pub fn relay_on(&self, channel: RelayChannel) -> bool {
        self.writes
            .iter()
            .rev()
            .find_map(|&(c, on)| (c == channel).then_some(on))
            .unwrap_or(false)
    }

    pub fn heating_on(&self) -> bool {
        self.relay_on(RelayChannel::Heating)
    }

    pub fn cooling_on(&self) -> bool {
        self.relay_on(RelayChannel::Cooling)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn write_relay(&mut self, channel: RelayChannel, energized: bool) {
        self.writes.push((channel, energized));
    }
}

impl SensorPort for MockHardware {
    fn read(&mut self) -> Result<TemperatureReading, SensorError> {
        self.reads += 1;
        match self.readings.pop_front() {
            Some(Some(r)) => {
                self.last = Some(r);
                Ok(r)
            }
            Some(None) => Err(SensorError::BusError),
            None => self.last.ok_or(SensorError::BusError),
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub sent: Vec<Notification>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_where(&self, f: impl Fn(&Notification) -> bool) -> usize {
        self.sent.iter().filter(|n| f(n)).count()
    }
}

impl NotificationSink for RecordingSink {
    fn emit(&mut self, notification: &Notification) {
        self.sent.push(*notification);
    }
}

// ── MockStorage ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockStorage {
    pub store: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
    pub writes: usize,
}

#[allow(dead_code)]
impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn insert_raw(&mut self, namespace: &str, key: &str, data: &[u8]) {
        self.store
            .insert(format!("{}::{}", namespace, key), data.to_vec());
    }
}

impl StoragePort for MockStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.get(&format!("{}::{}", namespace, key)) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(v.len())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.writes += 1;
        self.store
            .insert(format!("{}::{}", namespace, key), data.to_vec());
        Ok(())
    }
}

// ── MockChannel ───────────────────────────────────────────────

pub struct MockChannel {
    pub inbox: Vec<InboundMessage>,
    pub replies: Vec<(String, String)>,
    pub broadcasts: Vec<String>,
    pub broadcast_ok: bool,
}

#[allow(dead_code)]
impl MockChannel {
    pub fn new() -> Self {
        Self {
            inbox: Vec::new(),
            replies: Vec::new(),
            broadcasts: Vec::new(),
            broadcast_ok: true,
        }
    }

    pub fn send(&mut self, sender: &str, text: &str) {
        self.inbox
            .push(InboundMessage::new(sender, text).expect("message fits"));
    }

    pub fn reply_texts(&self) -> Vec<&str> {
        self.replies.iter().map(|(_, t)| t.as_str()).collect()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteChannel for MockChannel {
    fn receive(&mut self) -> Vec<InboundMessage> {
        std::mem::take(&mut self.inbox)
    }

    fn reply(&mut self, sender: &str, text: &str) -> bool {
        self.replies.push((sender.to_string(), text.to_string()));
        true
    }

    fn broadcast(&mut self, text: &str) -> bool {
        if self.broadcast_ok {
            self.broadcasts.push(text.to_string());
        }
        self.broadcast_ok
    }
}
