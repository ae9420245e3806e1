//! Application service: the hexagonal core.
//!
//! [`ThermalService`] owns the protection controller, the settings store,
//! both measurement windows and the cadence timers.  All I/O flows
//! through port traits injected at call sites, so the whole loop runs
//! against mocks and a simulated clock.
//!
//! ```text
//!    SensorPort ──▶ ┌──────────────────────────┐ ──▶ NotificationSink
//!                   │      ThermalService      │
//!  ActuatorPort ◀── │ Aggregators · Controller │ ◀─▶ RemoteChannel
//!                   └──────────────────────────┘
//!                                │
//!                           StoragePort
//! ```

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::protection::controller::ProtectionController;
use crate::protection::store::SettingsStore;
use crate::remote::allow_list::AllowList;
use crate::remote::processor::{CommandOutcome, CommandProcessor};
use crate::sensors::aggregator::{MeasurementAggregator, MeasurementStats};

use super::events::Notification;
use super::ports::{ActuatorPort, NotificationSink, RemoteChannel, SensorPort, StoragePort};

/// Where the live settings came from at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    Stored,
    Defaults,
}

// ───────────────────────────────────────────────────────────────
// ThermalService
// ───────────────────────────────────────────────────────────────

pub struct ThermalService<S: StoragePort> {
    controller: ProtectionController,
    store: SettingsStore<S>,
    allow_list: AllowList,
    object: MeasurementAggregator,
    ambient: MeasurementAggregator,
    sample_interval_ms: u64,
    report_interval_ms: u64,
    /// `None` until the first sample, so the first tick samples at once.
    last_sample_ms: Option<u64>,
    last_report_ms: u64,
    startup_message: String,
    startup_sent: bool,
    tick_count: u64,
    /// Notifications raised this tick, waiting for the remote broadcast.
    outbox: Vec<Notification>,
}

impl<S: StoragePort> ThermalService<S> {
    /// Construct the service.  Settings start at the configured defaults
    /// until [`boot`](Self::boot) loads the stored ones.
    pub fn new(config: &SystemConfig, storage: S) -> Self {
        Self {
            controller: ProtectionController::new(config.default_protection(), config),
            store: SettingsStore::new(storage),
            allow_list: AllowList::new(&config.allowed_senders),
            object: MeasurementAggregator::new(),
            ambient: MeasurementAggregator::new(),
            sample_interval_ms: config.sample_interval_ms,
            report_interval_ms: config.report_interval_ms,
            last_sample_ms: None,
            last_report_ms: 0,
            startup_message: config.startup_message.clone(),
            startup_sent: false,
            tick_count: 0,
            outbox: Vec::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load persisted settings (or keep the defaults), release both
    /// relays and start the report window at `now`.
    pub fn boot(&mut self, now: u64, hw: &mut impl ActuatorPort) -> SettingsSource {
        let source = match self.store.load() {
            Ok(settings) => {
                self.controller.apply_settings(settings);
                SettingsSource::Stored
            }
            Err(e) => {
                warn!("ThermalService: using default settings ({})", e);
                SettingsSource::Defaults
            }
        };

        self.controller.initialize_hardware(hw);
        self.controller.reset_renotify_timers(now);
        self.last_report_ms = now;
        info!(
            "ThermalService booted ({:?} settings, protection {})",
            source,
            if self.controller.is_enabled() { "enabled" } else { "disabled" }
        );
        source
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One pass of the control loop: startup message, sampling,
    /// reporting, then pending commands.  Never blocks.
    ///
    /// `hw` satisfies both [`SensorPort`] and [`ActuatorPort`] so the
    /// port boundary stays explicit without a double mutable borrow.
    /// Every notification goes to `sink` and is also broadcast on
    /// `channel` before the tick returns.
    pub fn tick(
        &mut self,
        now: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl NotificationSink,
        channel: &mut impl RemoteChannel,
    ) {
        self.tick_count += 1;
        let mut outbox = core::mem::take(&mut self.outbox);

        // 1. Startup message, retried until one send succeeds
        if !self.startup_sent && channel.broadcast(&self.startup_message) {
            self.startup_sent = true;
        }

        // 2. Sampling + protection
        if self.due(self.last_sample_ms, self.sample_interval_ms, now) {
            self.last_sample_ms = Some(now);
            let mut tee = Tee { log: &mut *sink, outbox: &mut outbox };
            self.sample(now, hw, &mut tee);
        }
        flush(&mut outbox, channel);

        // 3. Periodic report
        if now.saturating_sub(self.last_report_ms) >= self.report_interval_ms {
            self.report(now, channel);
        }

        // 4. Remote commands
        for msg in channel.receive() {
            if !self.allow_list.is_allowed(&msg.sender) {
                info!("ThermalService: ignoring command from {}", msg.sender);
                continue;
            }
            let mut tee = Tee { log: &mut *sink, outbox: &mut outbox };
            self.handle_command(&msg.text, &msg.sender, now, hw, &mut tee, channel);
            flush(&mut outbox, channel);
        }

        self.outbox = outbox;
    }

    /// Run one operator command through the transactional processor.
    pub fn handle_command(
        &mut self,
        text: &str,
        sender: &str,
        now: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl NotificationSink,
        channel: &mut impl RemoteChannel,
    ) -> CommandOutcome {
        let stats = self.object.stats();
        let outcome = CommandProcessor::new(&mut self.controller, &mut self.store)
            .process(text, sender, now, &stats, channel, hw, sink);
        debug!("ThermalService: command from {} -> {:?}", sender, outcome);
        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn controller(&self) -> &ProtectionController {
        &self.controller
    }

    pub fn object_stats(&self) -> MeasurementStats {
        self.object.stats()
    }

    pub fn ambient_stats(&self) -> MeasurementStats {
        self.ambient.stats()
    }

    pub fn startup_sent(&self) -> bool {
        self.startup_sent
    }

    /// Control-loop passes since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn store(&self) -> &SettingsStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SettingsStore<S> {
        &mut self.store
    }

    // ── Internal ──────────────────────────────────────────────

    fn due(&self, last: Option<u64>, interval: u64, now: u64) -> bool {
        match last {
            None => true,
            Some(t) => now.saturating_sub(t) >= interval,
        }
    }

    fn sample(
        &mut self,
        now: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl NotificationSink,
    ) {
        let reading = match hw.read() {
            Ok(r) => r,
            Err(e) => {
                warn!("ThermalService: sensor read failed: {}", e);
                return;
            }
        };
        self.ambient.add_sample(reading.ambient_c);
        self.object.add_sample(reading.object_c);

        let stats = self.object.stats();
        self.controller.handle_protection(&stats, now, hw, sink);
    }

    fn report(&mut self, now: u64, channel: &mut impl RemoteChannel) {
        let text = self
            .controller
            .format_measurement_report(&self.ambient.stats(), &self.object.stats());
        if channel.broadcast(&text) {
            self.ambient.reset();
            self.object.reset();
            self.last_report_ms = now;
        } else {
            warn!("ThermalService: report broadcast failed, keeping window");
        }
    }
}

/// Sink that hands each notification to the local sink and queues it
/// for the remote broadcast.
struct Tee<'a, N: NotificationSink> {
    log: &'a mut N,
    outbox: &'a mut Vec<Notification>,
}

impl<N: NotificationSink> NotificationSink for Tee<'_, N> {
    fn emit(&mut self, notification: &Notification) {
        self.log.emit(notification);
        self.outbox.push(*notification);
    }
}

/// Broadcast queued notifications.  A failed send is logged and dropped.
fn flush(outbox: &mut Vec<Notification>, channel: &mut impl RemoteChannel) {
    for n in outbox.drain(..) {
        if !channel.broadcast(&n.to_string()) {
            warn!("ThermalService: notification broadcast failed: {}", n);
        }
    }
}
