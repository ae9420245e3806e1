//! Heating / cooling protection controller.
//!
//! Runs after every new object-temperature sample and decides the relay
//! state under a bang-bang law with hysteresis:
//!
//! ```text
//!   Heating ◀── last ≤ min ──  Idle  ── last ≥ max ──▶ Cooling
//!      │                        ▲  ▲                       │
//!      └── last ≥ min + h ──────┘  └────── last ≤ max − h ─┘
//! ```
//!
//! ## Gates
//!
//! 1. Protection disabled or an empty window → nothing happens.
//! 2. While idle, the window must hold `min_samples` samples before the
//!    first actuation.  Once a relay is on, every sample counts so the
//!    relay can be released without delay.
//! 3. A relay change is refused (and silently retried next cycle) if the
//!    previous change happened less than the minimum switch interval ago.
//!
//! The control variable is the most recent sample, not the window
//! average: the average lags behind while a relay is correcting.

use core::fmt::Write as _;

use log::{debug, info};

use crate::app::events::Notification;
use crate::app::ports::{ActuatorPort, NotificationSink, RelayChannel};
use crate::config::SystemConfig;
use crate::sensors::aggregator::MeasurementStats;

use super::settings::{
    MIN_SAMPLES_RANGE, ProtectionSettings, RENOTIFY_SECS_RANGE, SettingsError,
};

/// Relay state as seen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionState {
    Idle,
    Heating,
    Cooling,
}

/// Relay outputs plus the timestamps that gate switching and reminders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorState {
    pub heating_on: bool,
    pub cooling_on: bool,
    /// `None` until the first accepted switch.
    pub last_switch_ms: Option<u64>,
    pub last_heating_notify_ms: u64,
    pub last_cooling_notify_ms: u64,
}

impl ActuatorState {
    pub fn state(&self) -> ProtectionState {
        match (self.heating_on, self.cooling_on) {
            (true, _) => ProtectionState::Heating,
            (false, true) => ProtectionState::Cooling,
            (false, false) => ProtectionState::Idle,
        }
    }

    fn any_active(&self) -> bool {
        self.heating_on || self.cooling_on
    }
}

/// What a call to [`ProtectionController::handle_protection`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionOutcome {
    /// Disabled, empty window, or sample gate not yet met.
    Skipped,
    /// Evaluated; relays unchanged (a reminder may have been sent).
    Unchanged,
    /// A change was wanted but the minimum switch interval has not elapsed.
    Deferred,
    /// Relays were switched into the given state.
    Switched(ProtectionState),
}

pub struct ProtectionController {
    settings: ProtectionSettings,
    actuators: ActuatorState,
    enabled: bool,
    min_switch_interval_ms: u64,
}

impl ProtectionController {
    pub fn new(settings: ProtectionSettings, config: &SystemConfig) -> Self {
        Self {
            settings,
            actuators: ActuatorState::default(),
            enabled: config.protection_enabled,
            min_switch_interval_ms: config.relay_min_switch_interval_ms,
        }
    }

    /// Drive both relays to released and forget all switching history.
    pub fn initialize_hardware(&mut self, hw: &mut impl ActuatorPort) {
        if !self.enabled {
            return;
        }
        hw.write_relay(RelayChannel::Heating, false);
        hw.write_relay(RelayChannel::Cooling, false);
        self.actuators = ActuatorState::default();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn settings(&self) -> &ProtectionSettings {
        &self.settings
    }

    pub fn actuators(&self) -> &ActuatorState {
        &self.actuators
    }

    pub fn state(&self) -> ProtectionState {
        self.actuators.state()
    }

    pub fn heating_active(&self) -> bool {
        self.actuators.heating_on
    }

    pub fn cooling_active(&self) -> bool {
        self.actuators.cooling_on
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // ── Settings ──────────────────────────────────────────────

    /// Replace the settings wholesale.  Callers validate first; this is
    /// also the rollback path, so it must not fail.
    pub fn apply_settings(&mut self, settings: ProtectionSettings) {
        self.settings = settings;
    }

    pub fn reset_renotify_timers(&mut self, now: u64) {
        self.actuators.last_heating_notify_ms = now;
        self.actuators.last_cooling_notify_ms = now;
    }

    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn set_min(&mut self, value: f32) -> Result<(), SettingsError> {
        if !value.is_finite() {
            return Err(SettingsError::NotFinite);
        }
        if !(value < self.settings.max_c) {
            return Err(SettingsError::MinNotBelowMax);
        }
        self.settings.min_c = value;
        Ok(())
    }

    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn set_max(&mut self, value: f32) -> Result<(), SettingsError> {
        if !value.is_finite() {
            return Err(SettingsError::NotFinite);
        }
        if !(value > self.settings.min_c) {
            return Err(SettingsError::MaxNotAboveMin);
        }
        self.settings.max_c = value;
        Ok(())
    }

    pub fn set_hysteresis(&mut self, value: f32) -> Result<(), SettingsError> {
        if !(value > 0.0 && value < self.settings.span()) {
            return Err(SettingsError::HysteresisOutOfRange);
        }
        self.settings.hysteresis_c = value;
        Ok(())
    }

    pub fn set_min_samples(&mut self, value: u32) -> Result<(), SettingsError> {
        if !MIN_SAMPLES_RANGE.contains(&value) {
            return Err(SettingsError::MinSamplesOutOfRange);
        }
        self.settings.min_samples = value as u16;
        Ok(())
    }

    pub fn set_renotify_seconds(&mut self, seconds: u32) -> Result<(), SettingsError> {
        if !RENOTIFY_SECS_RANGE.contains(&seconds) {
            return Err(SettingsError::RenotifyOutOfRange);
        }
        self.settings.renotify_interval_ms = seconds * 1000;
        Ok(())
    }

    // ── Control law ───────────────────────────────────────────

    /// Evaluate the hysteresis law against the latest object statistics.
    pub fn handle_protection(
        &mut self,
        stats: &MeasurementStats,
        now: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl NotificationSink,
    ) -> ProtectionOutcome {
        if !self.enabled || stats.count == 0 {
            return ProtectionOutcome::Skipped;
        }

        let sample_gate = stats.count >= u32::from(self.settings.min_samples);
        if !self.actuators.any_active() && !sample_gate {
            return ProtectionOutcome::Skipped;
        }

        let (want_heating, want_cooling) = self.desired_relays(stats.last);

        let changed =
            want_heating != self.actuators.heating_on || want_cooling != self.actuators.cooling_on;
        if changed {
            if let Some(last) = self.actuators.last_switch_ms {
                if now.saturating_sub(last) < self.min_switch_interval_ms {
                    debug!(
                        "protection: switch deferred ({} ms since last switch)",
                        now.saturating_sub(last)
                    );
                    return ProtectionOutcome::Deferred;
                }
            }
            return ProtectionOutcome::Switched(self.switch_to(
                want_heating,
                want_cooling,
                stats,
                now,
                hw,
                sink,
            ));
        }

        self.send_reminders(stats, now, sink);

        if !self.actuators.any_active() && sample_gate {
            self.reset_renotify_timers(now);
        }
        ProtectionOutcome::Unchanged
    }

    /// Desired `(heating, cooling)` for the current sample, after the
    /// de-escalation rule and conflict resolution.
    fn desired_relays(&self, current: f32) -> (bool, bool) {
        let lower = self.settings.min_c;
        let upper = self.settings.max_c;
        let h = self.settings.hysteresis_c;
        let mid = self.settings.midpoint();

        let mut heating = if self.actuators.heating_on {
            current < lower + h
        } else {
            current <= lower
        };
        let mut cooling = if self.actuators.cooling_on {
            current > upper - h
        } else {
            current >= upper
        };

        let near_center = current > lower && current < upper && (current - mid).abs() <= h;
        if self.actuators.any_active() && near_center {
            heating = false;
            cooling = false;
        }

        // Only reachable when h exceeds half the band.
        if heating && cooling {
            if current <= lower {
                cooling = false;
            } else if current >= upper {
                heating = false;
            } else {
                heating = false;
                cooling = false;
            }
        }

        (heating, cooling)
    }

    fn switch_to(
        &mut self,
        heating: bool,
        cooling: bool,
        stats: &MeasurementStats,
        now: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl NotificationSink,
    ) -> ProtectionState {
        let from = self.actuators.state();
        self.actuators.heating_on = heating;
        self.actuators.cooling_on = cooling;
        // Release before energising so the coils never overlap.
        let order = if heating {
            [(RelayChannel::Cooling, cooling), (RelayChannel::Heating, heating)]
        } else {
            [(RelayChannel::Heating, heating), (RelayChannel::Cooling, cooling)]
        };
        for (channel, on) in order {
            hw.write_relay(channel, on);
        }
        self.actuators.last_switch_ms = Some(now);

        let to = self.actuators.state();
        info!("protection: {:?} -> {:?} (last={:.2} C)", from, to, stats.last);

        let notification = match to {
            ProtectionState::Heating => {
                self.actuators.last_heating_notify_ms = now;
                Notification::HeatingStarted {
                    last: stats.last,
                    lower: self.settings.min_c,
                    average: stats.average,
                }
            }
            ProtectionState::Cooling => {
                self.actuators.last_cooling_notify_ms = now;
                Notification::CoolingStarted {
                    last: stats.last,
                    upper: self.settings.max_c,
                    average: stats.average,
                }
            }
            ProtectionState::Idle => {
                self.reset_renotify_timers(now);
                Notification::ReturnedToSafeRange {
                    last: stats.last,
                    average: stats.average,
                }
            }
        };
        sink.emit(&notification);
        to
    }

    fn send_reminders(
        &mut self,
        stats: &MeasurementStats,
        now: u64,
        sink: &mut impl NotificationSink,
    ) {
        let interval = u64::from(self.settings.renotify_interval_ms);

        if self.actuators.heating_on
            && now.saturating_sub(self.actuators.last_heating_notify_ms) >= interval
        {
            sink.emit(&Notification::HeatingContinues {
                last: stats.last,
                lower: self.settings.min_c,
                average: stats.average,
            });
            self.actuators.last_heating_notify_ms = now;
        }
        if self.actuators.cooling_on
            && now.saturating_sub(self.actuators.last_cooling_notify_ms) >= interval
        {
            sink.emit(&Notification::CoolingContinues {
                last: stats.last,
                upper: self.settings.max_c,
                average: stats.average,
            });
            self.actuators.last_cooling_notify_ms = now;
        }
    }

    // ── Formatting ────────────────────────────────────────────

    /// Current settings followed by the command help text.
    pub fn format_protection_config(&self) -> String {
        let s = &self.settings;
        let mut out = String::with_capacity(384);
        let _ = write!(
            out,
            "Protection settings\n\
             - min: {:.2} C\n\
             - max: {:.2} C\n\
             - hysteresis: {:.2} C\n\
             - min samples: {}\n\
             - renotify: {} s\n\n",
            s.min_c,
            s.max_c,
            s.hysteresis_c,
            s.min_samples,
            s.renotify_interval_ms / 1000,
        );
        out.push_str(
            "Commands:\n\
             config\n\
             set min <value_C>\n\
             set max <value_C>\n\
             set hysteresis <value_C>\n\
             set minsamples <integer>\n\
             set renotify <seconds>\n\n\
             Note: min must be lower than max and hysteresis must be positive \
             and fit inside the band. Every change is saved to flash.",
        );
        out
    }

    /// Periodic measurement report for one aggregation window.
    pub fn format_measurement_report(
        &self,
        ambient: &MeasurementStats,
        object: &MeasurementStats,
    ) -> String {
        if !object.is_valid() || !ambient.is_valid() {
            return String::from(NO_DATA_MESSAGE);
        }

        let mut out = String::with_capacity(384);
        let _ = writeln!(out, "Measurement report");
        let _ = writeln!(out, "Samples: {}", object.count);
        write_stats_block(&mut out, "Object (C)", object);
        write_stats_block(&mut out, "Ambient (C)", ambient);

        let protection = if !self.enabled {
            "Disabled"
        } else {
            match self.state() {
                ProtectionState::Heating => "Heating active",
                ProtectionState::Cooling => "Cooling active",
                ProtectionState::Idle => "Normal",
            }
        };
        let _ = writeln!(out, "Protection: {protection}");
        let _ = write!(
            out,
            "Limits: {:.2} - {:.2} C, hysteresis: {:.2} C",
            self.settings.min_c, self.settings.max_c, self.settings.hysteresis_c
        );
        out
    }
}

/// Sent instead of a report when the window holds no samples.
pub const NO_DATA_MESSAGE: &str = "No measurement data in the last period.";

fn write_stats_block(out: &mut String, title: &str, stats: &MeasurementStats) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "  Average: {:.2}", stats.average);
    let _ = writeln!(out, "  Min: {:.2}", stats.min);
    let _ = writeln!(out, "  Max: {:.2}", stats.max);
    let _ = writeln!(out, "  Last: {:.2}", stats.last);
}
