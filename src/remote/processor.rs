//! Transactional settings updates from operator commands.
//!
//! A `set` command runs as a small transaction against the live
//! controller:
//!
//! ```text
//!   snapshot ─▶ setter ─▶ validate ─▶ save ─▶ reply + config ─▶ re-evaluate
//!                 │          │          │
//!                 ▼          ▼          ▼
//!              reject    rollback   rollback
//! ```
//!
//! Every rejection path replies with a reason and leaves the settings
//! exactly as they were before the command arrived.

use core::fmt::Write as _;

use log::{info, warn};

use crate::app::commands::{Command, ParseError, SettingUpdate, parse_command};
use crate::app::ports::{ActuatorPort, NotificationSink, RemoteChannel, StoragePort};
use crate::protection::controller::ProtectionController;
use crate::protection::settings::{SettingsError, validate_protection_settings};
use crate::protection::store::SettingsStore;
use crate::sensors::aggregator::MeasurementStats;

pub const REPLY_INCOMPATIBLE: &str = "update rejected: incompatible values";
pub const SUFFIX_SAVED: &str = " (saved)";
pub const SUFFIX_NOT_SAVED: &str = " (not saved, previous settings kept)";

/// What happened to one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Blank input, nothing sent.
    Ignored,
    /// `config` answered.
    ConfigShown,
    /// Not understood (parse error).  Settings untouched.
    Invalid(ParseError),
    /// Setter refused the value.  Settings untouched.
    Refused(SettingsError),
    /// Setter passed but the whole-struct check failed; rolled back.
    Incompatible,
    /// Applied; `saved` is false when persistence failed and the change
    /// was rolled back.
    Updated { saved: bool },
}

/// Borrowed view over the controller and its store for one command.
pub struct CommandProcessor<'a, S: StoragePort> {
    controller: &'a mut ProtectionController,
    store: &'a mut SettingsStore<S>,
}

impl<'a, S: StoragePort> CommandProcessor<'a, S> {
    pub fn new(controller: &'a mut ProtectionController, store: &'a mut SettingsStore<S>) -> Self {
        Self { controller, store }
    }

    /// Handle one command from `sender`.
    ///
    /// `object_stats` is the current object window; it is used to
    /// re-evaluate protection right after a successful change.
    #[allow(clippy::too_many_arguments)]
    pub fn process(
        &mut self,
        text: &str,
        sender: &str,
        now: u64,
        object_stats: &MeasurementStats,
        channel: &mut impl RemoteChannel,
        hw: &mut impl ActuatorPort,
        sink: &mut impl NotificationSink,
    ) -> CommandOutcome {
        let update = match parse_command(text) {
            Ok(Command::ShowConfig) => {
                reply(channel, sender, &self.controller.format_protection_config());
                return CommandOutcome::ConfigShown;
            }
            Ok(Command::Set(update)) => update,
            Err(ParseError::Empty) => return CommandOutcome::Ignored,
            Err(e) => {
                reply(channel, sender, &e.to_string());
                return CommandOutcome::Invalid(e);
            }
        };

        let previous = *self.controller.settings();

        let key = update.key().as_str();
        let mut confirmation = match self.apply(update) {
            Ok(text) => text,
            Err(e) => {
                reply(channel, sender, &e.to_string());
                return CommandOutcome::Refused(e);
            }
        };

        if !validate_protection_settings(self.controller.settings()) {
            self.controller.apply_settings(previous);
            info!("command from {}: {} rejected by whole-struct check", sender, key);
            reply(channel, sender, REPLY_INCOMPATIBLE);
            return CommandOutcome::Incompatible;
        }

        let saved = match self.store.save(self.controller.settings()) {
            Ok(()) => {
                confirmation.push_str(SUFFIX_SAVED);
                true
            }
            Err(e) => {
                warn!("command from {}: save failed ({}), rolling back", sender, e);
                self.controller.apply_settings(previous);
                confirmation.push_str(SUFFIX_NOT_SAVED);
                false
            }
        };
        if saved {
            info!("command from {}: {} updated", sender, key);
        }

        reply(channel, sender, &confirmation);
        reply(channel, sender, &self.controller.format_protection_config());
        self.controller.handle_protection(object_stats, now, hw, sink);

        CommandOutcome::Updated { saved }
    }

    /// Run the single-field setter and build the confirmation text.
    fn apply(&mut self, update: SettingUpdate) -> Result<String, SettingsError> {
        let c = &mut *self.controller;
        let mut text = String::from("setting updated: ");
        match update {
            SettingUpdate::Min(v) => {
                c.set_min(v)?;
                let _ = write!(text, "min = {v:.2} C");
            }
            SettingUpdate::Max(v) => {
                c.set_max(v)?;
                let _ = write!(text, "max = {v:.2} C");
            }
            SettingUpdate::Hysteresis(v) => {
                c.set_hysteresis(v)?;
                let _ = write!(text, "hysteresis = {v:.2} C");
            }
            SettingUpdate::MinSamples(v) => {
                c.set_min_samples(v)?;
                let _ = write!(text, "minsamples = {}", c.settings().min_samples);
            }
            SettingUpdate::RenotifySeconds(v) => {
                c.set_renotify_seconds(v)?;
                let _ = write!(text, "renotify = {v} s");
            }
        }
        Ok(text)
    }
}

fn reply(channel: &mut impl RemoteChannel, sender: &str, text: &str) {
    if !channel.reply(sender, text) {
        warn!("reply to {} failed", sender);
    }
}
