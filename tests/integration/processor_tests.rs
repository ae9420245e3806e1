//! Integration tests for the transactional command processor: parsing
//! errors, setter refusals, whole-struct rollback and save failures.

use thermoguard::config::SystemConfig;
use thermoguard::protection::store::{STORE_KEY, STORE_NAMESPACE, decode};
use thermoguard::protection::{ProtectionController, ProtectionSettings, SettingsStore};
use thermoguard::remote::processor::{
    CommandOutcome, CommandProcessor, REPLY_INCOMPATIBLE, SUFFIX_NOT_SAVED, SUFFIX_SAVED,
};
use thermoguard::app::commands::ParseError;
use thermoguard::app::ports::StoragePort;
use thermoguard::app::events::Notification;
use thermoguard::protection::settings::SettingsError;
use thermoguard::sensors::aggregator::MeasurementStats;

use crate::mock_hw::{MockChannel, MockHardware, MockStorage, RecordingSink};

const SENDER: &str = "alice";

struct Rig {
    controller: ProtectionController,
    store: SettingsStore<MockStorage>,
    channel: MockChannel,
    hw: MockHardware,
    sink: RecordingSink,
    stats: MeasurementStats,
}

impl Rig {
    fn new(storage: MockStorage) -> Self {
        Self {
            controller: ProtectionController::new(
                ProtectionSettings::default(),
                &SystemConfig::default(),
            ),
            store: SettingsStore::new(storage),
            channel: MockChannel::new(),
            hw: MockHardware::new(),
            sink: RecordingSink::new(),
            stats: MeasurementStats::default(),
        }
    }

    fn send(&mut self, text: &str) -> CommandOutcome {
        CommandProcessor::new(&mut self.controller, &mut self.store).process(
            text,
            SENDER,
            1_000,
            &self.stats,
            &mut self.channel,
            &mut self.hw,
            &mut self.sink,
        )
    }

    fn stored(&self) -> Option<ProtectionSettings> {
        let mut buf = [0u8; 64];
        let n = self
            .store
            .storage()
            .read(STORE_NAMESPACE, STORE_KEY, &mut buf)
            .ok()?;
        decode(&buf[..n]).ok()
    }
}

// ── Read-only commands ────────────────────────────────────────

#[test]
fn config_replies_with_current_settings() {
    let mut rig = Rig::new(MockStorage::new());
    assert_eq!(rig.send("  CONFIG "), CommandOutcome::ConfigShown);
    assert_eq!(rig.channel.replies.len(), 1);
    assert_eq!(rig.channel.replies[0].0, SENDER);
    assert!(rig.channel.replies[0].1.contains("min: 20.00 C"));
}

#[test]
fn blank_command_is_ignored_silently() {
    let mut rig = Rig::new(MockStorage::new());
    assert_eq!(rig.send("   "), CommandOutcome::Ignored);
    assert!(rig.channel.replies.is_empty());
}

#[test]
fn parse_errors_reply_with_hint() {
    let mut rig = Rig::new(MockStorage::new());
    assert_eq!(
        rig.send("hello"),
        CommandOutcome::Invalid(ParseError::UnknownCommand)
    );
    assert_eq!(
        rig.send("set colour 3"),
        CommandOutcome::Invalid(ParseError::UnknownKey)
    );
    assert_eq!(
        rig.send("set min 22,5"),
        CommandOutcome::Invalid(ParseError::InvalidNumber)
    );
    assert_eq!(
        rig.send("set min"),
        CommandOutcome::Invalid(ParseError::MissingParameter)
    );

    let texts = rig.channel.reply_texts();
    assert_eq!(texts[0], "unknown command. Use 'config' or 'set <key> <value>'.");
    assert_eq!(texts[1], "unknown key. Send 'config' for help.");
    assert_eq!(texts[2], "invalid number. Use '.' as the decimal separator.");
    assert_eq!(texts[3], "missing parameter. Example: set min 22.5");
    assert_eq!(*rig.controller.settings(), ProtectionSettings::default());
    assert_eq!(rig.store.storage().writes, 0);
}

// ── Updates ───────────────────────────────────────────────────

#[test]
fn successful_update_is_saved_and_confirmed() {
    let mut rig = Rig::new(MockStorage::new());
    assert_eq!(rig.send("set max 28"), CommandOutcome::Updated { saved: true });

    assert_eq!(rig.controller.settings().max_c, 28.0);
    assert_eq!(rig.stored(), Some(*rig.controller.settings()));

    let texts = rig.channel.reply_texts();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], format!("setting updated: max = 28.00 C{SUFFIX_SAVED}"));
    assert!(texts[1].contains("max: 28.00 C"));
}

#[test]
fn renotify_is_given_in_seconds() {
    let mut rig = Rig::new(MockStorage::new());
    assert_eq!(rig.send("set renotify 60"), CommandOutcome::Updated { saved: true });
    assert_eq!(rig.controller.settings().renotify_interval_ms, 60_000);
    assert!(rig.channel.reply_texts()[0].starts_with("setting updated: renotify = 60 s"));
}

#[test]
fn setter_refusal_leaves_settings_untouched() {
    let mut rig = Rig::new(MockStorage::new());
    assert_eq!(
        rig.send("set min 35"),
        CommandOutcome::Refused(SettingsError::MinNotBelowMax)
    );
    assert_eq!(*rig.controller.settings(), ProtectionSettings::default());
    assert_eq!(rig.store.storage().writes, 0);
    assert_eq!(
        rig.channel.reply_texts(),
        vec![SettingsError::MinNotBelowMax.to_string().as_str()]
    );
}

#[test]
fn incompatible_band_rolls_back() {
    let mut rig = Rig::new(MockStorage::new());
    assert_eq!(rig.send("set hysteresis 5"), CommandOutcome::Updated { saved: true });
    let before = *rig.controller.settings();
    rig.channel.replies.clear();

    // min < max passes the setter, but a 4 C band cannot hold h = 5.
    assert_eq!(rig.send("set min 26"), CommandOutcome::Incompatible);
    assert_eq!(*rig.controller.settings(), before);
    assert_eq!(rig.stored(), Some(before));
    assert_eq!(rig.channel.reply_texts(), vec![REPLY_INCOMPATIBLE]);
}

#[test]
fn save_failure_rolls_back_and_says_so() {
    let mut rig = Rig::new(MockStorage::failing());
    assert_eq!(rig.send("set max 28"), CommandOutcome::Updated { saved: false });
    assert_eq!(*rig.controller.settings(), ProtectionSettings::default());

    let texts = rig.channel.reply_texts();
    assert!(texts[0].ends_with(SUFFIX_NOT_SAVED));
    assert!(texts[1].contains("max: 30.00 C"), "config shows the kept settings");
}

#[test]
fn update_reevaluates_protection_immediately() {
    let mut rig = Rig::new(MockStorage::new());
    rig.stats = MeasurementStats {
        min: 28.0,
        max: 29.0,
        average: 28.5,
        last: 29.0,
        count: 5,
    };
    assert_eq!(rig.send("set max 28.5"), CommandOutcome::Updated { saved: true });
    assert!(rig.controller.cooling_active());
    assert!(rig.hw.cooling_on());
    assert!(matches!(
        rig.sink.sent.as_slice(),
        [Notification::CoolingStarted { upper, .. }] if *upper == 28.5
    ));
}

#[test]
fn overflowing_threshold_is_rejected_and_not_persisted() {
    let mut rig = Rig::new(MockStorage::new());
    let text = format!("set max 1{}", "0".repeat(39));
    assert_eq!(rig.send(&text), CommandOutcome::Invalid(ParseError::InvalidNumber));
    assert_eq!(*rig.controller.settings(), ProtectionSettings::default());
    assert_eq!(rig.store.storage().writes, 0);
}
