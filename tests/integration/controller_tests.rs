//! Integration tests for the protection control law against recording
//! relays: hysteresis, the anti-chatter gate, de-escalation and
//! reminders.

use thermoguard::app::events::Notification;
use thermoguard::app::ports::RelayChannel;
use thermoguard::config::SystemConfig;
use thermoguard::protection::{
    ProtectionController, ProtectionOutcome, ProtectionSettings, ProtectionState,
};
use thermoguard::sensors::aggregator::MeasurementStats;

use crate::mock_hw::{MockHardware, RecordingSink};

fn stats(last: f32, count: u32) -> MeasurementStats {
    MeasurementStats {
        min: last,
        max: last,
        average: last,
        last,
        count,
    }
}

fn make_controller(
    settings: ProtectionSettings,
) -> (ProtectionController, MockHardware, RecordingSink) {
    let mut hw = MockHardware::new();
    let mut c = ProtectionController::new(settings, &SystemConfig::default());
    c.initialize_hardware(&mut hw);
    hw.writes.clear();
    (c, hw, RecordingSink::new())
}

// ── Hysteresis ────────────────────────────────────────────────

#[test]
fn heating_holds_until_min_plus_hysteresis() {
    let (mut c, mut hw, mut sink) = make_controller(ProtectionSettings::default());

    let out = c.handle_protection(&stats(19.5, 5), 1_000, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Switched(ProtectionState::Heating));
    assert!(hw.heating_on());

    // Back inside the band but still below min + h.
    let out = c.handle_protection(&stats(20.4, 6), 7_000, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Unchanged);
    assert!(hw.heating_on());

    let out = c.handle_protection(&stats(21.0, 7), 13_000, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Switched(ProtectionState::Idle));
    assert!(!hw.heating_on());
    assert!(!hw.cooling_on());

    assert_eq!(sink.sent.len(), 2);
    assert!(matches!(sink.sent[0], Notification::HeatingStarted { lower, .. } if lower == 20.0));
    assert!(matches!(sink.sent[1], Notification::ReturnedToSafeRange { .. }));
}

#[test]
fn cooling_holds_until_max_minus_hysteresis() {
    let (mut c, mut hw, mut sink) = make_controller(ProtectionSettings::default());

    c.handle_protection(&stats(30.0, 5), 1_000, &mut hw, &mut sink);
    assert!(hw.cooling_on());

    let out = c.handle_protection(&stats(29.5, 6), 10_000, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Unchanged);
    assert!(hw.cooling_on());

    let out = c.handle_protection(&stats(29.0, 7), 20_000, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Switched(ProtectionState::Idle));
    assert!(!hw.cooling_on());
}

#[test]
fn sample_gate_does_not_delay_release() {
    let (mut c, mut hw, mut sink) = make_controller(ProtectionSettings::default());
    c.handle_protection(&stats(18.0, 5), 1_000, &mut hw, &mut sink);
    assert!(c.heating_active());

    // A fresh window holds a single sample, below min_samples.
    let out = c.handle_protection(&stats(22.0, 1), 10_000, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Switched(ProtectionState::Idle));
}

// ── Anti-chatter ──────────────────────────────────────────────

#[test]
fn switch_inside_min_interval_is_deferred() {
    let (mut c, mut hw, mut sink) = make_controller(ProtectionSettings::default());
    c.handle_protection(&stats(19.0, 5), 1_000, &mut hw, &mut sink);
    let writes_after_on = hw.writes.len();

    let out = c.handle_protection(&stats(25.0, 6), 3_000, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Deferred);
    assert!(hw.heating_on());
    assert_eq!(hw.writes.len(), writes_after_on, "deferred switch must not touch relays");
    assert_eq!(c.actuators().last_switch_ms, Some(1_000));

    let out = c.handle_protection(&stats(25.0, 7), 6_000, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Switched(ProtectionState::Idle));
    assert_eq!(c.actuators().last_switch_ms, Some(6_000));
}

#[test]
fn first_switch_is_never_deferred() {
    let (mut c, mut hw, mut sink) = make_controller(ProtectionSettings::default());
    let out = c.handle_protection(&stats(35.0, 5), 0, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Switched(ProtectionState::Cooling));
}

// ── Exclusivity / de-escalation ───────────────────────────────

#[test]
fn direct_cooling_to_heating_never_energizes_both() {
    let (mut c, mut hw, mut sink) = make_controller(ProtectionSettings::default());
    c.handle_protection(&stats(31.0, 5), 1_000, &mut hw, &mut sink);
    let out = c.handle_protection(&stats(19.0, 6), 10_000, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Switched(ProtectionState::Heating));
    assert!(hw.heating_on());
    assert!(!hw.cooling_on());
    assert!(!(c.heating_active() && c.cooling_active()));

    // Cooling is released before heating is energised.
    let tail = &hw.writes[hw.writes.len() - 2..];
    assert_eq!(
        tail,
        &[(RelayChannel::Cooling, false), (RelayChannel::Heating, true)]
    );
}

#[test]
fn wide_hysteresis_releases_near_midpoint() {
    // Band 20..24 with h = 3: min + h lies past the midpoint.
    let settings = ProtectionSettings {
        min_c: 20.0,
        max_c: 24.0,
        hysteresis_c: 3.0,
        ..ProtectionSettings::default()
    };
    let (mut c, mut hw, mut sink) = make_controller(settings);
    c.handle_protection(&stats(19.0, 5), 1_000, &mut hw, &mut sink);
    assert!(c.heating_active());

    // 22.5 < min + h, but within h of the midpoint (22.0).
    let out = c.handle_protection(&stats(22.5, 6), 10_000, &mut hw, &mut sink);
    assert_eq!(out, ProtectionOutcome::Switched(ProtectionState::Idle));
    assert!(!hw.heating_on());
}

// ── Reminders ─────────────────────────────────────────────────

#[test]
fn reminder_follows_renotify_interval() {
    let (mut c, mut hw, mut sink) = make_controller(ProtectionSettings::default());
    c.handle_protection(&stats(19.0, 5), 1_000, &mut hw, &mut sink);
    let is_reminder = |n: &Notification| matches!(n, Notification::HeatingContinues { .. });

    c.handle_protection(&stats(19.0, 6), 61_000, &mut hw, &mut sink);
    assert_eq!(sink.count_where(is_reminder), 0);

    c.handle_protection(&stats(19.0, 7), 121_000, &mut hw, &mut sink);
    assert_eq!(sink.count_where(is_reminder), 1);

    c.handle_protection(&stats(19.0, 8), 122_000, &mut hw, &mut sink);
    assert_eq!(sink.count_where(is_reminder), 1);

    c.handle_protection(&stats(19.0, 9), 241_000, &mut hw, &mut sink);
    assert_eq!(sink.count_where(is_reminder), 2);
}

#[test]
fn idle_evaluation_sends_nothing() {
    let (mut c, mut hw, mut sink) = make_controller(ProtectionSettings::default());
    for i in 0..10u32 {
        let now = u64::from(i) * 200_000;
        let out = c.handle_protection(&stats(25.0, 5 + i), now, &mut hw, &mut sink);
        assert_eq!(out, ProtectionOutcome::Unchanged);
    }
    assert!(sink.sent.is_empty());
    assert!(hw.writes.is_empty());
}
