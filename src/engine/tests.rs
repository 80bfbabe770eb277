//! Session-level scenarios: whole ticks in, effect lists out.

use super::profile::DEFAULT_PROFILE;
use super::*;
use crate::config::{DIM_AFTER_MS, WARN_WINDOW_MS};
use crate::hid::modifier;
use crate::keys::{Flags, Key, KeySnapshot};
use crate::settings::AutoPowerOff;
use crate::ui::status::{POWER_OFF, SLEEP_WARNING};

const MIN: u64 = 60 * 1000;
const DEFAULT_D: u64 = 20 * MIN;

fn session() -> Session {
    session_with(DEFAULT_PROFILE, Ok(Some(4)))
}

fn session_with(profile: Profile, stored: Result<Option<u8>, Error>) -> Session {
    Session::boot(profile, IdleConfig::default(), stored, 0).0
}

fn fn_flags() -> Flags {
    Flags {
        function: true,
        ..Flags::NONE
    }
}

fn press(keys: &[Key], flags: Flags) -> KeySnapshot {
    KeySnapshot::pressed(keys, flags)
}

fn reports(fx: &Effects) -> impl Iterator<Item = &KeyboardReport> {
    fx.iter().filter_map(|e| match e {
        Effect::SendReport(r) => Some(r),
        _ => None,
    })
}

fn line_draws<'a>(fx: &'a Effects, which: Line) -> impl Iterator<Item = (&'a str, Color)> {
    fx.iter().filter_map(move |e| match e {
        Effect::DrawLine { line, text, color } if *line == which => Some((text.as_str(), *color)),
        _ => None,
    })
}

fn count(fx: &Effects, effect: &Effect) -> usize {
    fx.iter().filter(|e| *e == effect).count()
}

// ═══════════════════════════════════════════════════════════════════════════
// Boot
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn boot_draws_every_line() {
    let (session, fx) = Session::boot(DEFAULT_PROFILE, IdleConfig::default(), Ok(Some(2)), 0);

    assert_eq!(session.modes().auto_power_off.index(), 2);
    assert_eq!(session.power_state(), PowerState::Active);
    assert!(fx.contains(&Effect::SetBrightness(BRIGHTNESS_ACTIVE)));
    for line in [
        Line::Banner,
        Line::Legend,
        Line::Status,
        Line::Notice,
        Line::Modifiers,
        Line::Sent,
    ] {
        assert_eq!(line_draws(&fx, line).count(), 1, "{:?}", line);
    }
    assert_eq!(
        line_draws(&fx, Line::Banner).next(),
        Some((status::BANNER, Color::Red))
    );
    assert!(!fx.iter().any(|e| matches!(e, Effect::Persist { .. })));
}

#[test]
fn boot_writes_back_default_when_store_is_empty() {
    let (session, fx) = Session::boot(DEFAULT_PROFILE, IdleConfig::default(), Ok(None), 0);
    assert_eq!(session.modes().auto_power_off.index(), 4);
    assert_eq!(
        fx.first(),
        Some(&Effect::Persist {
            key: KEY_AUTO_POWER_OFF,
            value: 4
        })
    );
}

#[test]
fn boot_writes_back_default_on_read_error_or_bad_value() {
    for stored in [Err(Error::Storage), Ok(Some(7)), Ok(Some(0xFF))] {
        let (session, fx) = Session::boot(DEFAULT_PROFILE, IdleConfig::default(), stored, 0);
        assert_eq!(session.modes().auto_power_off.index(), 4);
        assert_eq!(
            count(
                &fx,
                &Effect::Persist {
                    key: KEY_AUTO_POWER_OFF,
                    value: 4
                }
            ),
            1
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Chords
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn caps_chord_sends_no_report_beyond_host_caps_lock_tap() {
    let mut s = session();
    let chord = press(&[Key::printable(usage::DIGIT_1, '1')], fn_flags());

    let fx = s.tick(&chord, 100);
    assert!(s.modes().caps_lock);
    assert_eq!(reports(&fx).count(), 0);
    assert_eq!(count(&fx, &Effect::TapKey(usage::CAPS_LOCK)), 1);
    assert_eq!(count(&fx, &Effect::Pause { ms: CHORD_DEBOUNCE_MS }), 1);
    assert_eq!(
        count(&fx, &Effect::ReleaseModifiers(modifier::ALL_LEFT)),
        1
    );
    assert_eq!(line_draws(&fx, Line::Modifiers).next(), Some(("", Color::White)));
    let (status_text, status_color) = line_draws(&fx, Line::Status).next().unwrap();
    assert!(status_text.contains("lock"));
    assert!(!status_text.contains("unlock"));
    assert_eq!(status_color, Color::Yellow);

    // Held chord stays latched: no repeats, no second toggle.
    let fx = s.tick(&chord.unchanged(), 120);
    assert!(fx.is_empty());
    assert!(s.modes().caps_lock);

    s.tick(&KeySnapshot::released(), 140);
    s.tick(&chord, 160);
    assert!(!s.modes().caps_lock);
}

#[test]
fn shifted_chord_character_is_equivalent() {
    let mut s = session();
    let flags = Flags {
        function: true,
        shift: true,
        ..Flags::NONE
    };
    s.tick(&press(&[Key::printable(usage::DIGIT_3, '#')], flags), 100);
    assert!(s.modes().cursor_overlay);
    assert!(!s.modes().caps_lock);
}

#[test]
fn caps_chord_without_host_sync_taps_nothing() {
    let profile = Profile {
        sync_host_caps_lock: false,
        ..DEFAULT_PROFILE
    };
    let mut s = session_with(profile, Ok(Some(4)));
    let fx = s.tick(&press(&[Key::printable(usage::DIGIT_1, '1')], fn_flags()), 100);
    assert!(s.modes().caps_lock);
    assert!(!fx.iter().any(|e| matches!(e, Effect::TapKey(_))));
}

#[test]
fn power_off_chord_cycles_and_persists() {
    let mut s = session();
    let chord = press(&[Key::printable(usage::DIGIT_2, '2')], fn_flags());

    let fx = s.tick(&chord, 100);
    assert_eq!(s.modes().auto_power_off.index(), 5);
    assert!(fx.contains(&Effect::Persist {
        key: KEY_AUTO_POWER_OFF,
        value: 5
    }));

    s.tick(&KeySnapshot::released(), 120);
    let fx = s.tick(&chord, 140);
    assert_eq!(s.modes().auto_power_off.index(), 6);
    assert_eq!(s.modes().auto_power_off.duration_ms(), None);
    assert!(fx.contains(&Effect::Persist {
        key: KEY_AUTO_POWER_OFF,
        value: 6
    }));

    s.tick(&KeySnapshot::released(), 160);
    s.tick(&chord, 180);
    assert_eq!(s.modes().auto_power_off.index(), 0);
}

#[test]
fn fn_with_unbound_key_is_not_a_chord() {
    let mut s = session();
    let fx = s.tick(&press(&[Key::printable(usage::DIGIT_4, '4')], fn_flags()), 100);
    assert_eq!(reports(&fx).count(), 1);
    assert_eq!(*s.modes(), ModeState::new(AutoPowerOff::DEFAULT));
}

// ═══════════════════════════════════════════════════════════════════════════
// Reports
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn ctrl_shift_letter_report() {
    let mut s = session();
    let flags = Flags {
        ctrl: true,
        shift: true,
        ..Flags::NONE
    };
    let fx = s.tick(&press(&[Key::printable(usage::A, 'A')], flags), 100);

    let sent: heapless::Vec<_, 4> = reports(&fx).copied().collect();
    assert_eq!(sent.len(), 1);
    let report = sent[0];
    assert_eq!(report.modifier, modifier::LEFT_CTRL | modifier::LEFT_SHIFT);
    assert_eq!(report.key_count(), 1);
    assert_eq!(report.keycodes[0], usage::A);
    assert_eq!(
        line_draws(&fx, Line::Modifiers).next(),
        Some(("Ctrl Shift", Color::White))
    );
    assert_eq!(count(&fx, &Effect::Pause { ms: SEND_PACING_MS }), 1);
}

#[test]
fn held_keys_resend_identical_reports() {
    let mut s = session();
    let snap = press(&[Key::printable(usage::A + 1, 'b')], Flags::NONE);

    let first: KeyboardReport = *reports(&s.tick(&snap, 100)).next().unwrap();
    let fx = s.tick(&snap.unchanged(), 120);
    let second: KeyboardReport = *reports(&fx).next().unwrap();
    assert_eq!(first, second);
    // Repeats skip redraws and pacing.
    assert_eq!(fx.len(), 1);
}

#[test]
fn repeat_can_be_disabled() {
    let profile = Profile {
        repeat_while_held: false,
        ..DEFAULT_PROFILE
    };
    let mut s = session_with(profile, Ok(Some(4)));
    let snap = press(&[Key::printable(usage::A, 'a')], Flags::NONE);
    s.tick(&snap, 100);
    assert!(s.tick(&snap.unchanged(), 120).is_empty());
}

#[test]
fn caps_lock_shows_upper_case_but_keeps_base_usage() {
    let mut s = session();
    s.tick(&press(&[Key::printable(usage::DIGIT_1, '1')], fn_flags()), 100);
    s.tick(&KeySnapshot::released(), 120);

    let fx = s.tick(&press(&[Key::printable(usage::A, 'a')], Flags::NONE), 140);
    let report = *reports(&fx).next().unwrap();
    assert_eq!(report.keycodes[0], usage::A);
    assert_eq!(report.modifier, 0);
    let (sent, _) = line_draws(&fx, Line::Sent).next().unwrap();
    assert_eq!(sent, " HID Code: 0x4 (A)");
}

#[test]
fn fn_layer_beats_cursor_layer_in_session() {
    let mut s = session();
    s.tick(&press(&[Key::printable(usage::DIGIT_3, '3')], fn_flags()), 100);
    s.tick(&KeySnapshot::released(), 120);
    assert!(s.modes().cursor_overlay);

    // Cursor overlay alone: ';' becomes Up.
    let fx = s.tick(&press(&[Key::printable(usage::SEMICOLON, ';')], Flags::NONE), 140);
    assert_eq!(reports(&fx).next().unwrap().keycodes[0], usage::UP_ARROW);
    s.tick(&KeySnapshot::released(), 160);

    // fn + '5' is F5 whatever the cursor mode says.
    let fx = s.tick(&press(&[Key::printable(usage::DIGIT_5, '5')], fn_flags()), 180);
    assert_eq!(reports(&fx).next().unwrap().keycodes[0], usage::F5);
}

#[test]
fn release_sends_one_release_all_and_no_report() {
    let mut s = session();
    s.tick(
        &press(
            &[Key::printable(usage::A, 'a')],
            Flags {
                ctrl: true,
                ..Flags::NONE
            },
        ),
        100,
    );

    let fx = s.tick(&KeySnapshot::released(), 120);
    assert_eq!(count(&fx, &Effect::ReleaseAll), 1);
    assert_eq!(reports(&fx).count(), 0);
    assert_eq!(line_draws(&fx, Line::Modifiers).next(), Some(("", Color::White)));
    assert!(s.last_report().is_none());

    // Idle ticks after the release stay silent.
    assert!(s.tick(&KeySnapshot::idle(), 140).is_empty());
}

#[test]
fn seventh_key_is_dropped() {
    let mut s = session();
    let keys: heapless::Vec<Key, 7> = (0..7u8)
        .map(|i| Key::printable(usage::A + i, (b'a' + i) as char))
        .collect();
    let fx = s.tick(&press(&keys, Flags::NONE), 100);
    let report = reports(&fx).next().unwrap();
    assert_eq!(report.keycodes, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Idle / power
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn silence_dims_then_powers_off_exactly_once() {
    let mut s = session();
    let idle = KeySnapshot::idle();

    assert!(s.tick(&idle, DIM_AFTER_MS - 1).is_empty());
    let fx = s.tick(&idle, DEFAULT_D - WARN_WINDOW_MS - 1);
    assert_eq!(s.power_state(), PowerState::Dimmed);
    assert_eq!(fx.as_slice(), &[Effect::SetBrightness(BRIGHTNESS_DIMMED)]);

    let fx = s.tick(&idle, DEFAULT_D - WARN_WINDOW_MS);
    assert_eq!(s.power_state(), PowerState::Warning);
    assert_eq!(
        line_draws(&fx, Line::Notice).next(),
        Some((SLEEP_WARNING, Color::Yellow))
    );

    let fx = s.tick(&idle, DEFAULT_D);
    assert_eq!(s.power_state(), PowerState::PoweredOff);
    assert_eq!(count(&fx, &Effect::PowerOff), 1);
    assert_eq!(fx.last(), Some(&Effect::PowerOff));
    assert_eq!(
        line_draws(&fx, Line::Notice).next(),
        Some((POWER_OFF, Color::Red))
    );
    for line in [Line::Legend, Line::Status, Line::Modifiers, Line::Sent] {
        assert_eq!(line_draws(&fx, line).next(), Some(("", Color::White)));
    }
    let pauses: heapless::Vec<u32, 4> = fx
        .iter()
        .filter_map(|e| match e {
            Effect::Pause { ms } => Some(*ms),
            _ => None,
        })
        .collect();
    assert_eq!(pauses.as_slice(), &[POWER_OFF_MESSAGE_MS, POWER_OFF_GRACE_MS]);

    // Terminal: nothing reacts any more, not even keys.
    assert!(s.tick(&idle, DEFAULT_D + 20).is_empty());
    assert!(s
        .tick(&press(&[Key::printable(usage::A, 'a')], Flags::NONE), DEFAULT_D + 40)
        .is_empty());
    assert!(s.wake(DEFAULT_D + 60).is_empty());
    assert!(!s.link_poll_due(DEFAULT_D + 10 * MIN));
}

#[test]
fn warning_blinks() {
    let mut s = session();
    let idle = KeySnapshot::idle();
    let start = DEFAULT_D - WARN_WINDOW_MS;
    s.tick(&idle, start);

    let fx = s.tick(&idle, start + 500);
    assert_eq!(line_draws(&fx, Line::Notice).next(), Some(("", Color::Yellow)));
    let fx = s.tick(&idle, start + 1000);
    assert_eq!(
        line_draws(&fx, Line::Notice).next(),
        Some((SLEEP_WARNING, Color::Yellow))
    );
    assert!(s.tick(&idle, start + 1020).is_empty());
}

#[test]
fn key_during_warning_wakes_and_clears_notice() {
    let mut s = session();
    let start = DEFAULT_D - WARN_WINDOW_MS;
    s.tick(&KeySnapshot::idle(), start);

    let fx = s.tick(&press(&[Key::printable(usage::A, 'a')], Flags::NONE), start + 100);
    assert_eq!(s.power_state(), PowerState::Active);
    assert_eq!(fx.first(), Some(&Effect::SetBrightness(BRIGHTNESS_ACTIVE)));
    assert_eq!(line_draws(&fx, Line::Notice).next(), Some(("", Color::White)));
    assert_eq!(reports(&fx).count(), 1);

    // The countdown restarted from the last transition.
    s.tick(&KeySnapshot::released(), start + 120);
    s.tick(&KeySnapshot::idle(), DEFAULT_D + 1000);
    assert_eq!(s.power_state(), PowerState::Active);
    s.tick(&KeySnapshot::idle(), start + 120 + DIM_AFTER_MS);
    assert_eq!(s.power_state(), PowerState::Dimmed);
}

#[test]
fn modes_survive_dimming_and_warning() {
    let mut s = session();
    s.tick(&press(&[Key::printable(usage::DIGIT_1, '1')], fn_flags()), 100);
    s.tick(&KeySnapshot::released(), 120);
    s.tick(&press(&[Key::printable(usage::DIGIT_3, '3')], fn_flags()), 140);
    s.tick(&KeySnapshot::released(), 160);

    s.tick(&KeySnapshot::idle(), 160 + DIM_AFTER_MS);
    assert_eq!(s.power_state(), PowerState::Dimmed);
    let warn_at = 160 + DEFAULT_D - WARN_WINDOW_MS;
    s.tick(&KeySnapshot::idle(), warn_at);
    assert_eq!(s.power_state(), PowerState::Warning);

    let keys = [
        Key::printable(usage::SEMICOLON, ';'),
        Key::printable(usage::A, 'a'),
    ];
    let fx = s.tick(&press(&keys, Flags::NONE), warn_at + 100);
    assert_eq!(s.power_state(), PowerState::Active);
    assert!(s.modes().caps_lock);
    assert!(s.modes().cursor_overlay);

    let report = reports(&fx).next().unwrap();
    assert_eq!(report.modifier, 0);
    assert_eq!(report.keycodes[0], usage::UP_ARROW);
    assert_eq!(report.keycodes[1], usage::A);
    let (sent, _) = line_draws(&fx, Line::Sent).next().unwrap();
    assert!(sent.starts_with(" HID Code: 0x52 0x4 ("));
    assert!(sent.contains('A'));
    assert!(!sent.contains('a'));
}

#[test]
fn held_key_without_transition_is_not_activity() {
    let mut s = session();
    let snap = press(&[Key::printable(usage::A, 'a')], Flags::NONE);
    s.tick(&snap, 0);
    s.tick(&snap.unchanged(), DIM_AFTER_MS);
    assert_eq!(s.power_state(), PowerState::Dimmed);
}

#[test]
fn wake_button_restores_brightness() {
    let mut s = session();
    s.tick(&KeySnapshot::idle(), DIM_AFTER_MS);
    assert_eq!(s.power_state(), PowerState::Dimmed);

    let fx = s.wake(DIM_AFTER_MS + 10);
    assert_eq!(fx.as_slice(), &[Effect::SetBrightness(BRIGHTNESS_ACTIVE)]);
    assert_eq!(s.power_state(), PowerState::Active);
}

#[test]
fn disabled_auto_off_never_powers_off() {
    let mut s = session_with(DEFAULT_PROFILE, Ok(Some(6)));
    for minute in 1..=120 {
        let fx = s.tick(&KeySnapshot::idle(), minute * MIN);
        assert!(!fx.contains(&Effect::PowerOff));
    }
    assert_eq!(s.power_state(), PowerState::Dimmed);
}

#[test]
fn shorter_step_applies_to_running_countdown() {
    // 30m stored, cycle to "off", then wrap to 3m.
    let mut s = session_with(DEFAULT_PROFILE, Ok(Some(5)));
    let chord = press(&[Key::printable(usage::DIGIT_2, '2')], fn_flags());
    s.tick(&chord, 0);
    s.tick(&KeySnapshot::released(), 20);
    s.tick(&chord, 40);
    s.tick(&KeySnapshot::released(), 60);
    assert_eq!(s.modes().auto_power_off.minutes(), Some(3));

    let fx = s.tick(&KeySnapshot::idle(), 60 + 3 * MIN);
    assert!(fx.contains(&Effect::PowerOff));
}

// ═══════════════════════════════════════════════════════════════════════════
// Link monitor
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn banner_redraws_only_on_link_change() {
    let mut s = session();
    assert!(s.link_poll_due(0));

    let fx = s.link_status(true, 0);
    assert_eq!(
        line_draws(&fx, Line::Banner).next(),
        Some((status::BANNER, Color::Blue))
    );
    assert!(s.link_connected());
    assert!(!s.link_poll_due(LINK_POLL_MS - 1));
    assert!(s.link_poll_due(LINK_POLL_MS));

    assert!(s.link_status(true, LINK_POLL_MS).is_empty());

    let fx = s.link_status(false, 2 * LINK_POLL_MS);
    assert_eq!(
        line_draws(&fx, Line::Banner).next(),
        Some((status::BANNER, Color::Red))
    );
}
