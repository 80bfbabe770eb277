//! Key-event interpretation and report synthesis.
//!
//! [`Session`] owns all state that outlives a tick (modes, idle timer, link
//! status, last report). Every call returns the [`Effect`]s the caller must
//! perform, in order; the session itself never touches hardware, so the
//! whole pipeline runs on the host with synthetic snapshots and a fake
//! clock.
//!
//! Per changed tick with keys held, first match wins:
//! 1. mode chord ([`chord`]) - absorbs the tick
//! 2. overlay mapping ([`overlay`]) + modifiers ([`modifiers`])
//! 3. report assembly ([`report`])

pub mod chord;
pub mod modifiers;
pub mod overlay;
pub mod profile;
pub mod report;

#[cfg(test)]
mod tests;

use heapless::Vec;

use self::chord::{match_chord, ModeState};
use self::modifiers::{modifier_bits, modifier_label};
use self::overlay::map_keys;
use self::profile::{ModeAction, Profile};
use self::report::{assemble, sent_label};
use crate::config::{
    BRIGHTNESS_ACTIVE, BRIGHTNESS_DIMMED, CHORD_DEBOUNCE_MS, LINK_POLL_MS, POWER_OFF_GRACE_MS,
    POWER_OFF_MESSAGE_MS, SEND_PACING_MS,
};
use crate::error::Error;
use crate::hid::{modifier, usage, KeyboardReport};
use crate::keys::KeySnapshot;
use crate::power::{IdleConfig, PowerEvent, PowerManager, PowerState};
use crate::settings::{self, KEY_AUTO_POWER_OFF};
use crate::ui::{line_text, status, Color, Line, LineText};

/// Upper bound of effects produced by one call.
pub const MAX_EFFECTS: usize = 16;

/// An external call requested by the session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Send a full keyboard report.
    SendReport(KeyboardReport),
    /// Press and release one key outside the report stream.
    TapKey(u8),
    /// Release the given modifier bits, leaving other keys alone.
    ReleaseModifiers(u8),
    /// Release every key and modifier on the host.
    ReleaseAll,
    DrawLine {
        line: Line,
        text: LineText,
        color: Color,
    },
    SetBrightness(u8),
    /// Write one byte to the settings store.
    Persist { key: u8, value: u8 },
    /// Block the loop for a bounded time.
    Pause { ms: u32 },
    /// Cut power. Always the last effect of the session.
    PowerOff,
}

pub type Effects = Vec<Effect, MAX_EFFECTS>;

fn emit(fx: &mut Effects, effect: Effect) {
    if fx.push(effect).is_err() {
        error!("Session: effect buffer full");
    }
}

fn draw(fx: &mut Effects, line: Line, text: LineText, color: Color) {
    emit(fx, Effect::DrawLine { line, text, color });
}

fn clear(fx: &mut Effects, line: Line) {
    draw(fx, line, LineText::new(), Color::White);
}

struct LinkMonitor {
    connected: bool,
    next_poll_ms: u64,
}

/// Device state for one powered-on session.
pub struct Session {
    profile: Profile,
    modes: ModeState,
    power: PowerManager,
    link: LinkMonitor,
    /// What the host currently holds; `None` after a release.
    last_report: Option<KeyboardReport>,
    /// A chord absorbed the current key state; suppress repeats until the
    /// next transition.
    chord_latched: bool,
}

impl Session {
    /// Start a session from the stored auto power-off index.
    ///
    /// Returns the initial screen and, when the stored value was unusable,
    /// the write-back of the default.
    pub fn boot(
        profile: Profile,
        idle: IdleConfig,
        stored: Result<Option<u8>, Error>,
        now_ms: u64,
    ) -> (Self, Effects) {
        let restored = settings::restore(stored);
        let modes = ModeState::new(restored.setting);
        let session = Self {
            profile,
            modes,
            power: PowerManager::new(idle, now_ms, restored.setting.duration_ms()),
            link: LinkMonitor {
                connected: false,
                next_poll_ms: now_ms,
            },
            last_report: None,
            chord_latched: false,
        };

        let mut fx = Effects::new();
        if restored.write_back {
            emit(
                &mut fx,
                Effect::Persist {
                    key: KEY_AUTO_POWER_OFF,
                    value: restored.setting.index(),
                },
            );
        }
        emit(&mut fx, Effect::SetBrightness(BRIGHTNESS_ACTIVE));
        let (text, color) = status::banner(false);
        draw(&mut fx, Line::Banner, text, color);
        draw(&mut fx, Line::Legend, status::legend(profile.chords), Color::Green);
        let (text, color) = status::mode_status(&session.modes);
        draw(&mut fx, Line::Status, text, color);
        clear(&mut fx, Line::Notice);
        clear(&mut fx, Line::Modifiers);
        clear(&mut fx, Line::Sent);

        info!("Session: booted, auto power-off {:?}", restored.setting);
        (session, fx)
    }

    pub fn modes(&self) -> &ModeState {
        &self.modes
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    pub fn last_report(&self) -> Option<&KeyboardReport> {
        self.last_report.as_ref()
    }

    pub fn link_connected(&self) -> bool {
        self.link.connected
    }

    /// Process one scanner tick.
    pub fn tick(&mut self, snapshot: &KeySnapshot, now_ms: u64) -> Effects {
        let mut fx = Effects::new();
        if self.power.state() == PowerState::PoweredOff {
            return fx;
        }

        if snapshot.changed {
            if let Some(event) = self.power.activity(now_ms) {
                self.power_effects(event, &mut fx);
            }
            if snapshot.held {
                self.key_down(snapshot, &mut fx);
            } else {
                self.key_up(&mut fx);
            }
        } else if snapshot.held {
            self.repeat(&mut fx);
        }

        if let Some(event) = self.power.tick(now_ms) {
            self.power_effects(event, &mut fx);
        }
        fx
    }

    /// Non-key activity (wake button): resets the idle timer only.
    pub fn wake(&mut self, now_ms: u64) -> Effects {
        let mut fx = Effects::new();
        if let Some(event) = self.power.activity(now_ms) {
            self.power_effects(event, &mut fx);
        }
        fx
    }

    /// Whether the BLE link status should be polled now.
    pub fn link_poll_due(&self, now_ms: u64) -> bool {
        self.power.state() != PowerState::PoweredOff && now_ms >= self.link.next_poll_ms
    }

    /// Feed the polled link status; redraws the banner on change.
    pub fn link_status(&mut self, connected: bool, now_ms: u64) -> Effects {
        let mut fx = Effects::new();
        self.link.next_poll_ms = now_ms + LINK_POLL_MS;
        if connected != self.link.connected {
            info!("Session: BLE link {}", if connected { "up" } else { "down" });
            self.link.connected = connected;
            let (text, color) = status::banner(connected);
            draw(&mut fx, Line::Banner, text, color);
        }
        fx
    }

    fn key_down(&mut self, snapshot: &KeySnapshot, fx: &mut Effects) {
        if let Some(action) = match_chord(self.profile.chords, snapshot) {
            self.chord(action, fx);
            return;
        }
        self.chord_latched = false;

        let modifier = modifier_bits(&snapshot.flags);
        draw(fx, Line::Modifiers, modifier_label(&snapshot.flags), Color::White);

        let keys = map_keys(&self.profile, &self.modes, snapshot);
        let report = assemble(modifier, &keys);
        debug!("Report: {:?}", report);
        emit(fx, Effect::SendReport(report));
        self.last_report = Some(report);

        draw(fx, Line::Sent, sent_label(&report, &keys), Color::White);
        emit(fx, Effect::Pause { ms: SEND_PACING_MS });
    }

    fn chord(&mut self, action: ModeAction, fx: &mut Effects) {
        info!("Chord: {:?}", action);
        self.modes.apply(action);
        self.chord_latched = true;

        match action {
            ModeAction::ToggleCapsLock if self.profile.sync_host_caps_lock => {
                emit(fx, Effect::TapKey(usage::CAPS_LOCK));
            }
            ModeAction::CycleAutoPowerOff => {
                let step = self.modes.auto_power_off;
                self.power.set_auto_off(step.duration_ms());
                emit(
                    fx,
                    Effect::Persist {
                        key: KEY_AUTO_POWER_OFF,
                        value: step.index(),
                    },
                );
            }
            _ => {}
        }

        let (text, color) = status::mode_status(&self.modes);
        draw(fx, Line::Status, text, color);
        emit(fx, Effect::Pause { ms: CHORD_DEBOUNCE_MS });
        emit(fx, Effect::ReleaseModifiers(modifier::ALL_LEFT));
        if let Some(report) = self.last_report.as_mut() {
            report.modifier = 0;
        }
        clear(fx, Line::Modifiers);
    }

    fn key_up(&mut self, fx: &mut Effects) {
        emit(fx, Effect::ReleaseAll);
        clear(fx, Line::Modifiers);
        self.last_report = None;
        self.chord_latched = false;
    }

    fn repeat(&mut self, fx: &mut Effects) {
        if self.chord_latched || !self.profile.repeat_while_held {
            return;
        }
        if let Some(report) = self.last_report {
            emit(fx, Effect::SendReport(report));
        }
    }

    fn power_effects(&mut self, event: PowerEvent, fx: &mut Effects) {
        match event {
            PowerEvent::Woke { from } => {
                emit(fx, Effect::SetBrightness(BRIGHTNESS_ACTIVE));
                if from == PowerState::Warning {
                    clear(fx, Line::Notice);
                }
            }
            PowerEvent::Dimmed => emit(fx, Effect::SetBrightness(BRIGHTNESS_DIMMED)),
            PowerEvent::WarningStarted => {
                emit(fx, Effect::SetBrightness(BRIGHTNESS_DIMMED));
                draw(fx, Line::Notice, line_text(status::SLEEP_WARNING), Color::Yellow);
            }
            PowerEvent::Blink { visible } => {
                let text = if visible {
                    line_text(status::SLEEP_WARNING)
                } else {
                    LineText::new()
                };
                draw(fx, Line::Notice, text, Color::Yellow);
            }
            PowerEvent::PowerOff => {
                warn!("Session: auto power-off");
                emit(fx, Effect::ReleaseAll);
                self.last_report = None;
                for line in [Line::Legend, Line::Status, Line::Modifiers, Line::Sent] {
                    clear(fx, line);
                }
                draw(fx, Line::Notice, line_text(status::POWER_OFF), Color::Red);
                emit(fx, Effect::Pause { ms: POWER_OFF_MESSAGE_MS });
                emit(fx, Effect::Pause { ms: POWER_OFF_GRACE_MS });
                emit(fx, Effect::PowerOff);
            }
        }
    }
}
