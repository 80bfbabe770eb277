//! Hardware seams and the async driver that applies session effects.
//!
//! The [`Keyboard`] driver is the only place where [`Effect`]s turn into
//! calls on real collaborators. Collaborator errors never escape: each one
//! is logged and the loop carries on.

use embedded_hal_async::delay::DelayNs;

use crate::engine::profile::Profile;
use crate::engine::{Effect, Effects, Session};
use crate::error::Error;
use crate::hid::KeyboardReport;
use crate::keys::KeySnapshot;
use crate::power::IdleConfig;
use crate::settings::KEY_AUTO_POWER_OFF;
use crate::ui::{Color, Line};

/// Outgoing HID link.
///
/// Calls on a disconnected link must be accepted; returning
/// [`Error::Disconnected`] is fine and only gets logged.
pub trait HidTransport {
    fn send_report(&mut self, report: &KeyboardReport) -> Result<(), Error>;
    /// Press and release `usage` as a standalone key stroke.
    fn tap_key(&mut self, usage: u8) -> Result<(), Error>;
    /// Release the modifier bits in `mask`.
    fn release_modifiers(&mut self, mask: u8) -> Result<(), Error>;
    fn release_all(&mut self) -> Result<(), Error>;
    fn is_connected(&self) -> bool;
}

/// Six-line status display.
pub trait StatusDisplay {
    fn draw_line(&mut self, line: Line, text: &str, color: Color) -> Result<(), Error>;
    /// Backlight or contrast level, 0..=255.
    fn set_brightness(&mut self, level: u8) -> Result<(), Error>;
}

/// Byte-keyed non-volatile settings.
#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    async fn get_byte(&mut self, key: u8) -> Result<Option<u8>, Error>;
    async fn set_byte(&mut self, key: u8, value: u8) -> Result<(), Error>;
}

pub trait PowerControl {
    /// Cut power. May return on hardware that cannot switch itself off.
    fn power_off(&mut self);
}

/// Ties a [`Session`] to its collaborators.
pub struct Keyboard<T, D, S, P, W> {
    session: Session,
    transport: T,
    display: D,
    store: S,
    power: P,
    delay: W,
}

impl<T, D, S, P, W> Keyboard<T, D, S, P, W>
where
    T: HidTransport,
    D: StatusDisplay,
    S: SettingsStore,
    P: PowerControl,
    W: DelayNs,
{
    /// Read settings, start the session and draw the first screen.
    #[allow(clippy::too_many_arguments)]
    pub async fn boot(
        profile: Profile,
        idle: IdleConfig,
        transport: T,
        display: D,
        mut store: S,
        power: P,
        delay: W,
        now_ms: u64,
    ) -> Self {
        let stored = store.get_byte(KEY_AUTO_POWER_OFF).await;
        let (session, effects) = Session::boot(profile, idle, stored, now_ms);
        let mut keyboard = Self {
            session,
            transport,
            display,
            store,
            power,
            delay,
        };
        keyboard.apply(effects).await;
        keyboard
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn delay(&self) -> &W {
        &self.delay
    }

    /// One loop iteration: link poll when due, then the scanner tick.
    pub async fn step(&mut self, snapshot: &KeySnapshot, now_ms: u64) {
        if self.session.link_poll_due(now_ms) {
            let connected = self.transport.is_connected();
            let effects = self.session.link_status(connected, now_ms);
            self.apply(effects).await;
        }

        let effects = self.session.tick(snapshot, now_ms);
        self.apply(effects).await;
    }

    /// Wake button pressed.
    pub async fn wake(&mut self, now_ms: u64) {
        let effects = self.session.wake(now_ms);
        self.apply(effects).await;
    }

    async fn apply(&mut self, effects: Effects) {
        for effect in effects {
            self.perform(effect).await;
        }
    }

    async fn perform(&mut self, effect: Effect) {
        let result = match effect {
            Effect::SendReport(report) => self.transport.send_report(&report),
            Effect::TapKey(usage) => self.transport.tap_key(usage),
            Effect::ReleaseModifiers(mask) => self.transport.release_modifiers(mask),
            Effect::ReleaseAll => self.transport.release_all(),
            Effect::DrawLine { line, text, color } => {
                self.display.draw_line(line, text.as_str(), color)
            }
            Effect::SetBrightness(level) => self.display.set_brightness(level),
            Effect::Persist { key, value } => self.store.set_byte(key, value).await,
            Effect::Pause { ms } => {
                self.delay.delay_ms(ms).await;
                Ok(())
            }
            Effect::PowerOff => {
                info!("Powering off");
                self.power.power_off();
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("Effect failed: {:?}", e);
        }
    }
}
