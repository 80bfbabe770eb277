//! Idle tracking and auto power-off.
//!
//! States, by time since the last key transition (`elapsed`):
//!
//! ```text
//! Active     elapsed < dim_after
//! Dimmed     dim_after <= elapsed < D - warn_window
//! Warning    D - warn_window <= elapsed < D     (message blinks)
//! PoweredOff elapsed >= D                       (terminal)
//! ```
//!
//! `D` is the auto power-off duration. When auto power-off is disabled only
//! Active and Dimmed are reachable.

use crate::config::{DIM_AFTER_MS, WARN_BLINK_MS, WARN_WINDOW_MS};

/// Power state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Normal operation, full brightness.
    Active,
    /// No input for a while - display dimmed.
    Dimmed,
    /// Power-off is imminent - warning message blinks.
    Warning,
    /// Power-off has been requested. Never left.
    PoweredOff,
}

/// Idle thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdleConfig {
    pub dim_after_ms: u64,
    pub warn_window_ms: u64,
    pub blink_ms: u64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            dim_after_ms: DIM_AFTER_MS,
            warn_window_ms: WARN_WINDOW_MS,
            blink_ms: WARN_BLINK_MS,
        }
    }
}

/// Decide the power state for an idle period.
pub fn classify(elapsed_ms: u64, cfg: &IdleConfig, auto_off_ms: Option<u64>) -> PowerState {
    if let Some(off_ms) = auto_off_ms {
        if elapsed_ms >= off_ms {
            return PowerState::PoweredOff;
        }
        if elapsed_ms >= off_ms.saturating_sub(cfg.warn_window_ms) {
            return PowerState::Warning;
        }
    }

    if elapsed_ms >= cfg.dim_after_ms {
        PowerState::Dimmed
    } else {
        PowerState::Active
    }
}

/// What changed on a power tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerEvent {
    /// Input woke the device from `from`.
    Woke { from: PowerState },
    Dimmed,
    /// Warning entered; the message starts visible.
    WarningStarted,
    /// Warning message toggled.
    Blink { visible: bool },
    /// Auto power-off reached. Reported exactly once.
    PowerOff,
}

/// Power manager tracks activity and drives the idle states.
pub struct PowerManager {
    cfg: IdleConfig,
    state: PowerState,
    last_activity_ms: u64,
    auto_off_ms: Option<u64>,
    blink_visible: bool,
    next_blink_ms: u64,
}

impl PowerManager {
    /// Create a new power manager; boot counts as activity.
    pub fn new(cfg: IdleConfig, now_ms: u64, auto_off_ms: Option<u64>) -> Self {
        Self {
            cfg,
            state: PowerState::Active,
            last_activity_ms: now_ms,
            auto_off_ms,
            blink_visible: false,
            next_blink_ms: 0,
        }
    }

    /// Get current power state.
    pub fn state(&self) -> PowerState {
        self.state
    }

    #[cfg(test)]
    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    /// Change the auto power-off duration; takes effect on the next tick.
    pub fn set_auto_off(&mut self, auto_off_ms: Option<u64>) {
        self.auto_off_ms = auto_off_ms;
    }

    /// Record activity (key transition, wake button).
    pub fn activity(&mut self, now_ms: u64) -> Option<PowerEvent> {
        if self.state == PowerState::PoweredOff {
            return None;
        }

        self.last_activity_ms = self.last_activity_ms.max(now_ms);
        if self.state == PowerState::Active {
            return None;
        }

        info!("Power: waking from {:?}", self.state);
        let from = self.state;
        self.state = PowerState::Active;
        self.blink_visible = false;
        Some(PowerEvent::Woke { from })
    }

    /// Periodic tick - call once per scan loop iteration.
    pub fn tick(&mut self, now_ms: u64) -> Option<PowerEvent> {
        if self.state == PowerState::PoweredOff {
            return None;
        }

        let elapsed = now_ms.saturating_sub(self.last_activity_ms);
        let new_state = classify(elapsed, &self.cfg, self.auto_off_ms);

        if new_state == self.state {
            if new_state == PowerState::Warning && now_ms >= self.next_blink_ms {
                self.blink_visible = !self.blink_visible;
                self.next_blink_ms = now_ms + self.cfg.blink_ms;
                return Some(PowerEvent::Blink {
                    visible: self.blink_visible,
                });
            }
            return None;
        }

        info!("Power: {:?} -> {:?}", self.state, new_state);
        let previous = self.state;
        self.state = new_state;

        match new_state {
            PowerState::PoweredOff => Some(PowerEvent::PowerOff),
            PowerState::Warning => {
                self.blink_visible = true;
                self.next_blink_ms = now_ms + self.cfg.blink_ms;
                Some(PowerEvent::WarningStarted)
            }
            PowerState::Dimmed => Some(PowerEvent::Dimmed),
            // Only reachable when a longer duration was chosen mid-warning.
            PowerState::Active => Some(PowerEvent::Woke { from: previous }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60 * 1000;

    fn cfg() -> IdleConfig {
        IdleConfig::default()
    }

    #[test]
    fn classify_boundaries() {
        let d = 3 * MIN;
        let w = WARN_WINDOW_MS;
        let c = cfg();
        assert_eq!(classify(0, &c, Some(d)), PowerState::Active);
        assert_eq!(classify(DIM_AFTER_MS - 1, &c, Some(d)), PowerState::Active);
        assert_eq!(classify(DIM_AFTER_MS, &c, Some(d)), PowerState::Dimmed);
        assert_eq!(classify(d - w - 1, &c, Some(d)), PowerState::Dimmed);
        assert_eq!(classify(d - w, &c, Some(d)), PowerState::Warning);
        assert_eq!(classify(d - 1, &c, Some(d)), PowerState::Warning);
        assert_eq!(classify(d, &c, Some(d)), PowerState::PoweredOff);
        assert_eq!(classify(10 * d, &c, Some(d)), PowerState::PoweredOff);
    }

    #[test]
    fn disabled_auto_off_never_warns() {
        let c = cfg();
        assert_eq!(classify(u64::MAX / 2, &c, None), PowerState::Dimmed);
        assert_eq!(classify(1, &c, None), PowerState::Active);
    }

    #[test]
    fn warning_window_longer_than_duration_warns_from_start() {
        let c = IdleConfig {
            warn_window_ms: 10 * MIN,
            ..cfg()
        };
        assert_eq!(classify(0, &c, Some(3 * MIN)), PowerState::Warning);
    }

    #[test]
    fn walks_through_states_and_powers_off_once() {
        let d = 3 * MIN;
        let mut pm = PowerManager::new(cfg(), 1_000, Some(d));
        assert_eq!(pm.tick(1_000 + DIM_AFTER_MS), Some(PowerEvent::Dimmed));
        assert_eq!(pm.tick(1_000 + d - WARN_WINDOW_MS), Some(PowerEvent::WarningStarted));
        assert_eq!(pm.tick(1_000 + d), Some(PowerEvent::PowerOff));
        assert_eq!(pm.state(), PowerState::PoweredOff);
        assert_eq!(pm.tick(1_000 + 2 * d), None);
        assert_eq!(pm.activity(1_000 + 2 * d), None);
        assert_eq!(pm.state(), PowerState::PoweredOff);
    }

    #[test]
    fn warning_blinks_on_its_own_timer() {
        let d = 3 * MIN;
        let start = d - WARN_WINDOW_MS;
        let mut pm = PowerManager::new(cfg(), 0, Some(d));
        assert_eq!(pm.tick(start), Some(PowerEvent::WarningStarted));
        assert_eq!(pm.tick(start + 20), None);
        assert_eq!(
            pm.tick(start + WARN_BLINK_MS),
            Some(PowerEvent::Blink { visible: false })
        );
        assert_eq!(
            pm.tick(start + 2 * WARN_BLINK_MS),
            Some(PowerEvent::Blink { visible: true })
        );
    }

    #[test]
    fn activity_during_warning_wakes() {
        let d = 3 * MIN;
        let mut pm = PowerManager::new(cfg(), 0, Some(d));
        pm.tick(d - 1);
        assert_eq!(pm.state(), PowerState::Warning);
        assert_eq!(
            pm.activity(d - 1),
            Some(PowerEvent::Woke {
                from: PowerState::Warning
            })
        );
        assert_eq!(pm.state(), PowerState::Active);
        assert_eq!(pm.tick(d + 1), None);
        assert_eq!(pm.last_activity_ms(), d - 1);
    }

    #[test]
    fn activity_while_active_is_silent() {
        let mut pm = PowerManager::new(cfg(), 0, Some(3 * MIN));
        assert_eq!(pm.activity(500), None);
        assert_eq!(pm.last_activity_ms(), 500);
    }

    #[test]
    fn longer_duration_during_warning_returns_to_dimmed() {
        let mut pm = PowerManager::new(cfg(), 0, Some(3 * MIN));
        pm.tick(3 * MIN - 1);
        assert_eq!(pm.state(), PowerState::Warning);
        pm.set_auto_off(Some(30 * MIN));
        assert_eq!(pm.tick(3 * MIN), Some(PowerEvent::Dimmed));
    }
}
