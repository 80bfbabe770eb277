//! Wake button with async debouncing.
//!
//! One physical button (active-low with internal pull-up). A press resets
//! the idle countdown without typing anything.

use cardkey::config::BUTTON_DEBOUNCE_MS;
use defmt::info;
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

/// Raised on every debounced press; consumed by the keyboard loop.
pub static WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Run the wake button polling loop.
///
/// Waits for the pin to go low (pressed), debounces, raises [`WAKE`],
/// then waits for release before repeating.
pub async fn wake_button_task(pin: AnyPin) -> ! {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        // Wait for falling edge (button press, active-low).
        btn.wait_for_falling_edge().await;

        // Debounce: wait and re-check.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            info!("Button: wake");
            WAKE.signal(());

            // Wait for release to avoid repeat triggers.
            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}
