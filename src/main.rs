//! cardkey firmware entry point (nRF52840 + SoftDevice S140).
//!
//! Tasks:
//!   - `softdevice_task`  - runs the SoftDevice event loop
//!   - `ble_task`         - advertising, bonding, report notifications
//!   - `wake_button_task` - debounced wake button
//!   - `keyboard_task`    - 20 ms matrix scan + session tick
//!
//! The keyboard task is the only writer of session state.

#![no_std]
#![no_main]

mod ble;
mod buttons;
mod display;
mod matrix;
mod storage;

use cardkey::config::TICK_MS;
use cardkey::keys::layout::{MatrixScanner, HANDHELD_LAYOUT};
use cardkey::{IdleConfig, Keyboard, PowerControl, DEFAULT_PROFILE};
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pin, Pull};
use embassy_nrf::interrupt::Priority;
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, gpio::AnyPin, peripherals};
use embassy_time::{Delay, Duration, Instant, Ticker};
use nrf_softdevice::{Flash, Softdevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::ble::bonder::{self, Bonder};
use crate::ble::hid_service::HidServer;
use crate::ble::BleTransport;
use crate::buttons::WAKE;
use crate::display::OledStatus;
use crate::matrix::Matrix;
use crate::storage::FlashSettings;

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

static SERVER: StaticCell<HidServer> = StaticCell::new();

/// Enters System OFF through the SoftDevice. Only a reset wakes the chip.
struct SystemOff;

impl PowerControl for SystemOff {
    fn power_off(&mut self) {
        // SAFETY: plain SoftDevice call; does not return on success.
        let _ = unsafe { nrf_softdevice::raw::sd_power_system_off() };
    }
}

type Device = Keyboard<
    BleTransport,
    OledStatus<Twim<'static, TWISPI0>>,
    FlashSettings<Flash>,
    SystemOff,
    Delay,
>;

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(
    sd: &'static Softdevice,
    server: &'static HidServer,
    bonder: &'static Bonder,
) -> ! {
    ble::peripheral::run(sd, server, bonder).await
}

#[embassy_executor::task]
async fn wake_task(pin: AnyPin) -> ! {
    buttons::wake_button_task(pin).await
}

#[embassy_executor::task]
async fn keyboard_task(mut keyboard: Device, mut matrix: Matrix<'static>) -> ! {
    let mut scanner = MatrixScanner::new(&HANDHELD_LAYOUT);
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));

    loop {
        match select(ticker.next(), WAKE.wait()).await {
            Either::First(()) => {
                let pressed = matrix.scan().await;
                let snapshot = scanner.scan(&pressed);
                keyboard.step(&snapshot, Instant::now().as_millis()).await;
            }
            Either::Second(()) => keyboard.wake(Instant::now().as_millis()).await,
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("cardkey starting");

    // The SoftDevice reserves priorities 0, 1 and 4.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    let sd = Softdevice::enable(&ble::softdevice_config());
    let server = SERVER.init(unwrap!(HidServer::new(sd)));
    let flash = Flash::take(sd);
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(ble_task(sd, server, bonder::init())));
    unwrap!(spawner.spawn(wake_task(p.P0_11.degrade())));

    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let display = OledStatus::new(i2c);

    let row = |pin: AnyPin| Output::new(pin, Level::High, OutputDrive::Standard);
    let col = |pin: AnyPin| Input::new(pin, Pull::Up);
    let matrix = Matrix::new(
        [
            row(p.P0_02.degrade()),
            row(p.P0_03.degrade()),
            row(p.P0_04.degrade()),
            row(p.P0_05.degrade()),
        ],
        [
            col(p.P0_13.degrade()),
            col(p.P0_14.degrade()),
            col(p.P0_15.degrade()),
            col(p.P0_16.degrade()),
            col(p.P0_17.degrade()),
            col(p.P0_19.degrade()),
            col(p.P0_20.degrade()),
            col(p.P0_21.degrade()),
            col(p.P1_01.degrade()),
            col(p.P1_02.degrade()),
            col(p.P1_03.degrade()),
            col(p.P1_04.degrade()),
            col(p.P1_05.degrade()),
            col(p.P1_06.degrade()),
        ],
    );

    let keyboard = Keyboard::boot(
        DEFAULT_PROFILE,
        IdleConfig::default(),
        BleTransport::new(),
        display,
        FlashSettings::new(flash),
        SystemOff,
        Delay,
        Instant::now().as_millis(),
    )
    .await;

    unwrap!(spawner.spawn(keyboard_task(keyboard, matrix)));
}
