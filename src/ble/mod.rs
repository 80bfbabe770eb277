//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **HID service** - HID-over-GATT keyboard the host subscribes to.
//! 2. **Peripheral task** - advertises, accepts one host, waits for the
//!    link to be secured and forwards queued reports as notifications.
//! 3. **Transport** - [`BleTransport`], the keyboard loop's side of the
//!    report queue.
//!
//! The keyboard loop never touches the SoftDevice directly; reports cross
//! tasks through [`REPORTS`] and link status through an atomic flag.

pub mod bonder;
pub mod hid_service;
pub mod peripheral;

use core::mem;
use core::sync::atomic::{AtomicBool, Ordering};

use cardkey::config::{BLE_DEVICE_NAME, BLE_REPORT_QUEUE};
use cardkey::{Error, HidTransport, KeyboardReport};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use nrf_softdevice::raw;

pub type ReportChannel = Channel<CriticalSectionRawMutex, KeyboardReport, BLE_REPORT_QUEUE>;

/// Reports waiting to be notified to the host.
pub static REPORTS: ReportChannel = Channel::new();

static LINK_UP: AtomicBool = AtomicBool::new(false);

/// A host is connected and the link is encrypted.
pub fn link_up() -> bool {
    LINK_UP.load(Ordering::Relaxed)
}

fn set_link_up(up: bool) {
    LINK_UP.store(up, Ordering::Relaxed);
}

/// SoftDevice configuration: one peripheral link, no central role.
pub fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 64 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: BLE_DEVICE_NAME.as_ptr() as _,
            current_len: BLE_DEVICE_NAME.len() as u16,
            max_len: BLE_DEVICE_NAME.len() as u16,
            // SAFETY: all-zero is "no write access" for the permission bitfield.
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// Keyboard-loop side of the BLE link.
///
/// Tracks what the host currently holds so standalone taps and modifier
/// releases can be expressed as full reports.
pub struct BleTransport {
    reports: &'static ReportChannel,
    held: KeyboardReport,
}

impl BleTransport {
    pub fn new() -> Self {
        Self {
            reports: &REPORTS,
            held: KeyboardReport::empty(),
        }
    }

    fn queue(&self, report: KeyboardReport) -> Result<(), Error> {
        if !link_up() {
            return Err(Error::Disconnected);
        }
        self.reports
            .try_send(report)
            .map_err(|_| Error::BufferOverflow)
    }
}

impl HidTransport for BleTransport {
    fn send_report(&mut self, report: &KeyboardReport) -> Result<(), Error> {
        self.held = *report;
        self.queue(*report)
    }

    fn tap_key(&mut self, usage: u8) -> Result<(), Error> {
        self.queue(KeyboardReport::single(usage))?;
        self.queue(self.held)
    }

    fn release_modifiers(&mut self, mask: u8) -> Result<(), Error> {
        if self.held.modifier & mask == 0 {
            return Ok(());
        }
        self.held.modifier &= !mask;
        self.queue(self.held)
    }

    fn release_all(&mut self) -> Result<(), Error> {
        self.held = KeyboardReport::empty();
        self.queue(self.held)
    }

    fn is_connected(&self) -> bool {
        link_up()
    }
}
