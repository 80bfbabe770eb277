//! Advertising and the per-connection report pump.

use cardkey::config::{
    BLE_ADV_INTERVAL, BLE_APPEARANCE_KEYBOARD, BLE_DEVICE_NAME, BLE_READVERTISE_DELAY_MS,
};
use defmt::{info, warn};
use embassy_futures::select::select;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::advertisement_builder::{
    AdvertisementDataType, Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload,
};
use nrf_softdevice::ble::{gatt_server, peripheral, Connection, SecurityMode};
use nrf_softdevice::Softdevice;

use super::bonder::Bonder;
use super::hid_service::HidServer;
use super::{set_link_up, REPORTS};

/// 16-bit HID service UUID, little endian.
const HID_SERVICE_UUID: [u8; 2] = [0x12, 0x18];

const APPEARANCE_KEYBOARD: [u8; 2] = BLE_APPEARANCE_KEYBOARD.to_le_bytes();

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .raw(AdvertisementDataType::INCOMPLETE_16_SERVICE_LIST, &HID_SERVICE_UUID)
    .raw(AdvertisementDataType::APPEARANCE, &APPEARANCE_KEYBOARD)
    .full_name(BLE_DEVICE_NAME)
    .build();

static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .raw(AdvertisementDataType::COMPLETE_16_SERVICE_LIST, &HID_SERVICE_UUID)
    .build();

/// Advertise, serve one host until it leaves, repeat.
///
/// `bonder` outlives every advertising round, so bonds survive reconnects.
pub async fn run(
    sd: &'static Softdevice,
    server: &'static HidServer,
    bonder: &'static Bonder,
) -> ! {
    loop {
        let config = peripheral::Config {
            interval: BLE_ADV_INTERVAL,
            ..Default::default()
        };
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };

        info!("BLE: advertising as {}", BLE_DEVICE_NAME);
        let conn = match peripheral::advertise_pairable(sd, adv, &config, bonder).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("BLE: advertising failed: {:?}", e);
                Timer::after(Duration::from_millis(BLE_READVERTISE_DELAY_MS)).await;
                continue;
            }
        };

        info!("BLE: host connected");
        select(
            gatt_server::run(&conn, server, |_| {}),
            forward_reports(&conn, server),
        )
        .await;

        set_link_up(false);
        REPORTS.clear();
        info!("BLE: host disconnected");
        Timer::after(Duration::from_millis(BLE_READVERTISE_DELAY_MS)).await;
    }
}

/// Hosts pair on their own when they first read a protected attribute;
/// reports are only forwarded once that has happened.
async fn wait_for_secure_link(conn: &Connection) {
    loop {
        match conn.security_mode() {
            SecurityMode::NoAccess | SecurityMode::Open => {
                Timer::after(Duration::from_millis(200)).await
            }
            _ => return,
        }
    }
}

async fn forward_reports(conn: &Connection, server: &HidServer) -> ! {
    wait_for_secure_link(conn).await;
    info!("BLE: link secured");
    // Reports queued before the host subscribed are stale.
    REPORTS.clear();
    set_link_up(true);

    loop {
        let report = REPORTS.receive().await;
        if let Err(e) = server.notify_report(conn, &report) {
            warn!("BLE: notify failed: {:?}", e);
        }
    }
}
