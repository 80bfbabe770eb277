//! HID-over-GATT service (HOGP) for a single boot-compatible keyboard.
//!
//! Characteristics:
//!
//! | UUID   | Purpose            | Properties            |
//! |--------|--------------------|-----------------------|
//! | 0x2A4A | HID Information    | read                  |
//! | 0x2A4B | Report Map         | read                  |
//! | 0x2A4C | HID Control Point  | write without resp.   |
//! | 0x2A4E | Protocol Mode      | read, write w/o resp. |
//! | 0x2A4D | Input Report       | read, notify (+2908)  |
//! | 0x2A4D | Output Report      | read, write (+2908)   |

use cardkey::hid::keyboard::{KEYBOARD_REPORT_DESCRIPTOR, KEYBOARD_REPORT_SIZE};
use cardkey::hid::KeyboardReport;
use defmt::{debug, info};
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{self, NotifyValueError, RegisterError, WriteOp};
use nrf_softdevice::ble::{Connection, SecurityMode, Uuid};
use nrf_softdevice::Softdevice;

const HID_SERVICE: Uuid = Uuid::new_16(0x1812);
const HID_INFORMATION: Uuid = Uuid::new_16(0x2A4A);
const HID_REPORT_MAP: Uuid = Uuid::new_16(0x2A4B);
const HID_CONTROL_POINT: Uuid = Uuid::new_16(0x2A4C);
const HID_REPORT: Uuid = Uuid::new_16(0x2A4D);
const HID_PROTOCOL_MODE: Uuid = Uuid::new_16(0x2A4E);
const REPORT_REFERENCE: Uuid = Uuid::new_16(0x2908);

/// bcdHID 1.11, country 0, flags: remote wake + normally connectable.
const HID_INFO_VALUE: [u8; 4] = [0x11, 0x01, 0x00, 0x03];

/// Report protocol.
const PROTOCOL_MODE_REPORT: u8 = 0x01;

/// Report reference: no report ID, input (1) / output (2).
const INPUT_REPORT_REF: [u8; 2] = [0x00, 0x01];
const OUTPUT_REPORT_REF: [u8; 2] = [0x00, 0x02];

pub struct HidServer {
    input_report: u16,
    output_report: u16,
    control_point: u16,
}

impl HidServer {
    pub fn new(sd: &mut Softdevice) -> Result<Self, RegisterError> {
        let mut service = ServiceBuilder::new(sd, HID_SERVICE)?;

        service
            .add_characteristic(
                HID_INFORMATION,
                Attribute::new(&HID_INFO_VALUE[..]).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().read()),
            )?
            .build();

        service
            .add_characteristic(
                HID_REPORT_MAP,
                Attribute::new(KEYBOARD_REPORT_DESCRIPTOR).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().read()),
            )?
            .build();

        let control_point = service
            .add_characteristic(
                HID_CONTROL_POINT,
                Attribute::new(&[0u8][..]).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().write_without_response()),
            )?
            .build();

        service
            .add_characteristic(
                HID_PROTOCOL_MODE,
                Attribute::new(&[PROTOCOL_MODE_REPORT][..]).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().read().write_without_response()),
            )?
            .build();

        let mut input = service.add_characteristic(
            HID_REPORT,
            Attribute::new(&[0u8; KEYBOARD_REPORT_SIZE][..]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read().notify()),
        )?;
        input.add_descriptor(
            REPORT_REFERENCE,
            Attribute::new(&INPUT_REPORT_REF[..]).security(SecurityMode::JustWorks),
        )?;
        let input_report = input.build();

        let mut output = service.add_characteristic(
            HID_REPORT,
            Attribute::new(&[0u8][..]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read().write().write_without_response()),
        )?;
        output.add_descriptor(
            REPORT_REFERENCE,
            Attribute::new(&OUTPUT_REPORT_REF[..]).security(SecurityMode::JustWorks),
        )?;
        let output_report = output.build();

        let _ = service.build();
        info!("BLE: HID service registered");

        Ok(Self {
            input_report: input_report.value_handle,
            output_report: output_report.value_handle,
            control_point: control_point.value_handle,
        })
    }

    /// Notify the host of a new input report.
    pub fn notify_report(
        &self,
        conn: &Connection,
        report: &KeyboardReport,
    ) -> Result<(), NotifyValueError> {
        gatt_server::notify_value(conn, self.input_report, &report.to_bytes())
    }
}

impl gatt_server::Server for HidServer {
    type Event = ();

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        _op: WriteOp,
        _offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        if handle == self.output_report {
            // Host LED state (num/caps/scroll lock). The device keeps its
            // own caps-lock mode, so this is informational only.
            debug!("HID: host LEDs {=[u8]:#x}", data);
        } else if handle == self.control_point {
            debug!("HID: control point {=[u8]:#x}", data);
        }
        None
    }
}
