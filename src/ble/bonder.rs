//! Just-works bonding for host connections.
//!
//! Bonds live in RAM only; a power cycle forgets them and the host pairs
//! again on its next connect.

use core::cell::RefCell;

use cardkey::config::BLE_MAX_BONDS;
use defmt::info;
use heapless::Vec;
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{Connection, EncryptionInfo, IdentityKey, MasterId, SecurityMode};
use static_cell::StaticCell;

struct HostBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
}

pub struct Bonder {
    hosts: RefCell<Vec<HostBond, BLE_MAX_BONDS>>,
}

impl Bonder {
    fn new() -> Self {
        Self {
            hosts: RefCell::new(Vec::new()),
        }
    }
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        let mut hosts = self.hosts.borrow_mut();
        if let Some(existing) = hosts.iter_mut().find(|h| h.master_id == master_id) {
            existing.key = key;
            existing.peer_id = peer_id;
            return;
        }

        if hosts.is_full() {
            hosts.remove(0);
        }

        info!("BLE: bonded with new host ({} stored)", hosts.len() + 1);
        let _ = hosts.push(HostBond {
            master_id,
            key,
            peer_id,
        });
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.hosts
            .borrow()
            .iter()
            .find_map(|h| (h.master_id == master_id).then_some(h.key))
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }
}

static BONDER: StaticCell<Bonder> = StaticCell::new();

/// Create the bond store. Must be called exactly once, from `main`; the
/// cell panics on a second initialisation.
pub fn init() -> &'static Bonder {
    BONDER.init(Bonder::new())
}
