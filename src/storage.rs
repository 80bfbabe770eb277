//! Persistent settings on the nRF52840's internal flash.
//!
//! Uses the `sequential-storage` map over the SoftDevice flash driver.
//! Each setting is one `u8` value under a `u8` key; the pages are managed
//! by `sequential-storage`, which handles wear levelling and GC.

use cardkey::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use cardkey::{Error, SettingsStore};
use defmt::{debug, error};
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, store_item};

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

/// Scratch buffer for one key/value item plus headers.
const ITEM_BUF_SIZE: usize = 32;

/// Byte settings backed by a NOR flash region.
pub struct FlashSettings<F> {
    flash: F,
}

impl<F: NorFlash> FlashSettings<F> {
    pub fn new(flash: F) -> Self {
        Self { flash }
    }
}

impl<F: NorFlash> SettingsStore for FlashSettings<F> {
    async fn get_byte(&mut self, key: u8) -> Result<Option<u8>, Error> {
        let mut buf = [0u8; ITEM_BUF_SIZE];
        match fetch_item::<u8, u8, _>(
            &mut self.flash,
            STORAGE_START..STORAGE_END,
            &mut NoCache::new(),
            &mut buf,
            &key,
        )
        .await
        {
            Ok(value) => {
                debug!("Settings: key {=u8:#x} -> {:?}", key, value);
                Ok(value)
            }
            Err(e) => {
                error!("Flash read error: {:?}", defmt::Debug2Format(&e));
                Err(Error::Storage)
            }
        }
    }

    async fn set_byte(&mut self, key: u8, value: u8) -> Result<(), Error> {
        let mut buf = [0u8; ITEM_BUF_SIZE];
        store_item::<u8, u8, _>(
            &mut self.flash,
            STORAGE_START..STORAGE_END,
            &mut NoCache::new(),
            &mut buf,
            &key,
            &value,
        )
        .await
        .map_err(|e| {
            error!("Flash write error: {:?}", defmt::Debug2Format(&e));
            Error::Storage
        })?;
        debug!("Settings: key {=u8:#x} <- {}", key, value);
        Ok(())
    }
}
