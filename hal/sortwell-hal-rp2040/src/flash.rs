//! Config partition reader
//!
//! The last 64 KiB of the 2 MiB flash hold a sequential-storage map keyed
//! by [`StorageKey`]. `memory.x` ends the firmware image before it.

use core::ops::Range;

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use sortwell_hal::flash::{FlashError, StorageKey};

pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Config partition, as flash offsets
pub const CONFIG_RANGE: Range<u32> = (FLASH_SIZE as u32 - 64 * 1024)..FLASH_SIZE as u32;

/// Largest stored item, key included
pub const MAX_ITEM_SIZE: usize = 4096;

pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    scratch: [u8; MAX_ITEM_SIZE],
}

impl<'d> Rp2040FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
            scratch: [0; MAX_ITEM_SIZE],
        }
    }
}

impl sortwell_hal::FlashStorage for Rp2040FlashStorage<'_> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let item = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut self.scratch,
            &key,
        )
        .await
        .map_err(|_| FlashError::Storage)?
        .ok_or(FlashError::NotFound)?;

        let out = buffer
            .get_mut(..item.len())
            .ok_or(FlashError::BufferTooSmall)?;
        out.copy_from_slice(item);
        Ok(item.len())
    }
}
