//! EEPROM emulation on wear-levelled NOR flash
//!
//! Keeps an N-byte RAM shadow of the area. `begin` loads the shadow from the
//! newest stored copy, reads and writes only touch RAM, and `commit` stores
//! the shadow as a new `sequential-storage` map item when it changed. Older
//! copies are reclaimed page by page across the whole flash range.
//!
//! The flash is driven through the async NOR flash traits; blocking drivers
//! are wrapped in an adapter and each operation is run to completion with
//! `block_on`.

use core::ops::Range;

use embassy_futures::block_on;
use embedded_storage_async::nor_flash::{MultiwriteNorFlash, NorFlash, ReadNorFlash};
use sequential_storage::cache::NoCache;
use sequential_storage::map::{self, Key, SerializationError};

use crate::storage::traits::{Eeprom, StorageError};

/// Scratch space for one map item (area bytes, key and item header)
const ITEM_BUFFER_LEN: usize = 1024;

/// Map key of the stored area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum AreaKey {
    EepromArea = 0,
}

impl Key for AreaKey {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let slot = buffer.first_mut().ok_or(SerializationError::BufferTooSmall)?;
        *slot = *self as u8;
        Ok(1)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
        match buffer.first() {
            Some(0) => Ok((AreaKey::EepromArea, 1)),
            Some(_) => Err(SerializationError::InvalidFormat),
            None => Err(SerializationError::BufferTooSmall),
        }
    }
}

/// Flash-backed EEPROM area with a RAM shadow of `N` bytes
pub struct FlashEeprom<S, const N: usize> {
    flash: S,
    /// Erase-aligned flash range owned by the map
    range: Range<u32>,
    shadow: [u8; N],
    /// Size passed to the last successful begin
    size: Option<usize>,
    dirty: bool,
}

impl<S: MultiwriteNorFlash, const N: usize> FlashEeprom<S, N> {
    pub fn new(flash: S, range: Range<u32>) -> Self {
        Self {
            flash,
            range,
            shadow: [0xFF; N],
            size: None,
            dirty: false,
        }
    }

    /// Release the underlying flash
    pub fn into_inner(self) -> S {
        self.flash
    }

    fn window(&self, offset: usize, len: usize) -> Result<Range<usize>, StorageError> {
        let size = self.size.ok_or(StorageError::NotInitialised)?;
        let end = offset.checked_add(len).ok_or(StorageError::OutOfBounds)?;
        if end > size {
            return Err(StorageError::OutOfBounds);
        }
        Ok(offset..end)
    }
}

impl<S: MultiwriteNorFlash, const N: usize> Eeprom for FlashEeprom<S, N> {
    fn begin(&mut self, size: usize) -> Result<(), StorageError> {
        if size == 0 || size > N {
            return Err(StorageError::AreaTooSmall);
        }
        if self.range.is_empty() || self.range.end as usize > self.flash.capacity() {
            log::warn!(
                "EEPROM: range {:#x}..{:#x} exceeds flash",
                self.range.start,
                self.range.end
            );
            return Err(StorageError::Unavailable);
        }

        let mut buffer = [0u8; ITEM_BUFFER_LEN];
        let fetched = block_on(map::fetch_item::<AreaKey, &[u8], _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buffer,
            &AreaKey::EepromArea,
        ));

        self.shadow[..size].fill(0xFF);
        match fetched {
            Ok(Some(stored)) => {
                let len = stored.len().min(size);
                self.shadow[..len].copy_from_slice(&stored[..len]);
            }
            Ok(None) => {}
            Err(sequential_storage::Error::Corrupted { .. }) => {
                log::warn!("EEPROM: flash range not formatted, erasing");
                block_on(self.flash.erase(self.range.start, self.range.end))
                    .map_err(|_| StorageError::Unavailable)?;
            }
            Err(e) => {
                log::warn!("EEPROM: load failed: {:?}", e);
                return Err(StorageError::Unavailable);
            }
        }

        self.size = Some(size);
        self.dirty = false;
        Ok(())
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = self.window(offset, buf.len())?;
        buf.copy_from_slice(&self.shadow[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        let range = self.window(offset, data.len())?;
        if self.shadow[range.clone()] != *data {
            self.shadow[range].copy_from_slice(data);
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        let size = self.size.ok_or(StorageError::NotInitialised)?;
        if !self.dirty {
            return Ok(());
        }

        let mut buffer = [0u8; ITEM_BUFFER_LEN];
        let area: &[u8] = &self.shadow[..size];
        block_on(map::store_item(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buffer,
            &AreaKey::EepromArea,
            &area,
        ))
        .map_err(|e| {
            log::warn!("EEPROM: commit failed: {:?}", e);
            StorageError::CommitFailed
        })?;

        self.dirty = false;
        Ok(())
    }
}
