//! Integrity-checked persistence of the configuration record
//!
//! Stores exactly one [`ConfigRecord`] at offset 0 of an EEPROM area. A
//! record is only handed back when its checksum matches; anything else is
//! reported as "no valid data" so the caller keeps its defaults.

use crate::config::record::{MAGIC_ID, RECORD_SIZE};
use crate::config::storage::RECORD_OFFSET;
use crate::record::ConfigRecord;
use crate::storage::traits::{Eeprom, StorageError};

/// Result of a successful storage access during load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Checksum matched; the record exactly as saved, checksum included
    Restored(ConfigRecord),
    /// No valid record stored; keep the default record untouched
    NoValidData,
}

/// Durable store for one configuration record
pub struct ConfigStore<E> {
    eeprom: E,
    /// Declared size of the storage area in bytes
    area_size: usize,
}

impl<E: Eeprom> ConfigStore<E> {
    pub fn new(eeprom: E, area_size: usize) -> Self {
        Self { eeprom, area_size }
    }

    /// Read the record and verify its checksum.
    ///
    /// The magic ID is not checked; only the checksum gates validity.
    pub fn load(&mut self) -> Result<LoadOutcome, StorageError> {
        self.open()?;

        let mut bytes = [0u8; RECORD_SIZE];
        self.eeprom.read(RECORD_OFFSET, &mut bytes)?;
        let record = ConfigRecord::from_bytes(&bytes);

        if record.has_valid_checksum() {
            log::info!("Store: restored configuration '{}'", record.device_name());
            Ok(LoadOutcome::Restored(record))
        } else {
            log::info!("Store: no valid configuration stored");
            Ok(LoadOutcome::NoValidData)
        }
    }

    /// Seal `record` with a fresh checksum, write it and commit.
    ///
    /// The checksum field of `record` is updated in place.
    pub fn save(&mut self, record: &mut ConfigRecord) -> Result<(), StorageError> {
        self.open()?;

        record.seal();
        self.eeprom.write(RECORD_OFFSET, &record.to_bytes())?;
        self.eeprom.commit()?;

        log::info!("Store: configuration saved (crc {:#010x})", record.crc32);
        Ok(())
    }

    /// Overwrite the record with the erased pattern so the next load reports
    /// no valid data.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.open()?;

        self.eeprom.write(RECORD_OFFSET, &[0xFF; RECORD_SIZE])?;
        self.eeprom.commit()?;

        log::info!("Store: configuration cleared");
        Ok(())
    }

    /// Release the underlying storage
    pub fn into_inner(self) -> E {
        self.eeprom
    }

    fn open(&mut self) -> Result<(), StorageError> {
        if self.area_size < RECORD_OFFSET + RECORD_SIZE {
            log::warn!(
                "Store: area of {} bytes cannot hold a {} byte record",
                self.area_size,
                RECORD_SIZE
            );
            return Err(StorageError::AreaTooSmall);
        }
        self.eeprom.begin(self.area_size)
    }
}

/// Save handler for the profile: stamp the magic ID on a captured record and
/// persist it. A missing capture leaves storage untouched.
pub fn persist_capture<E: Eeprom>(store: &mut ConfigStore<E>, captured: Option<&ConfigRecord>) {
    match captured {
        Some(captured) => {
            let mut rec = *captured;
            rec.magic_id = MAGIC_ID;
            if let Err(e) = store.save(&mut rec) {
                log::error!("Store: save failed: {:?}", e);
            }
        }
        None => log::warn!("Store: save requested, nothing captured"),
    }
}
