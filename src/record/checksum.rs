//! Record integrity checksum
//!
//! Uses CRC-32/ISO-HDLC (reflected polynomial 0xEDB88320, init 0xFFFFFFFF,
//! final complement) over the whole serialized record with the checksum
//! field zeroed. Saving and verifying both zero the field first.

use crate::record::layout::{span, ConfigRecord, RecordField};
use crc::{Crc, CRC_32_ISO_HDLC};

const CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Calculate CRC-32/ISO-HDLC over raw bytes
pub fn calculate_crc(data: &[u8]) -> u32 {
    CRC.checksum(data)
}

/// Checksum of a record, computed with its checksum field zeroed
pub fn record_checksum(record: &ConfigRecord) -> u32 {
    let mut bytes = record.to_bytes();
    let crc_span = span(RecordField::Crc32);
    bytes[crc_span.offset..crc_span.end()].fill(0);
    calculate_crc(&bytes)
}

impl ConfigRecord {
    /// Recompute and store the checksum field
    pub fn seal(&mut self) {
        self.crc32 = 0;
        self.crc32 = record_checksum(self);
    }

    /// True if the stored checksum matches the record contents
    pub fn has_valid_checksum(&self) -> bool {
        self.crc32 == record_checksum(self)
    }
}
