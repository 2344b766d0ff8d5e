//! Persisted configuration record
//!
//! Fixed-layout record with an integrity checksum. Serialization goes
//! through an explicit offset table so the stored format does not depend on
//! struct layout.

pub mod checksum;
pub mod layout;

pub use checksum::{calculate_crc, record_checksum};
pub use layout::{set_text, text, text_bytes, AppOptions, ConfigRecord, RecordField, WifiOpMode};
