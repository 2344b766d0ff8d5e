//! Non-volatile storage for the configuration record

pub mod flash;
pub mod store;
pub mod traits;

pub use flash::FlashEeprom;
pub use store::{persist_capture, ConfigStore, LoadOutcome};
pub use traits::{Eeprom, StorageError};
