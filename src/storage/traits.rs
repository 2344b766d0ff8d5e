//! Non-volatile storage trait for abstraction and testability
//!
//! Mirrors the begin/get/put/commit contract of an EEPROM area of fixed
//! size, allowing the flash-backed implementation to be swapped with a mock
//! for testing.

/// Errors that can occur during storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Declared area is empty or too small for the requested data
    AreaTooSmall,
    /// Storage medium could not be opened or accessed
    Unavailable,
    /// Access outside the declared area
    OutOfBounds,
    /// Area used before `begin`
    NotInitialised,
    /// Commit to the medium failed
    CommitFailed,
}

/// Abstract EEPROM-style storage area
pub trait Eeprom {
    /// Open the area with the given size in bytes
    fn begin(&mut self, size: usize) -> Result<(), StorageError>;

    /// Read `buf.len()` bytes starting at `offset`
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `offset`. Not durable until [`Eeprom::commit`].
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;

    /// Flush pending writes to the medium
    fn commit(&mut self) -> Result<(), StorageError>;
}
