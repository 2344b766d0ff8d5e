#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod profile;
pub mod record;
pub mod storage;

// These modules depend on embassy/esp-hal features only available with embedded feature
#[cfg(feature = "embedded")]
pub mod ble;
#[cfg(feature = "embedded")]
pub mod tasks;
