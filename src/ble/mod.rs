//! Bluetooth Low Energy module
//!
//! Static trouble-host GATT server for the configuration profile and the
//! transport adapter the profile drives it through.

pub mod service;
pub mod transport;

pub use service::ConfigServer;
pub use transport::TroubleTransport;
