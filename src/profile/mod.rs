//! BLE configuration profile
//!
//! Maps the persisted record onto three GATT services and drives the
//! connection, liveness and save/restart behaviour through an abstract
//! transport.

pub mod controller;
pub mod error;
pub mod fields;
pub mod gatt;
pub mod handlers;
pub mod transport;
pub mod uuids;

pub use controller::ConfigProfile;
pub use error::{ProfileError, SetupError};
pub use fields::LiveFieldSet;
pub use gatt::{AppDescriptors, FieldId, LAYOUT};
pub use handlers::{ConnectionObserver, NoObserver, RestartHandler, SaveConfigHandler};
pub use transport::{CharHandle, CharProps, GattTransport, ServiceId, TransportError, TransportEvent};
