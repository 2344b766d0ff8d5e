//! GATT transport trait for abstraction and testability
//!
//! The narrow create/read/write/notify contract the profile drives. The
//! trouble-host adapter implements it on the device; a mock implements it
//! for host tests.

use bitflags::bitflags;
use core::future::Future;

/// Identifier of a service created on the transport
pub type ServiceId = u16;

/// Identifier of a characteristic value created on the transport
pub type CharHandle = u16;

/// Errors that can occur during transport operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Service could not be created or started
    ServiceUnavailable,
    /// Characteristic could not be created
    CharacteristicUnavailable,
    /// Handle does not name a characteristic of this transport
    UnknownHandle,
    /// Attribute is not supported by this transport
    Unsupported,
    /// Value does not fit the attribute
    ValueTooLong,
    /// Operation needs a connected client
    NotConnected,
    /// Notification could not be delivered
    NotifyFailed,
    /// Advertising could not be started
    AdvertisingFailed,
}

bitflags! {
    /// Access flags of a characteristic
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CharProps: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const NOTIFY = 1 << 2;
    }
}

/// Event delivered by the transport, in order, on the profile's thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// A client connected
    Connected,
    /// The client disconnected
    Disconnected,
    /// The client wrote a characteristic value
    Written(CharHandle),
}

/// Abstract GATT server interface for testability
pub trait GattTransport {
    /// Create a service reserving `num_handles` attribute handles
    fn create_service(&mut self, uuid: u128, num_handles: u16) -> Result<ServiceId, TransportError>;

    /// Create a characteristic inside `service`
    fn create_characteristic(
        &mut self,
        service: ServiceId,
        uuid: u128,
        props: CharProps,
    ) -> Result<CharHandle, TransportError>;

    /// Attach a read-only descriptor to a characteristic
    fn add_descriptor(
        &mut self,
        characteristic: CharHandle,
        uuid: u128,
        value: &[u8],
    ) -> Result<(), TransportError>;

    /// Make a service visible to clients
    fn start_service(&mut self, service: ServiceId) -> Result<(), TransportError>;

    /// Replace the raw value of a characteristic
    fn set_value(&mut self, characteristic: CharHandle, value: &[u8]) -> Result<(), TransportError>;

    /// Copy the raw value of a characteristic into `buf`, returning its length
    fn value(&self, characteristic: CharHandle, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Notify the connected client of the current value
    fn notify(&mut self, characteristic: CharHandle) -> impl Future<Output = Result<(), TransportError>>;

    /// Start advertising under `name`
    fn start_advertising(&mut self, name: &str) -> Result<(), TransportError>;
}
