//! `GattTransport` adapter over the trouble-host attribute server
//!
//! The attribute table is static, so "creating" a service or characteristic
//! resolves its UUID to the handle the server already assigned. Descriptors
//! are accepted only when the table already declares them with that value.

use heapless::String;
use trouble_host::prelude::*;

use crate::ble::service::{ConfigServer, STATIC_DESCRIPTORS};
use crate::config::record::DEVICE_NAME_LEN;
use crate::profile::transport::{CharHandle, CharProps, GattTransport, ServiceId, TransportError};
use crate::profile::uuids::{attribute_uuid, descriptor_index_of, group_of};
use crate::profile::LAYOUT;

/// Run `$body` with `$ch` bound to the characteristic behind `$handle`
macro_rules! with_characteristic {
    ($server:expr, $handle:expr, $ch:ident => $body:expr) => {{
        let server = $server;
        let handle = $handle;
        let device = &server.device;
        let network = &server.network;
        let runtime = &server.runtime;
        if handle == device.device_type.handle {
            let $ch = &device.device_type;
            $body
        } else if handle == device.tick_count.handle {
            let $ch = &device.tick_count;
            $body
        } else if handle == device.device_name.handle {
            let $ch = &device.device_name;
            $body
        } else if handle == device.save_config.handle {
            let $ch = &device.save_config;
            $body
        } else if handle == device.restart_device.handle {
            let $ch = &device.restart_device;
            $body
        } else if handle == network.wifi_ssid.handle {
            let $ch = &network.wifi_ssid;
            $body
        } else if handle == network.wifi_passwd.handle {
            let $ch = &network.wifi_passwd;
            $body
        } else if handle == network.wifi_own_addr.handle {
            let $ch = &network.wifi_own_addr;
            $body
        } else if handle == network.wifi_own_mode.handle {
            let $ch = &network.wifi_own_mode;
            $body
        } else if handle == runtime.option_1.handle {
            let $ch = &runtime.option_1;
            $body
        } else if handle == runtime.option_2.handle {
            let $ch = &runtime.option_2;
            $body
        } else if handle == runtime.option_3.handle {
            let $ch = &runtime.option_3;
            $body
        } else if handle == runtime.option_4.handle {
            let $ch = &runtime.option_4;
            $body
        } else if handle == runtime.option_5.handle {
            let $ch = &runtime.option_5;
            $body
        } else if handle == runtime.option_6.handle {
            let $ch = &runtime.option_6;
            $body
        } else if handle == runtime.option_7.handle {
            let $ch = &runtime.option_7;
            $body
        } else if handle == runtime.option_8.handle {
            let $ch = &runtime.option_8;
            $body
        } else if handle == runtime.peer_addr.handle {
            let $ch = &runtime.peer_addr;
            $body
        } else {
            Err(TransportError::UnknownHandle)
        }
    }};
}

/// Profile transport backed by [`ConfigServer`]
///
/// Built once without a connection for setup, then once per connection so
/// notifications have a peer.
pub struct TroubleTransport<'a, 'v, 'st, 'sv> {
    server: &'a ConfigServer<'v>,
    conn: Option<&'a GattConnection<'st, 'sv, DefaultPacketPool>>,
    advertised_name: String<DEVICE_NAME_LEN>,
}

impl<'a, 'v, 'st, 'sv> TroubleTransport<'a, 'v, 'st, 'sv> {
    pub fn new(server: &'a ConfigServer<'v>) -> Self {
        Self {
            server,
            conn: None,
            advertised_name: String::new(),
        }
    }

    pub fn connected(
        server: &'a ConfigServer<'v>,
        conn: &'a GattConnection<'st, 'sv, DefaultPacketPool>,
    ) -> Self {
        Self {
            server,
            conn: Some(conn),
            advertised_name: String::new(),
        }
    }

    /// Name requested by the last `start_advertising`
    pub fn advertised_name(&self) -> &str {
        &self.advertised_name
    }

    fn handle_for(&self, uuid: u128) -> Option<CharHandle> {
        if uuid != attribute_uuid(group_of(uuid)) {
            return None;
        }
        let device = &self.server.device;
        let network = &self.server.network;
        let runtime = &self.server.runtime;
        let handle = match group_of(uuid) {
            0x1100 => device.device_type.handle,
            0x1200 => device.tick_count.handle,
            0x1300 => device.device_name.handle,
            0x1400 => device.save_config.handle,
            0x1500 => device.restart_device.handle,
            0x2100 => network.wifi_ssid.handle,
            0x2200 => network.wifi_passwd.handle,
            0x2300 => network.wifi_own_addr.handle,
            0x2400 => network.wifi_own_mode.handle,
            0x3100 => runtime.option_1.handle,
            0x3200 => runtime.option_2.handle,
            0x3300 => runtime.option_3.handle,
            0x3400 => runtime.option_4.handle,
            0x3500 => runtime.option_5.handle,
            0x3600 => runtime.option_6.handle,
            0x3700 => runtime.option_7.handle,
            0x3800 => runtime.option_8.handle,
            0x3900 => runtime.peer_addr.handle,
            _ => return None,
        };
        Some(handle)
    }
}

impl GattTransport for TroubleTransport<'_, '_, '_, '_> {
    fn create_service(&mut self, uuid: u128, num_handles: u16) -> Result<ServiceId, TransportError> {
        let index = LAYOUT
            .iter()
            .position(|service| service.uuid() == uuid)
            .ok_or(TransportError::ServiceUnavailable)?;
        log::debug!("BLE: service {:#06x} ({} handles)", group_of(uuid), num_handles);
        Ok(index as ServiceId)
    }

    fn create_characteristic(
        &mut self,
        service: ServiceId,
        uuid: u128,
        _props: CharProps,
    ) -> Result<CharHandle, TransportError> {
        let owner = LAYOUT
            .get(service as usize)
            .ok_or(TransportError::ServiceUnavailable)?;
        // Characteristic groups share the leading digit of their service group
        if group_of(uuid) >> 12 != owner.group >> 12 {
            return Err(TransportError::CharacteristicUnavailable);
        }
        self.handle_for(uuid).ok_or(TransportError::CharacteristicUnavailable)
    }

    fn add_descriptor(
        &mut self,
        _characteristic: CharHandle,
        uuid: u128,
        value: &[u8],
    ) -> Result<(), TransportError> {
        if descriptor_index_of(uuid) == 0 {
            return Err(TransportError::Unsupported);
        }
        STATIC_DESCRIPTORS
            .iter()
            .any(|(declared, declared_value)| *declared == uuid && *declared_value == value)
            .then_some(())
            .ok_or(TransportError::Unsupported)
    }

    fn start_service(&mut self, _service: ServiceId) -> Result<(), TransportError> {
        // Services are live as soon as the server exists
        Ok(())
    }

    fn set_value(&mut self, characteristic: CharHandle, value: &[u8]) -> Result<(), TransportError> {
        let server = self.server;
        with_characteristic!(server, characteristic, ch => {
            let mut stored = ch.get(server).map_err(|_| TransportError::UnknownHandle)?;
            if value.len() > stored.len() {
                return Err(TransportError::ValueTooLong);
            }
            stored.fill(0);
            stored[..value.len()].copy_from_slice(value);
            ch.set(server, &stored).map_err(|_| TransportError::UnknownHandle)
        })
    }

    fn value(&self, characteristic: CharHandle, buf: &mut [u8]) -> Result<usize, TransportError> {
        let server = self.server;
        with_characteristic!(server, characteristic, ch => {
            let stored = ch.get(server).map_err(|_| TransportError::UnknownHandle)?;
            let len = stored.len().min(buf.len());
            buf[..len].copy_from_slice(&stored[..len]);
            Ok(len)
        })
    }

    async fn notify(&mut self, characteristic: CharHandle) -> Result<(), TransportError> {
        let conn = self.conn.ok_or(TransportError::NotConnected)?;
        let server = self.server;
        with_characteristic!(server, characteristic, ch => {
            let stored = ch.get(server).map_err(|_| TransportError::UnknownHandle)?;
            ch.notify(conn, &stored).await.map_err(|_| TransportError::NotifyFailed)
        })
    }

    fn start_advertising(&mut self, name: &str) -> Result<(), TransportError> {
        self.advertised_name.clear();
        self.advertised_name
            .push_str(name)
            .map_err(|_| TransportError::AdvertisingFailed)
    }
}
