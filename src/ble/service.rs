//! GATT services of the configuration profile
//!
//! The attribute table is fixed at compile time. Every UUID follows the
//! profile scheme `GGGGGGGG-000N-1000-8000-E776CC14FE69`. Values are byte
//! arrays sized to their record field; shorter writes are zero padded by the
//! transport adapter.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use trouble_host::prelude::*;

use crate::config::uuid::{FEATURE_LIST_DESCRIPTOR, LABEL_DESCRIPTOR};
use crate::profile::uuids::descriptor_uuid;

/// Label of the peer address characteristic
pub const PEER_ADDR_LABEL: &str = "Peer Address";

/// Operating modes listed on the mode characteristic (u16 LE)
pub const OWN_MODE_FEATURES: [u8; 2] = [0x03, 0x00];

/// Device Management: identity, liveness and the save/restart triggers
#[gatt_service(uuid = "00001000-0000-1000-8000-e776cc14fe69")]
pub struct DeviceManagementService {
    #[descriptor(uuid = "00001100-0001-1000-8000-e776cc14fe69", read, value = "Device Type")]
    #[characteristic(uuid = "00001100-0000-1000-8000-e776cc14fe69", read, value = [0u8; 4])]
    pub device_type: [u8; 4],

    #[descriptor(uuid = "00001200-0001-1000-8000-e776cc14fe69", read, value = "System Tick Count")]
    #[characteristic(uuid = "00001200-0000-1000-8000-e776cc14fe69", read, notify, value = [0u8; 4])]
    pub tick_count: [u8; 4],

    #[descriptor(uuid = "00001300-0001-1000-8000-e776cc14fe69", read, value = "Device Name")]
    #[characteristic(uuid = "00001300-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 32])]
    pub device_name: [u8; 32],

    #[descriptor(uuid = "00001400-0001-1000-8000-e776cc14fe69", read, value = "Save Config")]
    #[characteristic(uuid = "00001400-0000-1000-8000-e776cc14fe69", write, value = [0u8; 1])]
    pub save_config: [u8; 1],

    #[descriptor(uuid = "00001500-0001-1000-8000-e776cc14fe69", read, value = "Restart Device")]
    #[characteristic(uuid = "00001500-0000-1000-8000-e776cc14fe69", write, value = [0u8; 1])]
    pub restart_device: [u8; 1],
}

/// Network Configuration: WiFi credentials, own address and mode
#[gatt_service(uuid = "00002000-0000-1000-8000-e776cc14fe69")]
pub struct NetworkConfigurationService {
    #[descriptor(uuid = "00002100-0001-1000-8000-e776cc14fe69", read, value = "WIFI SSID")]
    #[characteristic(uuid = "00002100-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 32])]
    pub wifi_ssid: [u8; 32],

    #[descriptor(uuid = "00002200-0001-1000-8000-e776cc14fe69", read, value = "WIFI PASSWD")]
    #[characteristic(uuid = "00002200-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 64])]
    pub wifi_passwd: [u8; 64],

    #[descriptor(uuid = "00002300-0001-1000-8000-e776cc14fe69", read, value = "Own Address")]
    #[characteristic(uuid = "00002300-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 24])]
    pub wifi_own_addr: [u8; 24],

    #[descriptor(uuid = "00002400-0001-1000-8000-e776cc14fe69", read, value = "Own Mode")]
    #[descriptor(uuid = "00002400-0002-1000-8000-e776cc14fe69", read, value = [0x03, 0x00])]
    #[characteristic(uuid = "00002400-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 2])]
    pub wifi_own_mode: [u8; 2],
}

/// Application Runtime: eight generic options and the peer address
#[gatt_service(uuid = "00003000-0000-1000-8000-e776cc14fe69")]
pub struct ApplicationRuntimeService {
    #[characteristic(uuid = "00003100-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 2])]
    pub option_1: [u8; 2],
    #[characteristic(uuid = "00003200-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 2])]
    pub option_2: [u8; 2],
    #[characteristic(uuid = "00003300-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 2])]
    pub option_3: [u8; 2],
    #[characteristic(uuid = "00003400-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 2])]
    pub option_4: [u8; 2],
    #[characteristic(uuid = "00003500-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 2])]
    pub option_5: [u8; 2],
    #[characteristic(uuid = "00003600-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 2])]
    pub option_6: [u8; 2],
    #[characteristic(uuid = "00003700-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 2])]
    pub option_7: [u8; 2],
    #[characteristic(uuid = "00003800-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 2])]
    pub option_8: [u8; 2],

    #[descriptor(uuid = "00003900-0001-1000-8000-e776cc14fe69", read, value = "Peer Address")]
    #[characteristic(uuid = "00003900-0000-1000-8000-e776cc14fe69", read, write, notify, value = [0u8; 24])]
    pub peer_addr: [u8; 24],
}

/// GATT server holding the three configuration services
#[gatt_server(mutex_type = CriticalSectionRawMutex)]
pub struct ConfigServer {
    pub device: DeviceManagementService,
    pub network: NetworkConfigurationService,
    pub runtime: ApplicationRuntimeService,
}

/// Descriptors declared above, as (UUID, value)
pub const STATIC_DESCRIPTORS: [(u128, &[u8]); 11] = [
    (descriptor_uuid(0x1100, LABEL_DESCRIPTOR), b"Device Type"),
    (descriptor_uuid(0x1200, LABEL_DESCRIPTOR), b"System Tick Count"),
    (descriptor_uuid(0x1300, LABEL_DESCRIPTOR), b"Device Name"),
    (descriptor_uuid(0x1400, LABEL_DESCRIPTOR), b"Save Config"),
    (descriptor_uuid(0x1500, LABEL_DESCRIPTOR), b"Restart Device"),
    (descriptor_uuid(0x2100, LABEL_DESCRIPTOR), b"WIFI SSID"),
    (descriptor_uuid(0x2200, LABEL_DESCRIPTOR), b"WIFI PASSWD"),
    (descriptor_uuid(0x2300, LABEL_DESCRIPTOR), b"Own Address"),
    (descriptor_uuid(0x2400, LABEL_DESCRIPTOR), b"Own Mode"),
    (descriptor_uuid(0x2400, FEATURE_LIST_DESCRIPTOR), &OWN_MODE_FEATURES),
    (descriptor_uuid(0x3900, LABEL_DESCRIPTOR), PEER_ADDR_LABEL.as_bytes()),
];
