//! UUIDs of the configuration profile, mirrored from the firmware.

use uuid::Uuid;

/// Groups 3 to 5 of every profile UUID
const TAIL: u128 = 0x1000_8000_E776_CC14_FE69;

/// UUID of a service or characteristic from its first group
pub const fn attribute(group: u32) -> Uuid {
    Uuid::from_u128(((group as u128) << 96) | TAIL)
}

/// UUID of descriptor `index` of the characteristic with `group`
pub const fn descriptor(group: u32, index: u16) -> Uuid {
    Uuid::from_u128(((group as u128) << 96) | ((index as u128) << 80) | TAIL)
}

pub const DEVICE_MANAGEMENT: Uuid = attribute(0x1000);
pub const NETWORK_CONFIGURATION: Uuid = attribute(0x2000);
pub const APPLICATION_RUNTIME: Uuid = attribute(0x3000);

pub const DEVICE_TYPE: u32 = 0x1100;
pub const TICK_COUNT: u32 = 0x1200;
pub const DEVICE_NAME: u32 = 0x1300;
pub const SAVE_CONFIG: u32 = 0x1400;
pub const RESTART_DEVICE: u32 = 0x1500;
pub const WIFI_OWN_MODE: u32 = 0x2400;

/// Application option `n` (1..=8)
pub const fn app_option(n: u32) -> u32 {
    0x3000 + 0x100 * n
}

/// Characteristics with a fixed label, as (group, label)
pub const FIXED_LABELS: [(u32, &str); 9] = [
    (0x1100, "Device Type"),
    (0x1200, "System Tick Count"),
    (0x1300, "Device Name"),
    (0x1400, "Save Config"),
    (0x1500, "Restart Device"),
    (0x2100, "WIFI SSID"),
    (0x2200, "WIFI PASSWD"),
    (0x2300, "Own Address"),
    (0x2400, "Own Mode"),
];
