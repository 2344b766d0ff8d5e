//! Configuration constants for the ESP32-S3 BLE configuration firmware

/// Non-volatile storage layout
pub mod storage {
    /// Size of the emulated EEPROM area in bytes
    pub const EEPROM_SIZE: usize = 512;

    /// Flash range holding the emulated EEPROM area (NVS partition of the
    /// default table, six 4 KiB sectors)
    pub const FLASH_RANGE: core::ops::Range<u32> = 0x9000..0xF000;

    /// Offset of the configuration record inside the EEPROM area
    pub const RECORD_OFFSET: usize = 0;
}

/// Persisted record layout
pub mod record {
    /// Format identifier stored in every saved record
    pub const MAGIC_ID: u32 = 0x4543_4647;

    pub const DEVICE_NAME_LEN: usize = 32;
    /// 802.11 limit on an AP name
    pub const WIFI_SSID_LEN: usize = 32;
    /// WPA2 limit on a passphrase
    pub const WIFI_PASSWD_LEN: usize = 64;
    /// Fits "192.168.xxx.xxx:12345"
    pub const ADDR_LEN: usize = 24;

    /// Number of independent application options
    pub const APP_OPTION_COUNT: usize = 8;

    /// Serialized record size: 4 + 32 + 32 + 64 + 24 + 1 + 1 + 24 + 4
    pub const RECORD_SIZE: usize = 186;
}

/// Profile behaviour
pub mod profile {
    /// Minimum interval between two liveness notifications
    pub const TICK_INTERVAL_MS: u32 = 1000;

    /// Largest characteristic value exchanged with the transport
    pub const MAX_VALUE_LEN: usize = 64;

    /// Longest descriptor label kept by the transport
    pub const MAX_LABEL_LEN: usize = 32;

    /// Host loop period driving the liveness tick on the device
    pub const LOOP_PERIOD_MS: u64 = 100;
}

/// UUID scheme shared by all services, characteristics and descriptors
///
/// Characteristic: `GGGGGGGG-0000-1000-8000-E776CC14FE69`,
/// descriptor N of that characteristic: `GGGGGGGG-000N-1000-8000-E776CC14FE69`.
pub mod uuid {
    /// Groups 3 to 5, shared by every attribute of the profile
    pub const TAIL: u128 = 0x1000_8000_E776_CC14_FE69;

    /// Second group of the primary label descriptor
    pub const LABEL_DESCRIPTOR: u16 = 0x0001;

    /// Second group of the supported-modes descriptor
    pub const FEATURE_LIST_DESCRIPTOR: u16 = 0x0002;
}

/// Factory defaults used when no valid record is stored
pub mod defaults {
    pub const DEVICE_NAME: &str = "ESP32_BLE_DEVICE";
    pub const ADDR: &str = "0.0.0.0:0";
    pub const DEVICE_TYPE: u32 = 0x0000_0001;
}
