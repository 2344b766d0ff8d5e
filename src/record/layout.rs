//! Configuration record and its fixed on-storage layout
//!
//! # Layout
//!
//! The record is stored packed and little-endian:
//! ```text
//! offset  len  field
//!      0    4  magic_id (u32 LE)
//!      4   32  device_name (NUL padded)
//!     36   32  wifi_ssid (NUL padded)
//!     68   64  wifi_passwd (NUL padded)
//!    132   24  wifi_own_addr ("host:port", NUL padded)
//!    156    1  wifi_op_mode (bit0 = station, bit1 = access point)
//!    157    1  app_options (option N at bit N-1)
//!    158   24  peer_addr ("host:port", NUL padded)
//!    182    4  crc32 (u32 LE)
//! ```
//!
//! Offsets come from [`FIELD_TABLE`] rather than the in-memory struct layout.

use bitflags::bitflags;

use crate::config::{defaults, record};

/// Identifies one slot of the persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    MagicId,
    DeviceName,
    WifiSsid,
    WifiPasswd,
    WifiOwnAddr,
    WifiOpMode,
    AppOptions,
    PeerAddr,
    Crc32,
}

/// Byte range of one field inside the serialized record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub field: RecordField,
    pub offset: usize,
    pub len: usize,
}

impl FieldSpan {
    const fn new(field: RecordField, offset: usize, len: usize) -> Self {
        Self { field, offset, len }
    }

    /// End offset (exclusive)
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Field offsets of the serialized record, in storage order
pub const FIELD_TABLE: [FieldSpan; 9] = [
    FieldSpan::new(RecordField::MagicId, 0, 4),
    FieldSpan::new(RecordField::DeviceName, 4, record::DEVICE_NAME_LEN),
    FieldSpan::new(RecordField::WifiSsid, 36, record::WIFI_SSID_LEN),
    FieldSpan::new(RecordField::WifiPasswd, 68, record::WIFI_PASSWD_LEN),
    FieldSpan::new(RecordField::WifiOwnAddr, 132, record::ADDR_LEN),
    FieldSpan::new(RecordField::WifiOpMode, 156, 1),
    FieldSpan::new(RecordField::AppOptions, 157, 1),
    FieldSpan::new(RecordField::PeerAddr, 158, record::ADDR_LEN),
    FieldSpan::new(RecordField::Crc32, 182, 4),
];

/// Look up the span of a field
pub const fn span(field: RecordField) -> FieldSpan {
    let mut i = 0;
    while i < FIELD_TABLE.len() {
        if FIELD_TABLE[i].field as u8 == field as u8 {
            return FIELD_TABLE[i];
        }
        i += 1;
    }
    // Every variant has a table entry
    FIELD_TABLE[0]
}

bitflags! {
    /// WIFI operating mode bits
    ///
    /// Stored bytes go through `from_bits_retain` so bits without a named
    /// mode survive a load/save cycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WifiOpMode: u8 {
        /// Station/client mode
        const STATION = 1 << 0;
        /// Access point mode
        const ACCESS_POINT = 1 << 1;
    }
}

/// Eight boolean application options packed into one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppOptions(u8);

impl AppOptions {
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Option at `index` (0-based). Out-of-range indices read as false.
    pub fn get(self, index: usize) -> bool {
        index < record::APP_OPTION_COUNT && self.0 & (1 << index) != 0
    }

    /// Set option at `index` (0-based). Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, enabled: bool) {
        if index >= record::APP_OPTION_COUNT {
            return;
        }
        if enabled {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
    }
}

/// The unit of persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRecord {
    pub magic_id: u32,
    pub device_name: [u8; record::DEVICE_NAME_LEN],
    pub wifi_ssid: [u8; record::WIFI_SSID_LEN],
    pub wifi_passwd: [u8; record::WIFI_PASSWD_LEN],
    pub wifi_own_addr: [u8; record::ADDR_LEN],
    pub wifi_op_mode: WifiOpMode,
    pub app_options: AppOptions,
    pub peer_addr: [u8; record::ADDR_LEN],
    pub crc32: u32,
}

impl ConfigRecord {
    /// All-zero record
    pub const fn zeroed() -> Self {
        Self {
            magic_id: 0,
            device_name: [0; record::DEVICE_NAME_LEN],
            wifi_ssid: [0; record::WIFI_SSID_LEN],
            wifi_passwd: [0; record::WIFI_PASSWD_LEN],
            wifi_own_addr: [0; record::ADDR_LEN],
            wifi_op_mode: WifiOpMode::from_bits_retain(0),
            app_options: AppOptions::from_bits(0),
            peer_addr: [0; record::ADDR_LEN],
            crc32: 0,
        }
    }

    /// Record used when storage holds no valid data
    pub fn factory_default() -> Self {
        let mut rec = Self::zeroed();
        rec.magic_id = record::MAGIC_ID;
        set_text(&mut rec.device_name, defaults::DEVICE_NAME);
        set_text(&mut rec.wifi_own_addr, defaults::ADDR);
        set_text(&mut rec.peer_addr, defaults::ADDR);
        rec.wifi_op_mode = WifiOpMode::STATION;
        rec
    }

    /// Serialize using the offsets of [`FIELD_TABLE`]
    pub fn to_bytes(&self) -> [u8; record::RECORD_SIZE] {
        let mut out = [0u8; record::RECORD_SIZE];
        for span in FIELD_TABLE.iter() {
            let dst = &mut out[span.offset..span.end()];
            match span.field {
                RecordField::MagicId => dst.copy_from_slice(&self.magic_id.to_le_bytes()),
                RecordField::DeviceName => dst.copy_from_slice(&self.device_name),
                RecordField::WifiSsid => dst.copy_from_slice(&self.wifi_ssid),
                RecordField::WifiPasswd => dst.copy_from_slice(&self.wifi_passwd),
                RecordField::WifiOwnAddr => dst.copy_from_slice(&self.wifi_own_addr),
                RecordField::WifiOpMode => dst[0] = self.wifi_op_mode.bits(),
                RecordField::AppOptions => dst[0] = self.app_options.bits(),
                RecordField::PeerAddr => dst.copy_from_slice(&self.peer_addr),
                RecordField::Crc32 => dst.copy_from_slice(&self.crc32.to_le_bytes()),
            }
        }
        out
    }

    /// Deserialize using the offsets of [`FIELD_TABLE`]
    pub fn from_bytes(bytes: &[u8; record::RECORD_SIZE]) -> Self {
        let mut rec = Self::zeroed();
        for span in FIELD_TABLE.iter() {
            let src = &bytes[span.offset..span.end()];
            match span.field {
                RecordField::MagicId => rec.magic_id = read_u32(src),
                RecordField::DeviceName => rec.device_name.copy_from_slice(src),
                RecordField::WifiSsid => rec.wifi_ssid.copy_from_slice(src),
                RecordField::WifiPasswd => rec.wifi_passwd.copy_from_slice(src),
                RecordField::WifiOwnAddr => rec.wifi_own_addr.copy_from_slice(src),
                RecordField::WifiOpMode => rec.wifi_op_mode = WifiOpMode::from_bits_retain(src[0]),
                RecordField::AppOptions => rec.app_options = AppOptions::from_bits(src[0]),
                RecordField::PeerAddr => rec.peer_addr.copy_from_slice(src),
                RecordField::Crc32 => rec.crc32 = read_u32(src),
            }
        }
        rec
    }

    pub fn device_name(&self) -> &str {
        text(&self.device_name)
    }

    pub fn wifi_ssid(&self) -> &str {
        text(&self.wifi_ssid)
    }

    pub fn wifi_passwd(&self) -> &str {
        text(&self.wifi_passwd)
    }

    pub fn wifi_own_addr(&self) -> &str {
        text(&self.wifi_own_addr)
    }

    pub fn peer_addr(&self) -> &str {
        text(&self.peer_addr)
    }
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self::factory_default()
    }
}

fn read_u32(src: &[u8]) -> u32 {
    u32::from_le_bytes([src[0], src[1], src[2], src[3]])
}

/// Store `value` in a fixed text buffer, truncated to capacity and NUL padded
pub fn set_text(buf: &mut [u8], value: &str) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(buf.len());
    buf[..len].copy_from_slice(&bytes[..len]);
    buf[len..].fill(0);
}

/// Bytes of a text buffer up to the first NUL (or the whole buffer)
pub fn text_bytes(buf: &[u8]) -> &[u8] {
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    &buf[..len]
}

/// View a text buffer as `&str`, stopping at the first NUL.
///
/// A buffer that is not valid UTF-8 is cut at the last valid character.
pub fn text(buf: &[u8]) -> &str {
    let bytes = text_bytes(buf);
    match core::str::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
    }
}
