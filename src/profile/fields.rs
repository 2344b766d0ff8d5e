//! Live field set: the runtime mirror of the persisted record
//!
//! Text fields keep the record's fixed capacity. Options and the mode are
//! held as 16-bit values, the width they have on the air.

use crate::config::record::{
    ADDR_LEN, APP_OPTION_COUNT, DEVICE_NAME_LEN, WIFI_PASSWD_LEN, WIFI_SSID_LEN,
};
use crate::profile::error::ProfileError;
use crate::profile::gatt::FieldId;
use crate::record::{text, text_bytes, AppOptions, ConfigRecord, WifiOpMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveFieldSet {
    pub device_name: [u8; DEVICE_NAME_LEN],
    pub wifi_ssid: [u8; WIFI_SSID_LEN],
    pub wifi_passwd: [u8; WIFI_PASSWD_LEN],
    pub wifi_own_addr: [u8; ADDR_LEN],
    /// Raw mode byte as last written
    pub wifi_own_mode: u16,
    /// 0 or 1 per option
    pub app_options: [u16; APP_OPTION_COUNT],
    pub peer_addr: [u8; ADDR_LEN],
}

impl LiveFieldSet {
    pub const fn new() -> Self {
        Self {
            device_name: [0; DEVICE_NAME_LEN],
            wifi_ssid: [0; WIFI_SSID_LEN],
            wifi_passwd: [0; WIFI_PASSWD_LEN],
            wifi_own_addr: [0; ADDR_LEN],
            wifi_own_mode: 0,
            app_options: [0; APP_OPTION_COUNT],
            peer_addr: [0; ADDR_LEN],
        }
    }

    /// Replace every live field with the persisted fields of `record`.
    ///
    /// Leaves the set untouched on failure.
    pub fn import(&mut self, record: &ConfigRecord) -> Result<(), ProfileError> {
        let mut staged = Self::new();
        copy_field(&mut staged.device_name, &record.device_name, FieldId::DeviceName)?;
        copy_field(&mut staged.wifi_ssid, &record.wifi_ssid, FieldId::WifiSsid)?;
        copy_field(&mut staged.wifi_passwd, &record.wifi_passwd, FieldId::WifiPasswd)?;
        copy_field(&mut staged.wifi_own_addr, &record.wifi_own_addr, FieldId::WifiOwnAddr)?;
        copy_field(&mut staged.peer_addr, &record.peer_addr, FieldId::PeerAddr)?;

        staged.wifi_own_mode = record.wifi_op_mode.bits() as u16;
        for (i, slot) in staged.app_options.iter_mut().enumerate() {
            *slot = record.app_options.get(i) as u16;
        }

        *self = staged;
        Ok(())
    }

    /// Build a fresh record from the live fields.
    ///
    /// The record starts fully zeroed; magic ID and checksum stay zero for
    /// the caller to fill in.
    pub fn export(&self) -> Result<ConfigRecord, ProfileError> {
        let mut record = ConfigRecord::zeroed();
        copy_field(&mut record.device_name, &self.device_name, FieldId::DeviceName)?;
        copy_field(&mut record.wifi_ssid, &self.wifi_ssid, FieldId::WifiSsid)?;
        copy_field(&mut record.wifi_passwd, &self.wifi_passwd, FieldId::WifiPasswd)?;
        copy_field(&mut record.wifi_own_addr, &self.wifi_own_addr, FieldId::WifiOwnAddr)?;
        copy_field(&mut record.peer_addr, &self.peer_addr, FieldId::PeerAddr)?;

        record.wifi_op_mode = WifiOpMode::from_bits_retain(self.wifi_own_mode as u8);
        let mut options = AppOptions::default();
        for (i, &value) in self.app_options.iter().enumerate() {
            options.set(i, value != 0);
        }
        record.app_options = options;

        Ok(record)
    }

    /// Wire encoding of a persisted field into `out`, returning its length.
    ///
    /// `None` for fields without a live value.
    pub fn encode(&self, field: FieldId, out: &mut [u8]) -> Option<usize> {
        let word: [u8; 2];
        let value: &[u8] = match field {
            FieldId::DeviceName => text_bytes(&self.device_name),
            FieldId::WifiSsid => text_bytes(&self.wifi_ssid),
            FieldId::WifiPasswd => text_bytes(&self.wifi_passwd),
            FieldId::WifiOwnAddr => text_bytes(&self.wifi_own_addr),
            FieldId::PeerAddr => text_bytes(&self.peer_addr),
            FieldId::WifiOwnMode => {
                word = self.wifi_own_mode.to_le_bytes();
                &word
            }
            FieldId::AppOption(i) => {
                word = self.app_options.get(i as usize)?.to_le_bytes();
                &word
            }
            _ => return None,
        };
        let len = value.len().min(out.len());
        out[..len].copy_from_slice(&value[..len]);
        Some(len)
    }

    /// Apply a raw characteristic value to the live field.
    ///
    /// Text is copied up to the first NUL and bounded by capacity. Options
    /// are coerced to 0/1 and the mode keeps its raw byte; both read only the
    /// first byte and ignore an empty value.
    pub fn capture(&mut self, field: FieldId, raw: &[u8]) {
        match field {
            FieldId::DeviceName => capture_text(&mut self.device_name, raw),
            FieldId::WifiSsid => capture_text(&mut self.wifi_ssid, raw),
            FieldId::WifiPasswd => capture_text(&mut self.wifi_passwd, raw),
            FieldId::WifiOwnAddr => capture_text(&mut self.wifi_own_addr, raw),
            FieldId::PeerAddr => capture_text(&mut self.peer_addr, raw),
            FieldId::WifiOwnMode => {
                if let Some(&b) = raw.first() {
                    self.wifi_own_mode = b as u16;
                }
            }
            FieldId::AppOption(i) => {
                if let (Some(&b), Some(slot)) = (raw.first(), self.app_options.get_mut(i as usize)) {
                    *slot = (b > 0) as u16;
                }
            }
            _ => {}
        }
    }

    pub fn device_name(&self) -> &str {
        text(&self.device_name)
    }
}

impl Default for LiveFieldSet {
    fn default() -> Self {
        Self::new()
    }
}

fn copy_field(dst: &mut [u8], src: &[u8], field: FieldId) -> Result<(), ProfileError> {
    if dst.len() < src.len() {
        log::warn!("Profile: {:?} buffer {} < {}", field, dst.len(), src.len());
        return Err(ProfileError::FieldSize(field));
    }
    dst[..src.len()].copy_from_slice(src);
    dst[src.len()..].fill(0);
    Ok(())
}

fn capture_text(dst: &mut [u8], raw: &[u8]) {
    let len = raw
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(raw.len())
        .min(dst.len());
    dst[..len].copy_from_slice(&raw[..len]);
    dst[len..].fill(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::set_text;

    fn sample_record() -> ConfigRecord {
        let mut rec = ConfigRecord::factory_default();
        set_text(&mut rec.device_name, "Sensor-7");
        set_text(&mut rec.wifi_ssid, "Lab");
        set_text(&mut rec.wifi_passwd, "hunter22");
        set_text(&mut rec.wifi_own_addr, "10.0.0.7:80");
        rec.wifi_op_mode = WifiOpMode::ACCESS_POINT;
        rec.app_options.set(0, true);
        rec.app_options.set(5, true);
        set_text(&mut rec.peer_addr, "10.0.0.1:9000");
        rec
    }

    #[test]
    fn test_import_converts_packed_options() {
        let mut live = LiveFieldSet::new();
        live.import(&sample_record()).unwrap();

        assert_eq!(live.app_options, [1, 0, 0, 0, 0, 1, 0, 0]);
        assert_eq!(live.wifi_own_mode, WifiOpMode::ACCESS_POINT.bits() as u16);
        assert_eq!(live.device_name(), "Sensor-7");
    }

    #[test]
    fn test_export_import_round_trip() {
        let original = sample_record();
        let mut live = LiveFieldSet::new();
        live.import(&original).unwrap();
        let exported = live.export().unwrap();

        // Magic ID and checksum are outside the live set
        assert_eq!(exported.magic_id, 0);
        assert_eq!(exported.crc32, 0);
        assert_eq!(
            ConfigRecord {
                magic_id: original.magic_id,
                crc32: original.crc32,
                ..exported
            },
            original
        );
    }

    #[test]
    fn test_export_zeroes_whole_record() {
        let live = LiveFieldSet::new();
        assert_eq!(live.export().unwrap().to_bytes(), [0u8; 186]);
    }

    #[test]
    fn test_capture_option_coercion() {
        let mut live = LiveFieldSet::new();
        live.capture(FieldId::AppOption(3), &[0x05, 0x00]);
        assert_eq!(live.app_options[3], 1);
        assert!(live.export().unwrap().app_options.get(3));

        live.capture(FieldId::AppOption(3), &[0x00, 0x00]);
        assert_eq!(live.app_options[3], 0);
    }

    #[test]
    fn test_capture_mode_keeps_raw_byte() {
        let mut live = LiveFieldSet::new();
        live.capture(FieldId::WifiOwnMode, &[0x03, 0x00]);
        assert_eq!(live.wifi_own_mode, 3);

        // Empty write keeps the previous value
        live.capture(FieldId::WifiOwnMode, &[]);
        assert_eq!(live.wifi_own_mode, 3);
    }

    #[test]
    fn test_capture_text_bounds() {
        let mut live = LiveFieldSet::new();
        live.capture(FieldId::WifiSsid, b"Cafe\0junk");
        assert_eq!(text(&live.wifi_ssid), "Cafe");

        let long = [b'x'; 40];
        live.capture(FieldId::WifiSsid, &long);
        assert_eq!(live.wifi_ssid, [b'x'; WIFI_SSID_LEN]);

        live.capture(FieldId::WifiSsid, b"");
        assert_eq!(live.wifi_ssid, [0; WIFI_SSID_LEN]);
    }

    #[test]
    fn test_encode() {
        let mut live = LiveFieldSet::new();
        live.import(&sample_record()).unwrap();
        let mut out = [0u8; 64];

        let len = live.encode(FieldId::WifiOwnAddr, &mut out).unwrap();
        assert_eq!(&out[..len], b"10.0.0.7:80");

        let len = live.encode(FieldId::AppOption(5), &mut out).unwrap();
        assert_eq!(&out[..len], &[1, 0]);

        assert_eq!(live.encode(FieldId::SaveConfig, &mut out), None);
    }

    #[test]
    fn test_capture_ignores_non_persisted() {
        let mut live = LiveFieldSet::new();
        live.capture(FieldId::TickCount, &[1, 2, 3, 4]);
        assert_eq!(live, LiveFieldSet::new());
    }
}
