//! UUID scheme of the configuration profile
//!
//! The first group of a characteristic UUID names its purpose and the
//! second group is always `0000`. Descriptors reuse the first group of their
//! characteristic with a non-zero second group (`0001`, `0002`, ...).
//!
//! ```text
//! Characteristic:  00003100-0000-1000-8000-E776CC14FE69
//! Descriptor #1:   00003100-0001-1000-8000-E776CC14FE69
//! ```

use crate::config::uuid::TAIL;

/// UUID of a service or characteristic from its first group
pub const fn attribute_uuid(group: u32) -> u128 {
    ((group as u128) << 96) | TAIL
}

/// UUID of descriptor `index` (second group) of a characteristic
pub const fn descriptor_uuid(group: u32, index: u16) -> u128 {
    attribute_uuid(group) | ((index as u128) << 80)
}

/// First group of a profile UUID
pub const fn group_of(uuid: u128) -> u32 {
    (uuid >> 96) as u32
}

/// Second group of a profile UUID (0 for characteristics)
pub const fn descriptor_index_of(uuid: u128) -> u16 {
    (uuid >> 80) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_characteristic_uuid() {
        assert_eq!(attribute_uuid(0x3100), 0x00003100_0000_1000_8000_E776CC14FE69);
    }

    #[test]
    fn test_descriptor_uuid() {
        assert_eq!(descriptor_uuid(0x3100, 1), 0x00003100_0001_1000_8000_E776CC14FE69);
        assert_eq!(descriptor_uuid(0x2400, 2), 0x00002400_0002_1000_8000_E776CC14FE69);
    }

    #[test]
    fn test_groups() {
        let uuid = descriptor_uuid(0x1200, 1);
        assert_eq!(group_of(uuid), 0x1200);
        assert_eq!(descriptor_index_of(uuid), 1);
        assert_eq!(descriptor_index_of(attribute_uuid(0x1200)), 0);
    }
}
