//! Static GATT layout of the configuration profile
//!
//! Three services, one per field group. Each characteristic is bound to one
//! [`FieldId`] and carries its UUID group, access flags and fixed label.

use crate::config::record::APP_OPTION_COUNT;
use crate::profile::transport::CharProps;
use crate::profile::uuids::{attribute_uuid, descriptor_uuid};
use crate::record::WifiOpMode;

/// Identifies one BLE-exposed field of the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    DeviceType,
    TickCount,
    DeviceName,
    SaveConfig,
    RestartDevice,
    WifiSsid,
    WifiPasswd,
    WifiOwnAddr,
    WifiOwnMode,
    /// Application option, 0-based
    AppOption(u8),
    PeerAddr,
}

impl FieldId {
    /// Number of distinct fields
    pub const COUNT: usize = 10 + APP_OPTION_COUNT;

    /// Dense index, usable as an array slot. `None` for an option index
    /// past the last option.
    pub const fn index(self) -> Option<usize> {
        let slot = match self {
            FieldId::DeviceType => 0,
            FieldId::TickCount => 1,
            FieldId::DeviceName => 2,
            FieldId::SaveConfig => 3,
            FieldId::RestartDevice => 4,
            FieldId::WifiSsid => 5,
            FieldId::WifiPasswd => 6,
            FieldId::WifiOwnAddr => 7,
            FieldId::WifiOwnMode => 8,
            FieldId::AppOption(i) if (i as usize) < APP_OPTION_COUNT => 9 + i as usize,
            FieldId::AppOption(_) => return None,
            FieldId::PeerAddr => 9 + APP_OPTION_COUNT,
        };
        Some(slot)
    }

    /// Field backed by the persisted record
    pub const fn is_persisted(self) -> bool {
        !matches!(
            self,
            FieldId::DeviceType | FieldId::TickCount | FieldId::SaveConfig | FieldId::RestartDevice
        )
    }
}

/// One characteristic of the layout
#[derive(Debug, Clone, Copy)]
pub struct CharDef {
    pub field: FieldId,
    /// First UUID group
    pub group: u32,
    pub props: CharProps,
    /// Fixed label (descriptor 0001)
    pub label: Option<&'static str>,
    /// Descriptors reserved in the handle hint
    pub descriptor_slots: u16,
}

impl CharDef {
    pub const fn uuid(&self) -> u128 {
        attribute_uuid(self.group)
    }

    pub const fn descriptor_uuid(&self, index: u16) -> u128 {
        descriptor_uuid(self.group, index)
    }
}

/// One service of the layout
#[derive(Debug, Clone, Copy)]
pub struct ServiceDef {
    pub name: &'static str,
    /// First UUID group
    pub group: u32,
    pub chars: &'static [CharDef],
}

impl ServiceDef {
    pub const fn uuid(&self) -> u128 {
        attribute_uuid(self.group)
    }

    /// Handle hint: service declaration, two handles per characteristic,
    /// one per reserved descriptor
    pub const fn num_handles(&self) -> u16 {
        let mut n = 1;
        let mut i = 0;
        while i < self.chars.len() {
            n += 2 + self.chars[i].descriptor_slots;
            i += 1;
        }
        n
    }
}

/// Optional caller-supplied annotations, never persisted
#[derive(Debug, Clone, Copy, Default)]
pub struct AppDescriptors<'a> {
    /// Supported operating modes (descriptor 0002 on the mode characteristic)
    pub own_mode_features: WifiOpMode,
    /// Label per application option
    pub option_labels: [Option<&'a str>; APP_OPTION_COUNT],
    pub peer_addr_label: Option<&'a str>,
}

impl<'a> AppDescriptors<'a> {
    /// Caller label for `field`, if any
    pub fn label_for(&self, field: FieldId) -> Option<&'a str> {
        match field {
            FieldId::AppOption(i) => self.option_labels.get(i as usize).copied().flatten(),
            FieldId::PeerAddr => self.peer_addr_label,
            _ => None,
        }
    }
}

const RO: CharProps = CharProps::READ;
const RN: CharProps = CharProps::READ.union(CharProps::NOTIFY);
const WO: CharProps = CharProps::WRITE;
const RWN: CharProps = CharProps::READ.union(CharProps::WRITE).union(CharProps::NOTIFY);

const fn fixed(field: FieldId, group: u32, props: CharProps, label: &'static str) -> CharDef {
    CharDef {
        field,
        group,
        props,
        label: Some(label),
        descriptor_slots: 1,
    }
}

const fn option(index: u8) -> CharDef {
    CharDef {
        field: FieldId::AppOption(index),
        group: 0x3100 + 0x100 * index as u32,
        props: RWN,
        label: None,
        descriptor_slots: 1,
    }
}

pub const DEVICE_MANAGEMENT: ServiceDef = ServiceDef {
    name: "Device Management",
    group: 0x1000,
    chars: &[
        fixed(FieldId::DeviceType, 0x1100, RO, "Device Type"),
        fixed(FieldId::TickCount, 0x1200, RN, "System Tick Count"),
        fixed(FieldId::DeviceName, 0x1300, RWN, "Device Name"),
        fixed(FieldId::SaveConfig, 0x1400, WO, "Save Config"),
        fixed(FieldId::RestartDevice, 0x1500, WO, "Restart Device"),
    ],
};

pub const NETWORK_CONFIGURATION: ServiceDef = ServiceDef {
    name: "Network Configuration",
    group: 0x2000,
    chars: &[
        fixed(FieldId::WifiSsid, 0x2100, RWN, "WIFI SSID"),
        fixed(FieldId::WifiPasswd, 0x2200, RWN, "WIFI PASSWD"),
        fixed(FieldId::WifiOwnAddr, 0x2300, RWN, "Own Address"),
        CharDef {
            descriptor_slots: 2,
            ..fixed(FieldId::WifiOwnMode, 0x2400, RWN, "Own Mode")
        },
    ],
};

pub const APPLICATION_RUNTIME: ServiceDef = ServiceDef {
    name: "Application Runtime",
    group: 0x3000,
    chars: &[
        option(0),
        option(1),
        option(2),
        option(3),
        option(4),
        option(5),
        option(6),
        option(7),
        CharDef {
            field: FieldId::PeerAddr,
            group: 0x3900,
            props: RWN,
            label: None,
            descriptor_slots: 1,
        },
    ],
};

/// Services in publication order
pub const LAYOUT: [ServiceDef; 3] = [DEVICE_MANAGEMENT, NETWORK_CONFIGURATION, APPLICATION_RUNTIME];

/// Characteristic definition bound to `field`
pub fn char_def(field: FieldId) -> Option<&'static CharDef> {
    LAYOUT
        .iter()
        .flat_map(|service| service.chars.iter())
        .find(|ch| ch.field == field)
}
