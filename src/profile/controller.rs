//! Configuration profile controller
//!
//! Owns the live field set, the connection state and the liveness counter.
//! The transport is passed into every call; events it delivers are fed to
//! [`ConfigProfile::handle_event`] in order.

use crate::config::profile::{MAX_VALUE_LEN, TICK_INTERVAL_MS};
use crate::config::uuid::{FEATURE_LIST_DESCRIPTOR, LABEL_DESCRIPTOR};
use crate::profile::error::{ProfileError, SetupError};
use crate::profile::fields::LiveFieldSet;
use crate::profile::gatt::{AppDescriptors, CharDef, FieldId, LAYOUT};
use crate::profile::handlers::{ConnectionObserver, NoObserver, RestartHandler, SaveConfigHandler};
use crate::profile::transport::{CharHandle, GattTransport, TransportError, TransportEvent};
use crate::record::ConfigRecord;

pub struct ConfigProfile<S, R, C = NoObserver> {
    device_type: u32,
    /// Timestamp (ms) of the last liveness notification
    tick_count: u32,
    connected: bool,
    fields: LiveFieldSet,
    handles: [CharHandle; FieldId::COUNT],
    save_handler: S,
    restart_handler: R,
    observer: Option<C>,
}

impl<S, R, C> ConfigProfile<S, R, C>
where
    S: SaveConfigHandler,
    R: RestartHandler,
    C: ConnectionObserver,
{
    /// Import `record`, publish the three services and start advertising.
    ///
    /// Nothing is published when the import fails or a mandatory handler is
    /// missing.
    pub fn setup<T: GattTransport>(
        transport: &mut T,
        device_type: u32,
        record: &ConfigRecord,
        descriptors: Option<&AppDescriptors<'_>>,
        save_handler: Option<S>,
        restart_handler: Option<R>,
        observer: Option<C>,
    ) -> Result<Self, SetupError> {
        let mut fields = LiveFieldSet::new();
        fields.import(record).map_err(SetupError::Import)?;

        let save_handler = save_handler.ok_or(SetupError::MissingSaveHandler)?;
        let restart_handler = restart_handler.ok_or(SetupError::MissingRestartHandler)?;

        let mut profile = Self {
            device_type,
            tick_count: 0,
            connected: false,
            fields,
            handles: [0; FieldId::COUNT],
            save_handler,
            restart_handler,
            observer,
        };
        profile.publish(transport, descriptors)?;

        log::info!(
            "Profile: advertising as '{}' (device type {:#010x})",
            profile.fields.device_name(),
            device_type
        );
        Ok(profile)
    }

    fn publish<T: GattTransport>(
        &mut self,
        transport: &mut T,
        descriptors: Option<&AppDescriptors<'_>>,
    ) -> Result<(), SetupError> {
        let mut value = [0u8; MAX_VALUE_LEN];

        for service in LAYOUT.iter() {
            let sid = transport.create_service(service.uuid(), service.num_handles())?;

            for ch in service.chars {
                let handle = transport.create_characteristic(sid, ch.uuid(), ch.props)?;
                if let Some(slot) = ch.field.index() {
                    self.handles[slot] = handle;
                }

                if let Some(len) = self.initial_value(ch.field, &mut value) {
                    transport.set_value(handle, &value[..len])?;
                }
                attach_descriptors(transport, ch, handle, descriptors);
            }

            transport.start_service(sid)?;
            log::debug!("Profile: {} started", service.name);
        }

        transport.start_advertising(self.fields.device_name())?;
        Ok(())
    }

    fn initial_value(&self, field: FieldId, out: &mut [u8]) -> Option<usize> {
        match field {
            FieldId::DeviceType => {
                out[..4].copy_from_slice(&self.device_type.to_le_bytes());
                Some(4)
            }
            FieldId::TickCount => {
                out[..4].copy_from_slice(&self.tick_count.to_le_bytes());
                Some(4)
            }
            _ => self.fields.encode(field, out),
        }
    }

    /// Periodic liveness update.
    ///
    /// While connected and at least the tick interval after the previous
    /// update, stores `now_ms` in the tick characteristic and notifies it.
    /// Returns whether a notification went out.
    pub async fn tick<T: GattTransport>(&mut self, transport: &mut T, now_ms: u32) -> bool {
        if !self.connected || now_ms.wrapping_sub(self.tick_count) < TICK_INTERVAL_MS {
            return false;
        }
        self.tick_count = now_ms;

        let Some(handle) = self.handle(FieldId::TickCount) else {
            return false;
        };
        if let Err(e) = transport.set_value(handle, &now_ms.to_le_bytes()) {
            log::warn!("Profile: tick update failed: {:?}", e);
            return false;
        }
        match transport.notify(handle).await {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Profile: tick notify failed: {:?}", e);
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// React to one transport event
    pub fn handle_event<T: GattTransport>(&mut self, transport: &T, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.set_connected(true),
            TransportEvent::Disconnected => self.set_connected(false),
            TransportEvent::Written(handle) if Some(handle) == self.handle(FieldId::SaveConfig) => {
                self.request_save(transport)
            }
            TransportEvent::Written(handle) if Some(handle) == self.handle(FieldId::RestartDevice) => {
                log::info!("Profile: restart requested");
                self.restart_handler.on_restart_requested();
            }
            TransportEvent::Written(handle) => {
                log::trace!("Profile: write to handle {}", handle);
            }
        }
    }

    fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        log::info!("Profile: client {}", if connected { "connected" } else { "disconnected" });
        if let Some(observer) = self.observer.as_mut() {
            observer.on_connection_changed(connected);
        }
    }

    fn request_save<T: GattTransport>(&mut self, transport: &T) {
        match self.capture_from_transport(transport).and_then(|()| self.export()) {
            Ok(record) => {
                log::info!("Profile: save requested for '{}'", record.device_name());
                self.save_handler.on_save_requested(Some(&record));
            }
            Err(e) => {
                log::warn!("Profile: nothing to save: {:?}", e);
                self.save_handler.on_save_requested(None);
            }
        }
    }

    /// Read every persisted characteristic back into the live field set.
    ///
    /// The live set only changes when every value was read.
    pub fn capture_from_transport<T: GattTransport>(&mut self, transport: &T) -> Result<(), ProfileError> {
        let mut staged = self.fields.clone();
        let mut value = [0u8; MAX_VALUE_LEN];

        for ch in LAYOUT.iter().flat_map(|s| s.chars.iter()) {
            if !ch.field.is_persisted() {
                continue;
            }
            let handle = self.handle(ch.field).ok_or(TransportError::UnknownHandle)?;
            let len = transport.value(handle, &mut value)?;
            staged.capture(ch.field, &value[..len]);
        }

        self.fields = staged;
        Ok(())
    }

    /// Replace the live field set from `record`
    pub fn import(&mut self, record: &ConfigRecord) -> Result<(), ProfileError> {
        self.fields.import(record)
    }

    /// Fresh record from the live field set, magic ID and checksum zero
    pub fn export(&self) -> Result<ConfigRecord, ProfileError> {
        self.fields.export()
    }

    pub fn fields(&self) -> &LiveFieldSet {
        &self.fields
    }

    /// Timestamp of the last liveness notification
    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    /// Transport handle bound to `field`, if the field exists
    pub fn handle(&self, field: FieldId) -> Option<CharHandle> {
        field.index().map(|slot| self.handles[slot])
    }
}

/// Attach the fixed label, the caller label and the mode list.
///
/// Descriptors are annotations only; a refused one is skipped.
fn attach_descriptors<T: GattTransport>(
    transport: &mut T,
    ch: &CharDef,
    handle: CharHandle,
    descriptors: Option<&AppDescriptors<'_>>,
) {
    let label = ch.label.or_else(|| descriptors.and_then(|d| d.label_for(ch.field)));
    if let Some(label) = label {
        let uuid = ch.descriptor_uuid(LABEL_DESCRIPTOR);
        if let Err(e) = transport.add_descriptor(handle, uuid, label.as_bytes()) {
            log::warn!("Profile: label '{}' not attached: {:?}", label, e);
        }
    }

    if let (FieldId::WifiOwnMode, Some(d)) = (ch.field, descriptors) {
        let features = (d.own_mode_features.bits() as u16).to_le_bytes();
        let uuid = ch.descriptor_uuid(FEATURE_LIST_DESCRIPTOR);
        if let Err(e) = transport.add_descriptor(handle, uuid, &features) {
            log::warn!("Profile: mode list not attached: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::gatt::char_def;
    use crate::profile::transport::mock::MockTransport;
    use crate::profile::uuids::{attribute_uuid, descriptor_uuid};
    use crate::config::record::MAGIC_ID;
    use crate::config::storage::EEPROM_SIZE;
    use crate::record::{set_text, WifiOpMode};
    use crate::storage::traits::mock::MockEeprom;
    use crate::storage::{persist_capture, ConfigStore, LoadOutcome};
    use core::cell::{Cell, RefCell};
    use heapless::Vec;

    const DEVICE_TYPE: u32 = 0x0102_0304;

    type SaveFn = fn(Option<&ConfigRecord>);
    type RestartFn = fn();

    fn ignore_save(_: Option<&ConfigRecord>) {}
    fn ignore_restart() {}

    fn sample_record() -> ConfigRecord {
        let mut rec = ConfigRecord::factory_default();
        set_text(&mut rec.device_name, "Greenhouse");
        set_text(&mut rec.wifi_ssid, "Garden");
        rec.wifi_op_mode = WifiOpMode::STATION;
        rec.app_options.set(2, true);
        rec
    }

    fn uuid_of(field: FieldId) -> u128 {
        char_def(field).unwrap().uuid()
    }

    fn setup_with<'a>(
        transport: &mut MockTransport,
        saved: &'a RefCell<Vec<Option<ConfigRecord>, 4>>,
        restarts: &'a Cell<u32>,
    ) -> ConfigProfile<impl FnMut(Option<&ConfigRecord>) + 'a, impl FnMut() + 'a> {
        ConfigProfile::setup(
            transport,
            DEVICE_TYPE,
            &sample_record(),
            None,
            Some(move |rec: Option<&ConfigRecord>| {
                let _ = saved.borrow_mut().push(rec.copied());
            }),
            Some(move || restarts.set(restarts.get() + 1)),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_setup_publishes_three_services() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let _profile = setup_with(&mut transport, &saved, &restarts);

        let services = transport.services();
        assert_eq!(services.len(), 3);
        assert_eq!(services[0].uuid, attribute_uuid(0x1000));
        assert_eq!(services[1].uuid, attribute_uuid(0x2000));
        assert_eq!(services[2].uuid, attribute_uuid(0x3000));
        assert_eq!(
            [services[0].num_handles, services[1].num_handles, services[2].num_handles],
            [16, 14, 28]
        );
        assert!(services.iter().all(|s| s.started));
        assert_eq!(transport.characteristics().len(), FieldId::COUNT);
        assert_eq!(transport.advertised_name(), Some("Greenhouse"));
    }

    #[test]
    fn test_setup_initial_values() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let _profile = setup_with(&mut transport, &saved, &restarts);

        assert_eq!(transport.value_of(uuid_of(FieldId::DeviceType)), &DEVICE_TYPE.to_le_bytes());
        assert_eq!(transport.value_of(uuid_of(FieldId::TickCount)), &[0, 0, 0, 0]);
        assert_eq!(transport.value_of(uuid_of(FieldId::DeviceName)), b"Greenhouse");
        assert_eq!(transport.value_of(uuid_of(FieldId::WifiSsid)), b"Garden");
        assert_eq!(transport.value_of(uuid_of(FieldId::WifiPasswd)), b"");
        assert_eq!(transport.value_of(uuid_of(FieldId::WifiOwnMode)), &[1, 0]);
        assert_eq!(transport.value_of(uuid_of(FieldId::AppOption(2))), &[1, 0]);
        assert_eq!(transport.value_of(uuid_of(FieldId::AppOption(3))), &[0, 0]);
        assert_eq!(transport.value_of(uuid_of(FieldId::PeerAddr)), b"0.0.0.0:0");
        assert_eq!(transport.value_of(uuid_of(FieldId::SaveConfig)), b"");
    }

    #[test]
    fn test_setup_missing_save_handler() {
        let mut transport = MockTransport::new();
        let result = ConfigProfile::<SaveFn, RestartFn>::setup(
            &mut transport,
            DEVICE_TYPE,
            &sample_record(),
            None,
            None,
            Some(ignore_restart as RestartFn),
            None,
        );

        assert_eq!(result.err().map(|e| e.code()), Some(-2));
        assert!(transport.services().is_empty());
        assert_eq!(transport.advertised_name(), None);
    }

    #[test]
    fn test_setup_missing_restart_handler() {
        let mut transport = MockTransport::new();
        let result = ConfigProfile::<SaveFn, RestartFn>::setup(
            &mut transport,
            DEVICE_TYPE,
            &sample_record(),
            None,
            Some(ignore_save as SaveFn),
            None,
            None,
        );

        assert!(matches!(result, Err(SetupError::MissingRestartHandler)));
        assert_eq!(result.err().map(|e| e.code()), Some(-3));
        assert!(transport.services().is_empty());
    }

    #[test]
    fn test_setup_transport_failure() {
        let mut transport = MockTransport::new();
        transport.set_next_service_error(TransportError::ServiceUnavailable);
        let result = ConfigProfile::<SaveFn, RestartFn>::setup(
            &mut transport,
            DEVICE_TYPE,
            &sample_record(),
            None,
            Some(ignore_save as SaveFn),
            Some(ignore_restart as RestartFn),
            None,
        );

        assert_eq!(
            result.err(),
            Some(SetupError::Transport(TransportError::ServiceUnavailable))
        );
    }

    #[test]
    fn test_fixed_labels() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let _profile = setup_with(&mut transport, &saved, &restarts);

        let expected = [
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
        for (group, label) in expected {
            assert_eq!(
                transport.descriptor_of(attribute_uuid(group), descriptor_uuid(group, 1)),
                Some(label.as_bytes()),
                "label of {:#x}",
                group
            );
        }

        // Without metadata: no option labels and no mode list
        assert!(transport.characteristic(attribute_uuid(0x3100)).unwrap().descriptors.is_empty());
        assert_eq!(
            transport.descriptor_of(attribute_uuid(0x2400), descriptor_uuid(0x2400, 2)),
            None
        );
    }

    #[test]
    fn test_caller_descriptors() {
        let mut transport = MockTransport::new();
        let mut meta = AppDescriptors {
            own_mode_features: WifiOpMode::STATION | WifiOpMode::ACCESS_POINT,
            peer_addr_label: Some("Peer Address"),
            ..Default::default()
        };
        meta.option_labels[0] = Some("Verbose Log");

        let _profile = ConfigProfile::<SaveFn, RestartFn>::setup(
            &mut transport,
            DEVICE_TYPE,
            &sample_record(),
            Some(&meta),
            Some(ignore_save as SaveFn),
            Some(ignore_restart as RestartFn),
            None,
        )
        .unwrap();

        assert_eq!(
            transport.descriptor_of(attribute_uuid(0x3100), descriptor_uuid(0x3100, 1)),
            Some(&b"Verbose Log"[..])
        );
        assert!(transport.characteristic(attribute_uuid(0x3200)).unwrap().descriptors.is_empty());
        assert_eq!(
            transport.descriptor_of(attribute_uuid(0x3900), descriptor_uuid(0x3900, 1)),
            Some(&b"Peer Address"[..])
        );
        assert_eq!(
            transport.descriptor_of(attribute_uuid(0x2400), descriptor_uuid(0x2400, 2)),
            Some(&[0x03, 0x00][..])
        );
    }

    #[test]
    fn test_refused_descriptors_are_skipped() {
        let mut transport = MockTransport::new();
        transport.set_reject_descriptors(true);
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let _profile = setup_with(&mut transport, &saved, &restarts);

        assert_eq!(transport.services().len(), 3);
        assert!(transport.advertised_name().is_some());
    }

    #[test]
    fn test_connection_observer() {
        let mut transport = MockTransport::new();
        let changes: RefCell<Vec<bool, 4>> = RefCell::new(Vec::new());
        let mut profile = ConfigProfile::<SaveFn, RestartFn, _>::setup(
            &mut transport,
            DEVICE_TYPE,
            &sample_record(),
            None,
            Some(ignore_save as SaveFn),
            Some(ignore_restart as RestartFn),
            Some(|connected: bool| {
                let _ = changes.borrow_mut().push(connected);
            }),
        )
        .unwrap();

        assert!(!profile.is_connected());
        profile.handle_event(&transport, TransportEvent::Connected);
        assert!(profile.is_connected());
        profile.handle_event(&transport, TransportEvent::Disconnected);
        assert!(!profile.is_connected());

        drop(profile);
        assert_eq!(&changes.borrow()[..], &[true, false]);
    }

    #[test]
    fn test_option_handles_do_not_alias() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let profile = setup_with(&mut transport, &saved, &restarts);

        let first = profile.handle(FieldId::AppOption(0)).unwrap();
        let last = profile.handle(FieldId::AppOption(7)).unwrap();
        assert_eq!(Some(first), transport.handle_of(uuid_of(FieldId::AppOption(0))));
        assert_eq!(Some(last), transport.handle_of(uuid_of(FieldId::AppOption(7))));
        assert_ne!(first, last);
        assert_eq!(profile.handle(FieldId::AppOption(8)), None);
    }

    #[test]
    fn test_tick_timing() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let mut profile = setup_with(&mut transport, &saved, &restarts);
        let tick_handle = profile.handle(FieldId::TickCount).unwrap();

        futures::executor::block_on(async {
            // Never while disconnected
            for now in [0, 1000, 5000, 60_000] {
                assert!(!profile.tick(&mut transport, now).await);
            }

            profile.handle_event(&transport, TransportEvent::Connected);
            assert!(!profile.tick(&mut transport, 999).await);
            assert!(profile.tick(&mut transport, 1000).await);
            assert!(!profile.tick(&mut transport, 1500).await);
            assert!(!profile.tick(&mut transport, 1999).await);
            assert!(profile.tick(&mut transport, 2000).await);
            assert!(profile.tick(&mut transport, 3500).await);

            profile.handle_event(&transport, TransportEvent::Disconnected);
            assert!(!profile.tick(&mut transport, 10_000).await);
        });

        assert_eq!(transport.notifications(), &[tick_handle, tick_handle, tick_handle]);
        assert_eq!(profile.tick_count(), 3500);
        assert_eq!(transport.value_of(uuid_of(FieldId::TickCount)), &3500u32.to_le_bytes());
    }

    #[test]
    fn test_tick_wraps() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let mut profile = setup_with(&mut transport, &saved, &restarts);
        profile.handle_event(&transport, TransportEvent::Connected);

        futures::executor::block_on(async {
            assert!(profile.tick(&mut transport, u32::MAX - 100).await);
            assert!(!profile.tick(&mut transport, 500).await);
            assert!(profile.tick(&mut transport, 900).await);
        });
    }

    #[test]
    fn test_tick_notify_failure() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let mut profile = setup_with(&mut transport, &saved, &restarts);
        profile.handle_event(&transport, TransportEvent::Connected);
        transport.set_next_notify_error(TransportError::NotConnected);

        futures::executor::block_on(async {
            assert!(!profile.tick(&mut transport, 1000).await);
            // Window restarts from the failed attempt
            assert!(!profile.tick(&mut transport, 1500).await);
            assert!(profile.tick(&mut transport, 2000).await);
        });
    }

    #[test]
    fn test_save_captures_written_values() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let mut profile = setup_with(&mut transport, &saved, &restarts);

        transport.client_write(uuid_of(FieldId::AppOption(4)), &[0x05]);
        transport.client_write(uuid_of(FieldId::AppOption(2)), &[0x00, 0x00]);
        transport.client_write(uuid_of(FieldId::DeviceName), b"Shed");
        transport.client_write(uuid_of(FieldId::WifiOwnMode), &[0x02, 0x00]);

        // Ordinary writes do not touch the live set
        let event = transport.client_write(uuid_of(FieldId::WifiPasswd), b"s3cret");
        profile.handle_event(&transport, event);
        assert_eq!(profile.fields().device_name(), "Greenhouse");
        assert!(saved.borrow().is_empty());

        let event = transport.client_write(uuid_of(FieldId::SaveConfig), &[1]);
        profile.handle_event(&transport, event);

        assert_eq!(saved.borrow().len(), 1);
        let record = saved.borrow()[0].unwrap();
        assert!(record.app_options.get(4));
        assert!(!record.app_options.get(2));
        assert_eq!(record.device_name(), "Shed");
        assert_eq!(record.wifi_passwd(), "s3cret");
        assert_eq!(record.wifi_ssid(), "Garden");
        assert_eq!(record.wifi_op_mode, WifiOpMode::ACCESS_POINT);
        assert_eq!(record.magic_id, 0);
        assert_eq!(record.crc32, 0);

        assert_eq!(profile.fields().device_name(), "Shed");
        assert_eq!(restarts.get(), 0);
    }

    #[test]
    fn test_save_signals_capture_failure() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let mut profile = setup_with(&mut transport, &saved, &restarts);
        let before = profile.fields().clone();

        transport.client_write(uuid_of(FieldId::DeviceName), b"Lost");
        let event = transport.client_write(uuid_of(FieldId::SaveConfig), &[1]);
        transport.set_read_error(Some(TransportError::UnknownHandle));
        profile.handle_event(&transport, event);

        assert_eq!(saved.borrow().len(), 1);
        assert!(saved.borrow()[0].is_none());
        assert_eq!(profile.fields(), &before);
        // Live transport values stay as written
        assert_eq!(transport.value_of(uuid_of(FieldId::DeviceName)), b"Lost");
    }

    #[test]
    fn test_restart_trigger() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let mut profile = setup_with(&mut transport, &saved, &restarts);
        let before = profile.fields().clone();

        transport.client_write(uuid_of(FieldId::DeviceName), b"Ignored");
        let event = transport.client_write(uuid_of(FieldId::RestartDevice), &[1]);
        profile.handle_event(&transport, event);

        assert_eq!(restarts.get(), 1);
        assert!(saved.borrow().is_empty());
        assert_eq!(profile.fields(), &before);
    }

    #[test]
    fn test_each_save_request_saves_once() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let mut profile = setup_with(&mut transport, &saved, &restarts);

        for _ in 0..3 {
            let event = transport.client_write(uuid_of(FieldId::SaveConfig), &[1]);
            profile.handle_event(&transport, event);
        }
        assert_eq!(saved.borrow().len(), 3);
    }

    #[test]
    fn test_import_export() {
        let mut transport = MockTransport::new();
        let saved = RefCell::new(Vec::new());
        let restarts = Cell::new(0);
        let mut profile = setup_with(&mut transport, &saved, &restarts);

        let mut other = ConfigRecord::factory_default();
        set_text(&mut other.peer_addr, "172.16.0.9:4242");
        other.app_options.set(7, true);
        profile.import(&other).unwrap();

        let exported = profile.export().unwrap();
        assert_eq!(exported.peer_addr(), "172.16.0.9:4242");
        assert!(exported.app_options.get(7));
        assert_eq!(exported.to_bytes()[4..182], other.to_bytes()[4..182]);
    }

    #[test]
    fn test_save_event_persists_record() {
        let mut transport = MockTransport::new();
        let store = RefCell::new(ConfigStore::new(MockEeprom::new(), EEPROM_SIZE));
        let mut profile = ConfigProfile::<_, RestartFn>::setup(
            &mut transport,
            DEVICE_TYPE,
            &sample_record(),
            None,
            Some(|rec: Option<&ConfigRecord>| persist_capture(&mut *store.borrow_mut(), rec)),
            Some(ignore_restart as RestartFn),
            None,
        )
        .unwrap();

        transport.client_write(uuid_of(FieldId::DeviceName), b"Shed");
        transport.client_write(uuid_of(FieldId::AppOption(5)), &[1]);
        let event = transport.client_write(uuid_of(FieldId::SaveConfig), &[1]);
        profile.handle_event(&transport, event);
        drop(profile);

        let mut store = store.into_inner();
        match store.load().unwrap() {
            LoadOutcome::Restored(rec) => {
                assert_eq!(rec.magic_id, MAGIC_ID);
                assert_eq!(rec.device_name(), "Shed");
                assert_eq!(rec.wifi_ssid(), "Garden");
                assert!(rec.app_options.get(5));
                assert!(rec.app_options.get(2));
            }
            other => panic!("Expected restored record, got {:?}", other),
        }
    }
}
