//! BLE task for the configuration profile
//!
//! Builds the trouble-host stack, publishes the profile and serves one
//! client at a time, feeding GATT writes and a periodic tick into it.

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Ticker};
use trouble_host::prelude::*;

use crate::ble::service::{ConfigServer, PEER_ADDR_LABEL};
use crate::ble::TroubleTransport;
use crate::config::profile::{LOOP_PERIOD_MS, MAX_VALUE_LEN};
use crate::config::defaults;
use crate::profile::{
    AppDescriptors, ConfigProfile, ConnectionObserver, GattTransport, RestartHandler,
    SaveConfigHandler, TransportEvent,
};
use crate::record::{ConfigRecord, WifiOpMode};
use crate::storage::{persist_capture, ConfigStore, Eeprom};
use crate::tasks::admin::{AdminCommand, AdminSender};
use crate::tasks::led::{LedSender, LedState};

/// Number of maximum concurrent connections
const CONNECTIONS_MAX: usize = 1;
/// Number of L2CAP channels
const L2CAP_CHANNELS_MAX: usize = 3;
/// Longest name that fits a scan response
const MAX_AD_NAME_LEN: usize = 29;

/// Main BLE task
///
/// 1. Builds the host stack and the GATT server
/// 2. Publishes the profile from `record`
/// 3. Advertises under the configured device name
/// 4. Serves each connection until it drops
pub async fn ble_task<C: Controller, E: Eeprom>(
    controller: C,
    address: [u8; 6],
    mut store: ConfigStore<E>,
    record: ConfigRecord,
    admin: AdminSender,
    led: LedSender,
) {
    let mut resources: HostResources<DefaultPacketPool, CONNECTIONS_MAX, L2CAP_CHANNELS_MAX> =
        HostResources::new();
    let stack = trouble_host::new(controller, &mut resources).set_random_address(Address::random(address));
    let Host {
        mut peripheral,
        mut runner,
        ..
    } = stack.build();

    let gap = GapConfig::Peripheral(PeripheralConfig {
        name: record.device_name(),
        appearance: &appearance::UNKNOWN,
    });
    let server = match ConfigServer::new_with_config(gap) {
        Ok(s) => s,
        Err(e) => {
            log::error!("BLE: GATT server not created: {:?}", e);
            return;
        }
    };

    let descriptors = AppDescriptors {
        own_mode_features: WifiOpMode::STATION | WifiOpMode::ACCESS_POINT,
        peer_addr_label: Some(PEER_ADDR_LABEL),
        ..Default::default()
    };

    let save = |captured: Option<&ConfigRecord>| persist_capture(&mut store, captured);
    let restart = || {
        if admin.try_send(AdminCommand::Reboot).is_err() {
            log::warn!("BLE: admin queue full, restart dropped");
        }
    };
    let observer = |connected: bool| {
        let state = if connected { LedState::Connected } else { LedState::Idle };
        let _ = led.try_send(state);
    };

    let mut setup_transport = TroubleTransport::new(&server);
    let mut profile = match ConfigProfile::setup(
        &mut setup_transport,
        defaults::DEVICE_TYPE,
        &record,
        Some(&descriptors),
        Some(save),
        Some(restart),
        Some(observer),
    ) {
        Ok(p) => p,
        Err(e) => {
            log::error!("BLE: profile setup failed: {:?} (code {})", e, e.code());
            return;
        }
    };

    let name = setup_transport.advertised_name();
    let ad_name = if name.len() <= MAX_AD_NAME_LEN {
        AdStructure::CompleteLocalName(name.as_bytes())
    } else {
        AdStructure::ShortenedLocalName(&name.as_bytes()[..MAX_AD_NAME_LEN])
    };

    let mut adv_data = [0u8; 31];
    let adv_len = match AdStructure::encode_slice(
        &[AdStructure::Flags(LE_GENERAL_DISCOVERABLE | BR_EDR_NOT_SUPPORTED)],
        &mut adv_data,
    ) {
        Ok(l) => l,
        Err(_) => return,
    };
    let mut scan_data = [0u8; 31];
    let scan_len = match AdStructure::encode_slice(&[ad_name], &mut scan_data) {
        Ok(l) => l,
        Err(_) => return,
    };

    let peripheral_task = async {
        loop {
            log::info!("BLE: advertising as '{}'", name);
            let advertiser = match peripheral
                .advertise(
                    &Default::default(),
                    Advertisement::ConnectableScannableUndirected {
                        adv_data: &adv_data[..adv_len],
                        scan_data: &scan_data[..scan_len],
                    },
                )
                .await
            {
                Ok(a) => a,
                Err(_) => continue,
            };

            let acceptor = match advertiser.accept().await {
                Ok(a) => a,
                Err(_) => continue,
            };

            let conn = match acceptor.with_attribute_server(&server) {
                Ok(c) => c,
                Err(_) => continue,
            };

            serve_connection(&server, &conn, &mut profile).await;
        }
    };

    select(runner.run(), peripheral_task).await;
}

/// Feed one connection's GATT events and the liveness ticker into the profile
async fn serve_connection<S, R, O>(
    server: &ConfigServer<'_>,
    conn: &GattConnection<'_, '_, DefaultPacketPool>,
    profile: &mut ConfigProfile<S, R, O>,
) where
    S: SaveConfigHandler,
    R: RestartHandler,
    O: ConnectionObserver,
{
    let mut transport = TroubleTransport::connected(server, conn);
    profile.handle_event(&transport, TransportEvent::Connected);

    let mut ticker = Ticker::every(Duration::from_millis(LOOP_PERIOD_MS));
    loop {
        match select(conn.next(), ticker.next()).await {
            Either::First(GattConnectionEvent::Disconnected { reason: _ }) => break,
            Either::First(GattConnectionEvent::Gatt { event }) => {
                let mut data = [0u8; MAX_VALUE_LEN];
                let written = match &event {
                    GattEvent::Write(write) => {
                        let len = write.data().len().min(MAX_VALUE_LEN);
                        data[..len].copy_from_slice(&write.data()[..len]);
                        Some((write.handle(), len))
                    }
                    _ => None,
                };

                match event.accept() {
                    Ok(reply) => reply.send().await,
                    Err(_) => log::warn!("BLE: GATT reply failed"),
                }

                if let Some((handle, len)) = written {
                    // Replace the whole value so shorter writes leave no stale tail
                    if transport.set_value(handle, &data[..len]).is_ok() {
                        profile.handle_event(&transport, TransportEvent::Written(handle));
                    }
                }
            }
            Either::First(_) => {}
            Either::Second(()) => {
                let now_ms = Instant::now().as_millis() as u32;
                profile.tick(&mut transport, now_ms).await;
            }
        }
    }

    profile.handle_event(&transport, TransportEvent::Disconnected);
}
