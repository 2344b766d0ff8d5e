//! BLE client for the configuration profile.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Result};
use btleplug::api::{
    Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, ValueNotification,
    WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::time::timeout;
use uuid::Uuid;

use crate::profile;

/// Connected configuration device.
pub struct ConfigClient {
    peripheral: Peripheral,
    characteristics: HashMap<Uuid, Characteristic>,
}

impl ConfigClient {
    /// Scan for a device by name, connect and discover the profile.
    pub async fn connect_by_name(name: &str, scan_timeout: Duration) -> Result<Self> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = adapters
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No Bluetooth adapters found"))?;

        adapter.start_scan(ScanFilter::default()).await?;
        let peripheral = Self::find_device_by_name(&adapter, name, scan_timeout).await?;
        adapter.stop_scan().await?;

        peripheral.connect().await?;
        peripheral.discover_services().await?;

        for service in [
            profile::DEVICE_MANAGEMENT,
            profile::NETWORK_CONFIGURATION,
            profile::APPLICATION_RUNTIME,
        ] {
            if !peripheral.services().iter().any(|s| s.uuid == service) {
                return Err(anyhow!("Service {} not found", service));
            }
        }

        let characteristics = peripheral
            .characteristics()
            .into_iter()
            .map(|c| (c.uuid, c))
            .collect();

        Ok(Self {
            peripheral,
            characteristics,
        })
    }

    /// Find a device by name within the scan timeout.
    async fn find_device_by_name(
        adapter: &Adapter,
        name: &str,
        scan_timeout: Duration,
    ) -> Result<Peripheral> {
        let start = std::time::Instant::now();

        while start.elapsed() < scan_timeout {
            for peripheral in adapter.peripherals().await? {
                if let Some(props) = peripheral.properties().await? {
                    if props.local_name.as_deref() == Some(name) {
                        return Ok(peripheral);
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        Err(anyhow!("Device '{}' not found within timeout", name))
    }

    fn characteristic(&self, group: u32) -> Result<&Characteristic> {
        self.characteristics
            .get(&profile::attribute(group))
            .ok_or_else(|| anyhow!("Characteristic {:#06x} not found", group))
    }

    /// Raw value of a characteristic.
    pub async fn read(&self, group: u32) -> Result<Vec<u8>> {
        Ok(self.peripheral.read(self.characteristic(group)?).await?)
    }

    /// Text value of a characteristic, without the NUL padding.
    pub async fn read_text(&self, group: u32) -> Result<String> {
        let raw = self.read(group).await?;
        let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..len]).into_owned())
    }

    pub async fn write(&self, group: u32, data: &[u8]) -> Result<()> {
        self.peripheral
            .write(self.characteristic(group)?, data, WriteType::WithResponse)
            .await?;
        Ok(())
    }

    /// Value of descriptor `index` of a characteristic, if present.
    pub async fn read_descriptor(&self, group: u32, index: u16) -> Result<Option<Vec<u8>>> {
        let uuid = profile::descriptor(group, index);
        let Some(descriptor) = self
            .characteristic(group)?
            .descriptors
            .iter()
            .find(|d| d.uuid == uuid)
        else {
            return Ok(None);
        };
        Ok(Some(self.peripheral.read_descriptor(descriptor).await?))
    }

    /// Subscribe to a characteristic and return the notification stream.
    pub async fn subscribe(&self, group: u32) -> Result<BoxStream<'static, ValueNotification>> {
        let stream = self.peripheral.notifications().await?;
        self.peripheral.subscribe(self.characteristic(group)?).await?;
        Ok(stream)
    }

    pub async fn unsubscribe(&self, group: u32) -> Result<()> {
        self.peripheral.unsubscribe(self.characteristic(group)?).await?;
        Ok(())
    }

    /// Next notification of `uuid`, waiting at most `wait`.
    pub async fn next_notification(
        stream: &mut BoxStream<'static, ValueNotification>,
        uuid: Uuid,
        wait: Duration,
    ) -> Result<Vec<u8>> {
        timeout(wait, async {
            while let Some(n) = stream.next().await {
                if n.uuid == uuid {
                    return Ok(n.value);
                }
            }
            Err(anyhow!("Notification stream closed"))
        })
        .await
        .map_err(|_| anyhow!("Timeout waiting for notification"))?
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}
