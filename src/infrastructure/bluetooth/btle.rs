//! btleplug backend for Linux and macOS hosts

use crate::domain::transport::{BleDevice, BleTransport, TransportError};
use btleplug::api::{
    Central, CharPropFlags, Characteristic, Manager as _, Peripheral as _, ScanFilter, Service,
    WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

impl From<btleplug::Error> for TransportError {
    fn from(e: btleplug::Error) -> Self {
        TransportError::Gatt(e.to_string())
    }
}

/// Get the default Bluetooth adapter
async fn get_adapter() -> Result<Adapter, TransportError> {
    let manager = Manager::new()
        .await
        .map_err(|e| TransportError::Unavailable(e.to_string()))?;
    let adapters = manager
        .adapters()
        .await
        .map_err(|e| TransportError::Unavailable(e.to_string()))?;
    adapters
        .into_iter()
        .next()
        .ok_or_else(|| TransportError::Unavailable("No Bluetooth adapter found".to_string()))
}

#[derive(Default)]
pub struct BtleplugTransport;

impl BtleplugTransport {
    pub fn new() -> Self {
        Self
    }

    async fn find_advertiser(
        adapter: &Adapter,
        service: Uuid,
    ) -> Result<Option<BtleplugDevice>, TransportError> {
        for peripheral in adapter.peripherals().await? {
            if let Some(props) = peripheral.properties().await? {
                if props.services.contains(&service) {
                    let name = props.local_name.unwrap_or_else(|| "Unknown".to_string());
                    info!("Found device: {} ({})", name, peripheral.address());
                    return Ok(Some(BtleplugDevice { peripheral, name }));
                }
            }
        }
        Ok(None)
    }
}

impl BleTransport for BtleplugTransport {
    type Device = BtleplugDevice;

    async fn availability(&self) -> Result<(), TransportError> {
        get_adapter().await.map(|_| ())
    }

    async fn request_device(
        &self,
        service: Uuid,
        timeout: Duration,
    ) -> Result<BtleplugDevice, TransportError> {
        let adapter = get_adapter().await?;
        info!("Starting BLE scan for service UUID: {}", service);
        adapter
            .start_scan(ScanFilter {
                services: vec![service],
            })
            .await?;
        let _scan = ActiveScan {
            adapter: adapter.clone(),
        };

        let poll = async {
            loop {
                if let Some(device) = Self::find_advertiser(&adapter, service).await? {
                    return Ok::<_, TransportError>(device);
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        match tokio::time::timeout(timeout, poll).await {
            Ok(found) => found,
            Err(_) => Err(TransportError::NoDeviceFound(service)),
        }
    }
}

/// Stops the adapter scan when discovery ends, including when a cancel
/// drops the discovery future
struct ActiveScan {
    adapter: Adapter,
}

impl Drop for ActiveScan {
    fn drop(&mut self) {
        let adapter = self.adapter.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = adapter.stop_scan().await {
                        warn!("Failed to stop scan: {}", e);
                    }
                });
            }
            Err(_) => warn!("No runtime left to stop the BLE scan"),
        }
    }
}

pub struct BtleplugDevice {
    peripheral: Peripheral,
    name: String,
}

impl BleDevice for BtleplugDevice {
    type Service = Service;
    type Characteristic = Characteristic;

    fn name(&self) -> String {
        self.name.clone()
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        self.peripheral.connect().await?;
        self.peripheral.discover_services().await?;
        Ok(())
    }

    async fn primary_service(&self, uuid: Uuid) -> Result<Service, TransportError> {
        self.peripheral
            .services()
            .into_iter()
            .find(|s| s.uuid == uuid && s.primary)
            .ok_or(TransportError::ServiceNotFound(uuid))
    }

    async fn characteristic(
        &self,
        service: &Service,
        uuid: Uuid,
    ) -> Result<Characteristic, TransportError> {
        service
            .characteristics
            .iter()
            .find(|c| c.uuid == uuid)
            .cloned()
            .ok_or(TransportError::CharacteristicNotFound(uuid))
    }

    async fn read(&self, characteristic: &Characteristic) -> Result<Vec<u8>, TransportError> {
        Ok(self.peripheral.read(characteristic).await?)
    }

    async fn write(
        &self,
        characteristic: &Characteristic,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let write_type = if characteristic.properties.contains(CharPropFlags::WRITE) {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        Ok(self
            .peripheral
            .write(characteristic, data, write_type)
            .await?)
    }

    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        Ok(self.peripheral.disconnect().await?)
    }
}
