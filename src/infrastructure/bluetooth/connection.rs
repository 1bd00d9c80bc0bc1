//! BLE Connection Module
//!
//! Connects to a discovered node and exposes its GATT service and
//! characteristics through the WinRT APIs.

use crate::domain::transport::{BleDevice, TransportError};
use crate::infrastructure::bluetooth::protocol::{self, check_status};
use tracing::{info, warn};
use uuid::Uuid;
use windows::Devices::Bluetooth::GenericAttributeProfile::{
    GattCharacteristic, GattCharacteristicProperties, GattDeviceService, GattSession,
    GattWriteOption,
};
use windows::Devices::Bluetooth::{BluetoothCacheMode, BluetoothConnectionStatus, BluetoothLEDevice};

pub struct WinRtDevice {
    address: u64,
    name: String,
    device: Option<BluetoothLEDevice>,
    // Keeps the link up between operations
    gatt_session: Option<GattSession>,
}

impl WinRtDevice {
    pub fn new(address: u64, name: String) -> Self {
        Self {
            address,
            name,
            device: None,
            gatt_session: None,
        }
    }

    fn device(&self) -> Result<&BluetoothLEDevice, TransportError> {
        self.device.as_ref().ok_or(TransportError::NotConnected)
    }
}

async fn create_gatt_session(device: &BluetoothLEDevice) -> Result<GattSession, TransportError> {
    let device_id = device.BluetoothDeviceId()?;
    let session = GattSession::FromDeviceIdAsync(&device_id)?.await?;
    session.SetMaintainConnection(true)?;
    Ok(session)
}

impl BleDevice for WinRtDevice {
    type Service = GattDeviceService;
    type Characteristic = GattCharacteristic;

    fn name(&self) -> String {
        self.name.clone()
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        info!("Connecting to Bluetooth device: {:#X}", self.address);
        let device = BluetoothLEDevice::FromBluetoothAddressAsync(self.address)?.await?;
        info!("Device connected: {:?}", device.Name()?);

        match create_gatt_session(&device).await {
            Ok(session) => {
                info!("GattSession created, MaintainConnection set to true");
                self.gatt_session = Some(session);
            }
            Err(e) => warn!("Failed to create GattSession, continuing anyway: {}", e),
        }

        self.device = Some(device);
        Ok(())
    }

    async fn primary_service(&self, uuid: Uuid) -> Result<GattDeviceService, TransportError> {
        let device = self.device()?;

        let services_result = device
            .GetGattServicesForUuidWithCacheModeAsync(
                protocol::to_guid(uuid),
                BluetoothCacheMode::Uncached,
            )?
            .await?;
        check_status(services_result.Status()?, "Service discovery")?;

        let services = services_result.Services()?;
        if services.Size()? == 0 {
            return Err(TransportError::ServiceNotFound(uuid));
        }
        Ok(services.GetAt(0)?)
    }

    async fn characteristic(
        &self,
        service: &GattDeviceService,
        uuid: Uuid,
    ) -> Result<GattCharacteristic, TransportError> {
        let chars_result = service
            .GetCharacteristicsForUuidWithCacheModeAsync(
                protocol::to_guid(uuid),
                BluetoothCacheMode::Uncached,
            )?
            .await?;
        check_status(chars_result.Status()?, "Characteristic discovery")?;

        let characteristics = chars_result.Characteristics()?;
        if characteristics.Size()? == 0 {
            return Err(TransportError::CharacteristicNotFound(uuid));
        }
        Ok(characteristics.GetAt(0)?)
    }

    async fn read(&self, characteristic: &GattCharacteristic) -> Result<Vec<u8>, TransportError> {
        let result = characteristic
            .ReadValueWithCacheModeAsync(BluetoothCacheMode::Uncached)?
            .await?;
        check_status(result.Status()?, "Read")?;
        Ok(protocol::buffer_to_vec(&result.Value()?)?)
    }

    async fn write(
        &self,
        characteristic: &GattCharacteristic,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let buffer = protocol::bytes_to_buffer(data)?;

        // Write-only command characteristics may not acknowledge writes
        let props = characteristic.CharacteristicProperties()?;
        let option = if props.0 & GattCharacteristicProperties::Write.0 != 0 {
            GattWriteOption::WriteWithResponse
        } else {
            GattWriteOption::WriteWithoutResponse
        };

        let status = characteristic
            .WriteValueWithOptionAsync(&buffer, option)?
            .await?;
        check_status(status, "Write")
    }

    async fn is_connected(&self) -> bool {
        self.device
            .as_ref()
            .and_then(|d| d.ConnectionStatus().ok())
            .map(|s| s == BluetoothConnectionStatus::Connected)
            .unwrap_or(false)
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        if let Some(session) = self.gatt_session.take() {
            if let Err(e) = session.Close() {
                warn!("Failed to close GattSession: {}", e);
            }
        }
        if let Some(device) = self.device.take() {
            if let Err(e) = device.Close() {
                warn!("Failed to close device: {}", e);
                return Err(e.into());
            }
            info!("Disconnected from device {:#X}", self.address);
        }
        Ok(())
    }
}
