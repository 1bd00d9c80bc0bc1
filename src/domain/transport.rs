//! BLE transport seam
//!
//! The session only talks to the node through these traits. Each platform
//! backend in `infrastructure::bluetooth` provides one implementation.

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Bluetooth LE is not available: {0}")]
    Unavailable(String),
    #[error("device selection was cancelled")]
    SelectionCancelled,
    #[error("connection attempt was cancelled")]
    ConnectCancelled,
    #[error("no device advertising service {0} was found")]
    NoDeviceFound(Uuid),
    #[error("service {0} not found on device")]
    ServiceNotFound(Uuid),
    #[error("characteristic {0} not found")]
    CharacteristicNotFound(Uuid),
    #[error("not connected to a LoRa node")]
    NotConnected,
    #[error("GATT operation failed: {0}")]
    Gatt(String),
}

/// Host Bluetooth capability: availability probe and device discovery
#[allow(async_fn_in_trait)]
pub trait BleTransport {
    type Device: BleDevice;

    /// Fails when the host has no usable Bluetooth LE adapter
    async fn availability(&self) -> Result<(), TransportError>;

    /// Discover the first device advertising `service`, giving up after `timeout`
    async fn request_device(
        &self,
        service: Uuid,
        timeout: Duration,
    ) -> Result<Self::Device, TransportError>;
}

/// A discovered peripheral and its GATT surface
#[allow(async_fn_in_trait)]
pub trait BleDevice {
    type Service;
    type Characteristic;

    fn name(&self) -> String;

    async fn connect(&mut self) -> Result<(), TransportError>;

    async fn primary_service(&self, uuid: Uuid) -> Result<Self::Service, TransportError>;

    async fn characteristic(
        &self,
        service: &Self::Service,
        uuid: Uuid,
    ) -> Result<Self::Characteristic, TransportError>;

    async fn read(&self, characteristic: &Self::Characteristic) -> Result<Vec<u8>, TransportError>;

    async fn write(
        &self,
        characteristic: &Self::Characteristic,
        data: &[u8],
    ) -> Result<(), TransportError>;

    async fn is_connected(&self) -> bool;

    async fn disconnect(&mut self) -> Result<(), TransportError>;
}
