//! Placeholder backend for hosts without a Bluetooth LE implementation

use crate::domain::transport::{BleDevice, BleTransport, TransportError};
use std::time::Duration;
use uuid::Uuid;

const REASON: &str =
    "no Bluetooth LE backend on this platform (build with the `btleplug` feature)";

#[derive(Default)]
pub struct UnsupportedTransport;

impl UnsupportedTransport {
    pub fn new() -> Self {
        Self
    }
}

/// Uninhabited: discovery never yields a device
pub enum NoDevice {}

impl BleTransport for UnsupportedTransport {
    type Device = NoDevice;

    async fn availability(&self) -> Result<(), TransportError> {
        Err(TransportError::Unavailable(REASON.to_string()))
    }

    async fn request_device(
        &self,
        _service: Uuid,
        _timeout: Duration,
    ) -> Result<NoDevice, TransportError> {
        Err(TransportError::Unavailable(REASON.to_string()))
    }
}

impl BleDevice for NoDevice {
    type Service = ();
    type Characteristic = ();

    fn name(&self) -> String {
        match *self {}
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        match *self {}
    }

    async fn primary_service(&self, _uuid: Uuid) -> Result<(), TransportError> {
        match *self {}
    }

    async fn characteristic(&self, _service: &(), _uuid: Uuid) -> Result<(), TransportError> {
        match *self {}
    }

    async fn read(&self, _characteristic: &()) -> Result<Vec<u8>, TransportError> {
        match *self {}
    }

    async fn write(&self, _characteristic: &(), _data: &[u8]) -> Result<(), TransportError> {
        match *self {}
    }

    async fn is_connected(&self) -> bool {
        match *self {}
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_unavailable() {
        let transport = UnsupportedTransport::new();
        assert!(matches!(
            transport.availability().await,
            Err(TransportError::Unavailable(_))
        ));
        assert!(transport
            .request_device(Uuid::nil(), Duration::from_secs(1))
            .await
            .is_err());
    }
}
