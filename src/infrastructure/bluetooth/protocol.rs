//! WinRT conversions
//!
//! Bridges between the portable types used by the session (`uuid::Uuid`,
//! byte slices) and their WinRT counterparts (`GUID`, `IBuffer`).

use crate::domain::transport::TransportError;
use uuid::Uuid;
use windows::core::GUID;
use windows::Devices::Bluetooth::GenericAttributeProfile::GattCommunicationStatus;
use windows::Storage::Streams::{DataReader, DataWriter, IBuffer};

impl From<windows::core::Error> for TransportError {
    fn from(e: windows::core::Error) -> Self {
        TransportError::Gatt(e.to_string())
    }
}

/// Convert a UUID into a Windows GUID
pub fn to_guid(uuid: Uuid) -> GUID {
    GUID::from_u128(uuid.as_u128())
}

/// Copy an IBuffer into an owned byte vector
pub fn buffer_to_vec(buffer: &IBuffer) -> windows::core::Result<Vec<u8>> {
    let reader = DataReader::FromBuffer(buffer)?;
    let length = reader.UnconsumedBufferLength()? as usize;
    let mut bytes = vec![0u8; length];
    reader.ReadBytes(&mut bytes)?;
    Ok(bytes)
}

/// Wrap bytes into an IBuffer for a characteristic write
pub fn bytes_to_buffer(bytes: &[u8]) -> windows::core::Result<IBuffer> {
    let writer = DataWriter::new()?;
    writer.WriteBytes(bytes)?;
    writer.DetachBuffer()
}

/// Map a GATT status to an error unless it is `Success`
pub fn check_status(status: GattCommunicationStatus, what: &str) -> Result<(), TransportError> {
    if status == GattCommunicationStatus::Success {
        Ok(())
    } else {
        Err(TransportError::Gatt(format!("{} returned {:?}", what, status)))
    }
}
