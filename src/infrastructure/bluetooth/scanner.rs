//! BLE Scanner Module
//!
//! Discovers LoRa nodes by their advertised service UUID using the WinRT
//! advertisement watcher.

use crate::domain::transport::{BleTransport, TransportError};
use crate::infrastructure::bluetooth::connection::WinRtDevice;
use crate::infrastructure::bluetooth::protocol;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use windows::Devices::Bluetooth::Advertisement::{
    BluetoothLEAdvertisementReceivedEventArgs, BluetoothLEAdvertisementWatcher,
    BluetoothLEScanningMode,
};
use windows::Devices::Bluetooth::BluetoothAdapter;
use windows::Foundation::TypedEventHandler;

/// A device seen advertising the node service
#[derive(Debug, Clone)]
struct Advertisement {
    name: String,
    address: u64,
    signal_strength: i16,
}

#[derive(Default)]
pub struct WinRtTransport;

impl WinRtTransport {
    pub fn new() -> Self {
        Self
    }
}

/// Running advertisement watcher, stopped when dropped
struct ActiveScan {
    watcher: BluetoothLEAdvertisementWatcher,
}

impl ActiveScan {
    fn start(
        service_uuid: Uuid,
        sender: mpsc::UnboundedSender<Advertisement>,
    ) -> windows::core::Result<Self> {
        let watcher = BluetoothLEAdvertisementWatcher::new()?;
        watcher.SetScanningMode(BluetoothLEScanningMode::Active)?;

        let target_uuid = protocol::to_guid(service_uuid);

        let handler = TypedEventHandler::new(
            move |_: windows::core::Ref<BluetoothLEAdvertisementWatcher>,
                  args: windows::core::Ref<BluetoothLEAdvertisementReceivedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    let adv = args.Advertisement()?;
                    let service_uuids = adv.ServiceUuids()?;

                    let mut found = false;
                    for i in 0..service_uuids.Size()? {
                        if service_uuids.GetAt(i)? == target_uuid {
                            found = true;
                            break;
                        }
                    }

                    if found {
                        let name = adv.LocalName()?.to_string();
                        let _ = sender.send(Advertisement {
                            name: if name.is_empty() {
                                "Unknown".to_string()
                            } else {
                                name
                            },
                            address: args.BluetoothAddress()?,
                            signal_strength: args.RawSignalStrengthInDBm()?,
                        });
                    }
                }
                Ok(())
            },
        );

        watcher.Received(&handler)?;
        watcher.Start()?;
        Ok(Self { watcher })
    }
}

impl Drop for ActiveScan {
    fn drop(&mut self) {
        info!("Stopping BLE scan...");
        if let Err(e) = self.watcher.Stop() {
            warn!("Failed to stop advertisement watcher: {}", e);
        }
    }
}

async fn default_adapter() -> windows::core::Result<BluetoothAdapter> {
    BluetoothAdapter::GetDefaultAsync()?.await
}

impl BleTransport for WinRtTransport {
    type Device = WinRtDevice;

    async fn availability(&self) -> Result<(), TransportError> {
        let adapter = default_adapter()
            .await
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;

        if adapter.IsLowEnergySupported()? {
            Ok(())
        } else {
            Err(TransportError::Unavailable(
                "the default adapter does not support Bluetooth LE".to_string(),
            ))
        }
    }

    async fn request_device(
        &self,
        service: Uuid,
        timeout: Duration,
    ) -> Result<WinRtDevice, TransportError> {
        info!("Starting BLE scan for service UUID: {}", service);

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let scan = ActiveScan::start(service, sender)?;
        let found = tokio::time::timeout(timeout, receiver.recv()).await;
        drop(scan);

        match found {
            Ok(Some(adv)) => {
                debug!(
                    "Selected {} ({:#X}, {} dBm)",
                    adv.name, adv.address, adv.signal_strength
                );
                Ok(WinRtDevice::new(adv.address, adv.name))
            }
            _ => Err(TransportError::NoDeviceFound(service)),
        }
    }
}
