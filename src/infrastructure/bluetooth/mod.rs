//! Bluetooth Module
//!
//! Platform implementations of the BLE transport used by the configuration
//! session.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    ConfigSession                         │
//! │   (domain::session, generic over BleTransport)           │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!         ┌─────────────┼──────────────┐
//!         │             │              │
//!         ▼             ▼              ▼
//! ┌──────────────┐ ┌───────────┐ ┌─────────────┐
//! │    WinRT     │ │ btleplug  │ │ Unsupported │
//! │  (windows)   │ │ (feature) │ │ (fallback)  │
//! └──────────────┘ └───────────┘ └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`scanner`] - advertisement discovery (WinRT)
//! - [`connection`] - device connection and GATT access (WinRT)
//! - [`protocol`] - GUID and buffer conversions (WinRT)
//! - `btle` - btleplug backend
//! - `unsupported` - reports Bluetooth as absent

#[cfg(windows)]
pub mod connection;
#[cfg(windows)]
pub mod protocol;
#[cfg(windows)]
pub mod scanner;

#[cfg(all(not(windows), feature = "btleplug"))]
mod btle;

#[cfg(all(not(windows), not(feature = "btleplug")))]
mod unsupported;

#[cfg(windows)]
pub type PlatformTransport = scanner::WinRtTransport;

#[cfg(all(not(windows), feature = "btleplug"))]
pub type PlatformTransport = btle::BtleplugTransport;

#[cfg(all(not(windows), not(feature = "btleplug")))]
pub type PlatformTransport = unsupported::UnsupportedTransport;

/// Transport for the current host
pub fn platform_transport() -> PlatformTransport {
    PlatformTransport::new()
}
