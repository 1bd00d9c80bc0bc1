//! Device Configuration Session
//!
//! Owns the link to one LoRa node and runs the four user workflows
//! (connect, read, save, close) strictly one after another. Every workflow
//! reports its own outcome as a status message and never retries.

use crate::domain::codec::{self, CodecError, CLOSE_AP_COMMAND};
use crate::domain::models::{
    AppEvent, ConfigForm, ConnectionStatus, DeviceConfig, MessageSeverity, SessionCommand,
    StatusMessage,
};
use crate::domain::settings::{SessionConfig, SettingsService};
use crate::domain::transport::{BleDevice, BleTransport, TransportError};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::{mpsc, Notify};
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Open channels of a connected node
struct Link<D: BleDevice> {
    device: D,
    config_char: D::Characteristic,
    command_char: D::Characteristic,
}

enum SessionState<D: BleDevice> {
    Disconnected,
    Connected(Link<D>),
}

pub struct ConfigSession<T: BleTransport> {
    transport: T,
    config: SessionConfig,
    state: SessionState<T::Device>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    cancel: Arc<Notify>,
}

impl<T: BleTransport> ConfigSession<T> {
    pub fn new(
        transport: T,
        event_sender: mpsc::UnboundedSender<AppEvent>,
        cancel: Arc<Notify>,
    ) -> Self {
        Self {
            transport,
            config: SessionConfig::default(),
            state: SessionState::Disconnected,
            event_sender,
            cancel,
        }
    }

    /// Replace the settings snapshot used by subsequent workflows
    pub fn reconfigure(&mut self, config: SessionConfig) {
        self.config = config;
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected(_))
    }

    /// Probe the host Bluetooth capability. Returns `false` and tells the UI
    /// to disable connecting when it is missing.
    pub async fn check_availability(&self) -> bool {
        match self.transport.availability().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Bluetooth unavailable: {}", e);
                let _ = self
                    .event_sender
                    .send(AppEvent::BluetoothUnavailable(e.to_string()));
                self.send_log(e.to_string(), MessageSeverity::Error);
                false
            }
        }
    }

    /// Discover, connect and resolve both channels, then load the
    /// configuration. Returns the connected device's name.
    pub async fn connect(&mut self) -> Result<String, SessionError> {
        if self.is_connected() {
            info!("Replacing existing connection");
            self.teardown().await;
        }

        self.send_status(ConnectionStatus::Connecting);

        match self.open_link().await {
            Ok(link) => {
                let name = link.device.name();
                info!("Connected to {}", name);
                self.state = SessionState::Connected(link);
                self.send_log("Connected successfully!", MessageSeverity::Success);
                self.send_status(ConnectionStatus::Connected);

                // A failed initial read is reported by read_config itself
                let _ = self.read_config().await;
                Ok(name)
            }
            Err(e) => {
                error!("BLE error: {}", e);
                self.send_log(format!("Connection Failed: {}", e), MessageSeverity::Error);
                self.send_status(ConnectionStatus::Disconnected);
                Err(e)
            }
        }
    }

    async fn open_link(&self) -> Result<Link<T::Device>, SessionError> {
        self.send_log("Scanning for LoRa Node...", MessageSeverity::Info);

        let mut device = tokio::select! {
            found = self
                .transport
                .request_device(self.config.service_uuid, self.config.scan_timeout) => found?,
            _ = self.cancel.notified() => {
                return Err(TransportError::SelectionCancelled.into());
            }
        };

        let name = device.name();
        self.send_log(format!("Connecting to {}...", name), MessageSeverity::Info);
        let _ = self.event_sender.send(AppEvent::DeviceSelected(name));

        let resolved = tokio::select! {
            resolved = self.establish(&mut device) => resolved,
            _ = self.cancel.notified() => Err(TransportError::ConnectCancelled),
        };

        match resolved {
            Ok((config_char, command_char)) => Ok(Link {
                device,
                config_char,
                command_char,
            }),
            Err(e) => {
                if let Err(disconnect_err) = device.disconnect().await {
                    warn!("Cleanup disconnect failed: {}", disconnect_err);
                }
                Err(e.into())
            }
        }
    }

    async fn establish(
        &self,
        device: &mut T::Device,
    ) -> Result<
        (
            <T::Device as BleDevice>::Characteristic,
            <T::Device as BleDevice>::Characteristic,
        ),
        TransportError,
    > {
        device.connect().await?;
        self.resolve_channels(device).await
    }

    async fn resolve_channels(
        &self,
        device: &T::Device,
    ) -> Result<
        (
            <T::Device as BleDevice>::Characteristic,
            <T::Device as BleDevice>::Characteristic,
        ),
        TransportError,
    > {
        let service = device.primary_service(self.config.service_uuid).await?;
        info!("Found node service");

        let config_char = device
            .characteristic(&service, self.config.config_char_uuid)
            .await?;
        info!("Found config characteristic");

        let command_char = device
            .characteristic(&service, self.config.command_char_uuid)
            .await?;
        info!("Found command characteristic");

        Ok((config_char, command_char))
    }

    /// Read the node configuration and publish it to the form
    pub async fn read_config(&mut self) -> Result<DeviceConfig, SessionError> {
        match self.try_read_config().await {
            Ok(config) => {
                info!("Configuration loaded: {:?}", config);
                let _ = self
                    .event_sender
                    .send(AppEvent::ConfigLoaded(config.clone()));
                self.send_log("Configuration loaded.", MessageSeverity::Success);
                Ok(config)
            }
            Err(e) => {
                error!("Read error: {}", e);
                self.send_log(
                    format!("Failed to read config: {}", e),
                    MessageSeverity::Error,
                );
                self.drop_lost_link(&e).await;
                Err(e)
            }
        }
    }

    async fn try_read_config(&self) -> Result<DeviceConfig, SessionError> {
        let link = self.link()?;
        self.send_log("Reading configuration...", MessageSeverity::Info);
        let bytes = link.device.read(&link.config_char).await?;
        Ok(codec::decode_config(&bytes)?)
    }

    /// Coerce the form and write it to the config characteristic
    pub async fn save_config(&mut self, form: &ConfigForm) -> Result<(), SessionError> {
        match self.try_save_config(form).await {
            Ok(()) => {
                self.send_log("Configuration saved!", MessageSeverity::Success);
                Ok(())
            }
            Err(e) => {
                error!("Save error: {}", e);
                self.send_log(
                    format!("Failed to save config: {}", e),
                    MessageSeverity::Error,
                );
                self.drop_lost_link(&e).await;
                Err(e)
            }
        }
    }

    async fn try_save_config(&self, form: &ConfigForm) -> Result<(), SessionError> {
        let link = self.link()?;
        self.send_log("Saving configuration...", MessageSeverity::Info);

        let payload = codec::payload_from_form(form, self.config.strict_numeric_fields)?;
        if payload.node_id.is_none() || payload.interval.is_none() || payload.default_dest.is_none()
        {
            warn!("Saving configuration with non-numeric fields: {:?}", payload);
        }

        let bytes = codec::encode_payload(&payload)?;
        link.device.write(&link.config_char, &bytes).await?;
        info!("Wrote {} bytes to config characteristic", bytes.len());
        Ok(())
    }

    /// Tell the node to stop its BLE service, then disconnect locally
    pub async fn close_ble_service(&mut self) -> Result<(), SessionError> {
        match self.send_close_command().await {
            Ok(()) => {
                self.send_log(
                    "BLE service stopped on node. Disconnecting...",
                    MessageSeverity::Warning,
                );
                self.teardown().await;
                self.send_log("Disconnected.", MessageSeverity::Info);
                Ok(())
            }
            Err(e) => {
                error!("Command error: {}", e);
                self.send_log(
                    format!("Failed to send command: {}", e),
                    MessageSeverity::Error,
                );
                if self.config.disconnect_on_command_failure && self.is_connected() {
                    self.teardown().await;
                } else {
                    self.drop_lost_link(&e).await;
                }
                Err(e)
            }
        }
    }

    async fn send_close_command(&self) -> Result<(), SessionError> {
        let link = self.link()?;
        self.send_log("Sending CLOSE_AP command...", MessageSeverity::Info);
        link.device.write(&link.command_char, CLOSE_AP_COMMAND).await?;
        Ok(())
    }

    /// Execute one UI command
    pub async fn handle(&mut self, command: SessionCommand) -> Result<(), SessionError> {
        match command {
            SessionCommand::Connect => self.connect().await.map(|_| ()),
            SessionCommand::ReadConfig => self.read_config().await.map(|_| ()),
            SessionCommand::SaveConfig(form) => self.save_config(&form).await,
            SessionCommand::CloseBleService => self.close_ble_service().await,
        }
    }

    /// Worker loop: probe availability, then run commands until the UI
    /// side of the channel is dropped.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        settings: Arc<Mutex<SettingsService>>,
    ) {
        self.check_availability().await;

        while let Some(command) = commands.recv().await {
            let snapshot = settings
                .lock()
                .map_err(|_| anyhow::anyhow!("Failed to lock settings"))
                .and_then(|s| s.saved().session_config());

            match snapshot {
                Ok(config) => self.reconfigure(config),
                Err(e) if matches!(command, SessionCommand::Connect) => {
                    error!("Invalid settings: {}", e);
                    self.send_log(format!("Connection Failed: {}", e), MessageSeverity::Error);
                    let _ = self.event_sender.send(AppEvent::WorkflowFinished);
                    continue;
                }
                Err(e) => warn!("Keeping previous settings: {}", e),
            }

            let is_connect = matches!(command, SessionCommand::Connect);
            match self.handle(command).await {
                Ok(()) if is_connect => {
                    if let Some(name) = self.device_name() {
                        if let Ok(mut settings) = settings.lock() {
                            if let Err(e) = settings.remember_device(&name) {
                                warn!("Failed to save settings: {}", e);
                            }
                        }
                    }
                }
                Ok(()) => {}
                Err(e) => info!("Workflow ended with error: {}", e),
            }

            let _ = self.event_sender.send(AppEvent::WorkflowFinished);
        }

        info!("Command channel closed, shutting down session");
        if self.is_connected() {
            self.teardown().await;
        }
    }

    fn device_name(&self) -> Option<String> {
        match &self.state {
            SessionState::Connected(link) => Some(link.device.name()),
            SessionState::Disconnected => None,
        }
    }

    fn link(&self) -> Result<&Link<T::Device>, SessionError> {
        match &self.state {
            SessionState::Connected(link) => Ok(link),
            SessionState::Disconnected => Err(TransportError::NotConnected.into()),
        }
    }

    /// Leave the connected state, disconnecting the device if it is still up
    async fn teardown(&mut self) {
        let state = std::mem::replace(&mut self.state, SessionState::Disconnected);
        if let SessionState::Connected(mut link) = state {
            if let Err(e) = link.device.disconnect().await {
                warn!("Disconnect failed: {}", e);
            }
            info!("Disconnected from {}", link.device.name());
        }
        self.send_status(ConnectionStatus::Disconnected);
    }

    /// After a failed radio operation, forget the link if the device went away.
    /// Local codec failures never touch the link.
    async fn drop_lost_link(&mut self, cause: &SessionError) {
        if !matches!(cause, SessionError::Transport(_)) {
            return;
        }
        let lost = match &self.state {
            SessionState::Connected(link) => !link.device.is_connected().await,
            SessionState::Disconnected => false,
        };
        if lost {
            warn!("Connection to the node was lost");
            self.teardown().await;
        }
    }

    fn send_status(&self, status: ConnectionStatus) {
        let _ = self.event_sender.send(AppEvent::ConnectionStatus(status));
    }

    fn send_log(&self, message: impl Into<String>, severity: MessageSeverity) {
        let _ = self
            .event_sender
            .send(AppEvent::LogMessage(StatusMessage::new(message, severity)));
    }
}
