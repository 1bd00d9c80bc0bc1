use serde::{Deserialize, Serialize};

/// Configuration record stored on the LoRa node.
///
/// Field names follow the node's JSON schema (`nodeId`, `networkId`,
/// `interval`, `defaultDest`). Every field is required when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    pub node_id: i64,
    pub network_id: String,
    /// Reporting period in seconds
    pub interval: i64,
    pub default_dest: i64,
}

/// Outgoing configuration as coerced from the form.
///
/// `None` is the not-a-number sentinel and is written as JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    pub node_id: Option<i64>,
    pub network_id: String,
    pub interval: Option<i64>,
    pub default_dest: Option<i64>,
}

/// The four editable fields shown once connected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigForm {
    pub node_id: String,
    pub network_id: String,
    pub interval: String,
    pub default_dest: String,
}

impl ConfigForm {
    /// Copy a configuration read from the node into the form fields
    pub fn fill_from(&mut self, config: &DeviceConfig) {
        self.node_id = config.node_id.to_string();
        self.network_id = config.network_id.clone();
        self.interval = config.interval.to_string();
        self.default_dest = config.default_dest.to_string();
    }
}

impl From<&DeviceConfig> for ConfigForm {
    fn from(config: &DeviceConfig) -> Self {
        let mut form = Self::default();
        form.fill_from(config);
        form
    }
}

/// Commands sent from the UI to the session worker
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Connect,
    ReadConfig,
    SaveConfig(ConfigForm),
    CloseBleService,
}

/// Events sent from the session worker to the UI
#[derive(Debug, Clone)]
pub enum AppEvent {
    ConnectionStatus(ConnectionStatus),
    LogMessage(StatusMessage),
    ConfigLoaded(DeviceConfig),
    DeviceSelected(String),
    BluetoothUnavailable(String),
    WorkflowFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>, severity: MessageSeverity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_shows_read_fields() {
        let config = DeviceConfig {
            node_id: 5,
            network_id: "net-A".to_string(),
            interval: 60,
            default_dest: 1,
        };
        let form = ConfigForm::from(&config);
        assert_eq!(form.node_id, "5");
        assert_eq!(form.network_id, "net-A");
        assert_eq!(form.interval, "60");
        assert_eq!(form.default_dest, "1");
    }

    #[test]
    fn test_sentinel_serializes_as_null() {
        let payload = ConfigPayload {
            node_id: None,
            network_id: "x".to_string(),
            interval: Some(10),
            default_dest: Some(-2),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"nodeId":null,"networkId":"x","interval":10,"defaultDest":-2}"#
        );
    }
}
