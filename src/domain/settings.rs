use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_true(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_true(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "lora_node_configurator".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Logging Settings
    #[serde(default)]
    pub log_settings: LogSettings,

    // Node GATT layout
    #[serde(default = "default_service_uuid")]
    pub ble_service_uuid: String,
    #[serde(default = "default_config_uuid")]
    pub ble_config_char_uuid: String,
    #[serde(default = "default_command_uuid")]
    pub ble_command_char_uuid: String,

    // Discovery
    #[serde(default = "default_scan_timeout_secs")]
    pub scan_timeout_secs: u64,
    #[serde(default)]
    pub last_device_name: Option<String>,

    // Workflow behavior
    #[serde(default = "default_false")]
    pub strict_numeric_fields: bool,
    #[serde(default = "default_false")]
    pub disconnect_on_command_failure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_settings: LogSettings::default(),
            ble_service_uuid: default_service_uuid(),
            ble_config_char_uuid: default_config_uuid(),
            ble_command_char_uuid: default_command_uuid(),
            scan_timeout_secs: default_scan_timeout_secs(),
            last_device_name: None,
            strict_numeric_fields: false,
            disconnect_on_command_failure: false,
        }
    }
}

fn default_service_uuid() -> String {
    "4FAFC201-1FB5-4740-984A-953835CE2260".to_string()
}
fn default_config_uuid() -> String {
    "BEB5483E-36E1-4688-B7F5-EA07361B26A8".to_string()
}
fn default_command_uuid() -> String {
    "BEB5483E-36E1-4688-B7F5-EA07361B26A9".to_string()
}

pub const MIN_SCAN_TIMEOUT_SECS: u64 = 1;
pub const MAX_SCAN_TIMEOUT_SECS: u64 = 120;

fn default_scan_timeout_secs() -> u64 {
    15
}

/// Snapshot of the settings the session needs for one workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub service_uuid: Uuid,
    pub config_char_uuid: Uuid,
    pub command_char_uuid: Uuid,
    pub scan_timeout: Duration,
    pub strict_numeric_fields: bool,
    pub disconnect_on_command_failure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        // Built from the default UUID strings, which are known to parse.
        Self {
            service_uuid: Uuid::from_u128(0x4fafc201_1fb5_4740_984a_953835ce2260),
            config_char_uuid: Uuid::from_u128(0xbeb5483e_36e1_4688_b7f5_ea07361b26a8),
            command_char_uuid: Uuid::from_u128(0xbeb5483e_36e1_4688_b7f5_ea07361b26a9),
            scan_timeout: Duration::from_secs(default_scan_timeout_secs()),
            strict_numeric_fields: false,
            disconnect_on_command_failure: false,
        }
    }
}

impl Settings {
    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        Ok(SessionConfig {
            service_uuid: parse_uuid("service", &self.ble_service_uuid)?,
            config_char_uuid: parse_uuid("config characteristic", &self.ble_config_char_uuid)?,
            command_char_uuid: parse_uuid("command characteristic", &self.ble_command_char_uuid)?,
            scan_timeout: Duration::from_secs(
                self.scan_timeout_secs
                    .clamp(MIN_SCAN_TIMEOUT_SECS, MAX_SCAN_TIMEOUT_SECS),
            ),
            strict_numeric_fields: self.strict_numeric_fields,
            disconnect_on_command_failure: self.disconnect_on_command_failure,
        })
    }
}

fn parse_uuid(what: &str, text: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(text.trim())
        .map_err(|e| anyhow::anyhow!("Invalid {} UUID '{}': {}", what, text, e))
}

/// Settings edited by the UI plus the copy last written to disk.
///
/// Workflows run against the saved copy, so edits only take effect once
/// they are saved.
pub struct SettingsService {
    settings: Settings,
    saved: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::with_path(settings_path))
    }

    /// Settings backed by an explicit file path
    pub fn with_path(settings_path: PathBuf) -> Self {
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();
        Self {
            saved: settings.clone(),
            settings,
            settings_path,
        }
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("LoRaNodeConfigurator");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &PathBuf) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&mut self) -> anyhow::Result<()> {
        self.write_file(&self.settings)?;
        self.saved = self.settings.clone();
        Ok(())
    }

    fn write_file(&self, settings: &Settings) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(settings)?;
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn saved(&self) -> &Settings {
        &self.saved
    }

    pub fn path(&self) -> &PathBuf {
        &self.settings_path
    }

    /// Record the last connected device without persisting unsaved edits
    pub fn remember_device(&mut self, name: &str) -> anyhow::Result<()> {
        self.settings.last_device_name = Some(name.to_string());
        if self.saved.last_device_name.as_deref() != Some(name) {
            self.saved.last_device_name = Some(name.to_string());
            self.write_file(&self.saved)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_parse_into_session_config() {
        let config = Settings::default().session_config().unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"scan_timeout_secs": 5}"#).unwrap();
        assert_eq!(settings.scan_timeout_secs, 5);
        assert_eq!(settings.ble_service_uuid, default_service_uuid());
        assert_eq!(settings.log_settings.level, "info");
        assert!(!settings.strict_numeric_fields);
    }

    #[test]
    fn test_invalid_uuid_is_reported() {
        let settings = Settings {
            ble_command_char_uuid: "not-a-uuid".to_string(),
            ..Settings::default()
        };
        let err = settings.session_config().unwrap_err();
        assert!(err.to_string().contains("command characteristic"));
    }

    #[test]
    fn test_zero_scan_timeout_is_clamped() {
        let settings = Settings {
            scan_timeout_secs: 0,
            ..Settings::default()
        };
        assert_eq!(
            settings.session_config().unwrap().scan_timeout,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_huge_scan_timeout_is_clamped() {
        let settings = Settings {
            scan_timeout_secs: u64::MAX,
            ..Settings::default()
        };
        assert_eq!(
            settings.session_config().unwrap().scan_timeout,
            Duration::from_secs(MAX_SCAN_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_unsaved_edits_do_not_reach_saved_copy() {
        let path = std::env::temp_dir().join(format!(
            "lora_node_configurator_draft_{}.json",
            std::process::id()
        ));
        let mut service = SettingsService::with_path(path.clone());
        service.get_mut().strict_numeric_fields = true;
        service.get_mut().ble_service_uuid = "not-a-uuid".to_string();
        assert!(!service.saved().strict_numeric_fields);
        assert!(service.saved().session_config().is_ok());

        // Remembering a device writes the saved copy, not the draft
        service.remember_device("LoRa-Node-3").unwrap();
        let reloaded = SettingsService::with_path(path.clone());
        assert!(!reloaded.get().strict_numeric_fields);
        assert_eq!(reloaded.get().last_device_name.as_deref(), Some("LoRa-Node-3"));
        assert_eq!(service.get().last_device_name.as_deref(), Some("LoRa-Node-3"));

        service.get_mut().ble_service_uuid = default_service_uuid();
        service.save().unwrap();
        assert!(service.saved().strict_numeric_fields);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!(
            "lora_node_configurator_settings_{}.json",
            std::process::id()
        ));
        let mut service = SettingsService::with_path(path.clone());
        service.get_mut().strict_numeric_fields = true;
        service.save().unwrap();
        service.remember_device("LoRa-Node-7").unwrap();

        let reloaded = SettingsService::with_path(path.clone());
        assert!(reloaded.get().strict_numeric_fields);
        assert_eq!(reloaded.get().last_device_name.as_deref(), Some("LoRa-Node-7"));

        let _ = fs::remove_file(path);
    }
}
