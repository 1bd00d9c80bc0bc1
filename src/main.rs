mod domain;
mod infrastructure;
mod presentation;

use domain::settings::SettingsService;
use eframe::egui;
use infrastructure::logging;
use presentation::app::ConfiguratorApp;
use tracing::info;

fn load_settings() -> SettingsService {
    match SettingsService::new() {
        Ok(service) => service,
        Err(e) => {
            // Logging is not up yet
            eprintln!("Failed to load settings, using defaults: {e}");
            SettingsService::with_path(
                std::env::temp_dir()
                    .join("LoRaNodeConfigurator")
                    .join("settings.json"),
            )
        }
    }
}

fn main() -> anyhow::Result<()> {
    let settings = load_settings();

    let logging_guard = logging::init_logger(&settings.get().log_settings)
        .map_err(|e| eprintln!("Failed to initialize logger: {e}"))
        .ok();

    info!("Starting LoRa Node Configurator");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 640.0])
            .with_title("LoRa Node Configurator"),
        ..Default::default()
    };

    eframe::run_native(
        "LoRa Node Configurator",
        options,
        Box::new(|cc| Ok(Box::new(ConfiguratorApp::new(cc, settings, logging_guard)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
