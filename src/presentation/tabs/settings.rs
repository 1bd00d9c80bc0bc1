use crate::domain::models::{MessageSeverity, StatusMessage};
use crate::domain::settings::{MAX_SCAN_TIMEOUT_SECS, MIN_SCAN_TIMEOUT_SECS};
use crate::presentation::app::ConfiguratorApp;
use crate::presentation::components::Components;
use crate::presentation::theme::Palette;
use eframe::egui;
use tracing::{error, info};

pub fn render(app: &mut ConfiguratorApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Settings");
    ui.add_space(20.0);

    let mut save_requested = false;

    if let Ok(mut settings) = app.settings.lock() {
        let settings_mut = settings.get_mut();

        Components::card(ui, "Node Protocol", |ui| {
            ui.label(
                egui::RichText::new("⚠️ Warning: these must match the node firmware.")
                    .color(egui::Color32::from_rgb(255, 200, 0)),
            );

            egui::Grid::new("ble_uuids")
                .spacing([10.0, 10.0])
                .show(ui, |ui| {
                    ui.label("Service:");
                    ui.text_edit_singleline(&mut settings_mut.ble_service_uuid);
                    ui.end_row();
                    ui.label("Config:");
                    ui.text_edit_singleline(&mut settings_mut.ble_config_char_uuid);
                    ui.end_row();
                    ui.label("Command:");
                    ui.text_edit_singleline(&mut settings_mut.ble_command_char_uuid);
                    ui.end_row();
                });

            ui.horizontal(|ui| {
                ui.label("Scan Timeout (s):");
                ui.add(
                    egui::DragValue::new(&mut settings_mut.scan_timeout_secs)
                        .range(MIN_SCAN_TIMEOUT_SECS..=MAX_SCAN_TIMEOUT_SECS),
                );
            });
        });

        ui.add_space(10.0);

        Components::card(ui, "Workflow", |ui| {
            ui.checkbox(
                &mut settings_mut.strict_numeric_fields,
                "Reject non-numeric values before saving",
            );
            ui.checkbox(
                &mut settings_mut.disconnect_on_command_failure,
                "Disconnect even if CLOSE_AP fails",
            );
        });

        ui.add_space(10.0);

        Components::card(ui, "Logging", |ui| {
            ui.horizontal(|ui| {
                ui.label("Verbosity Level:");
                egui::ComboBox::from_id_salt("log_level")
                    .selected_text(&settings_mut.log_settings.level)
                    .show_ui(ui, |ui| {
                        for level in &["trace", "debug", "info", "warn", "error"] {
                            ui.selectable_value(
                                &mut settings_mut.log_settings.level,
                                level.to_string(),
                                *level,
                            );
                        }
                    });
            });

            ui.checkbox(
                &mut settings_mut.log_settings.console_logging_enabled,
                "Console Logs",
            );
            ui.checkbox(
                &mut settings_mut.log_settings.file_logging_enabled,
                "File Logs",
            );

            if settings_mut.log_settings.file_logging_enabled {
                ui.indent("file_logs", |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Save Path:");
                        ui.text_edit_singleline(&mut settings_mut.log_settings.log_dir);
                    });
                    ui.horizontal(|ui| {
                        ui.label("Rotation:");
                        egui::ComboBox::from_id_salt("log_rot")
                            .selected_text(&settings_mut.log_settings.rotation)
                            .show_ui(ui, |ui| {
                                for rot in &["daily", "hourly", "never"] {
                                    ui.selectable_value(
                                        &mut settings_mut.log_settings.rotation,
                                        rot.to_string(),
                                        *rot,
                                    );
                                }
                            });
                    });
                });
            }
            ui.label(
                egui::RichText::new("Restart required for log changes.")
                    .italics()
                    .size(12.0),
            );
        });

        ui.add_space(10.0);

        if ui.button("Save Settings").clicked() {
            save_requested = true;
        }
        ui.label(
            egui::RichText::new("Node protocol and workflow changes apply once saved.")
                .italics()
                .size(12.0),
        );

        if save_requested {
            app.settings_feedback = Some(match settings.save() {
                Ok(()) => {
                    info!("Settings saved to {}", settings.path().display());
                    StatusMessage::new("Settings saved.", MessageSeverity::Success)
                }
                Err(e) => {
                    error!("Failed to save settings: {}", e);
                    StatusMessage::new(
                        format!("Failed to save settings: {}", e),
                        MessageSeverity::Error,
                    )
                }
            });
        }
    }

    if let Some(feedback) = &app.settings_feedback {
        let palette = Palette::new(app.is_dark_mode);
        ui.label(
            egui::RichText::new(&feedback.message).color(palette.severity_color(feedback.severity)),
        );
    }
}
