use crate::domain::models::{ConnectionStatus, SessionCommand};
use crate::presentation::app::ConfiguratorApp;
use crate::presentation::components::Components;
use crate::presentation::theme::Palette;
use eframe::egui;

pub fn render(app: &mut ConfiguratorApp, ui: &mut egui::Ui) {
    Components::heading(ui, "LoRa Node Configurator");
    ui.add_space(20.0);

    ui_status_panel(app, ui);
    ui.add_space(15.0);

    if app.view.show_form() {
        ui_config_form(app, ui);
    } else {
        ui_connection_panel(app, ui);
    }
}

fn ui_status_panel(app: &mut ConfiguratorApp, ui: &mut egui::Ui) {
    let palette = Palette::new(app.is_dark_mode);
    let msg = &app.view.status_message;
    Components::status_line(ui, &msg.message, palette.severity_color(msg.severity));
}

fn ui_connection_panel(app: &mut ConfiguratorApp, ui: &mut egui::Ui) {
    Components::card(ui, "Connection", |ui| {
        if let Some(reason) = &app.view.bluetooth_unavailable {
            ui.label(
                egui::RichText::new(format!("Bluetooth unavailable: {}", reason))
                    .color(Palette::new(app.is_dark_mode).error),
            );
        }

        ui.horizontal(|ui| {
            let connect = ui.add_enabled(
                app.view.can_connect(),
                egui::Button::new("Connect to LoRa Node"),
            );
            if connect.clicked() {
                app.view.dispatch(SessionCommand::Connect);
            }

            if app.view.connection_status == ConnectionStatus::Connecting {
                ui.spinner();
                if ui.button("Cancel").clicked() {
                    app.view.cancel_scan();
                }
            }
        });

        if let Ok(settings) = app.settings.lock() {
            if let Some(name) = &settings.get().last_device_name {
                ui.label(
                    egui::RichText::new(format!("Last connected: {}", name))
                        .italics()
                        .size(12.0),
                );
            }
        }
    });
}

fn ui_config_form(app: &mut ConfiguratorApp, ui: &mut egui::Ui) {
    let title = match &app.view.device_name {
        Some(name) => format!("Node Configuration ({})", name),
        None => "Node Configuration".to_string(),
    };
    let enabled = !app.view.busy;

    Components::card(ui, &title, |ui| {
        egui::Grid::new("config_form")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                let form = &mut app.view.form;
                Components::form_row(ui, "Node ID:", &mut form.node_id, enabled);
                Components::form_row(ui, "Network ID:", &mut form.network_id, enabled);
                Components::form_row(ui, "Interval (seconds):", &mut form.interval, enabled);
                Components::form_row(ui, "Default Destination:", &mut form.default_dest, enabled);
            });

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui
                .add_enabled(enabled, egui::Button::new("Save Configuration"))
                .clicked()
            {
                let form = app.view.form.clone();
                app.view.dispatch(SessionCommand::SaveConfig(form));
            }
            if ui
                .add_enabled(enabled, egui::Button::new("Reload"))
                .clicked()
            {
                app.view.dispatch(SessionCommand::ReadConfig);
            }
            if ui
                .add_enabled(enabled, egui::Button::new("Close BLE Service"))
                .clicked()
            {
                app.view.dispatch(SessionCommand::CloseBleService);
            }
            if app.view.busy {
                ui.spinner();
            }
        });
    });
}
