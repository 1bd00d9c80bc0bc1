use eframe::egui;

pub struct Components;

impl Components {
    pub fn heading(ui: &mut egui::Ui, text: &str) {
        ui.label(egui::RichText::new(text).heading().strong());
    }

    pub fn card<R>(
        ui: &mut egui::Ui,
        title: &str,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> R {
        let stroke = ui.style().visuals.widgets.noninteractive.bg_stroke;
        let bg = ui.style().visuals.widgets.noninteractive.bg_fill;

        egui::Frame::none()
            .inner_margin(egui::Margin::same(15.0))
            .stroke(stroke)
            .fill(bg)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(title).strong().size(18.0));
                    ui.add_space(8.0);
                    add_contents(ui)
                })
                .inner
            })
            .inner
    }

    /// One-line status readout in the severity color
    pub fn status_line(ui: &mut egui::Ui, text: &str, color: egui::Color32) {
        ui.add(
            egui::Label::new(
                egui::RichText::new(format!("Status: {}", text))
                    .color(color)
                    .size(16.0)
                    .strong(),
            )
            .wrap_mode(egui::TextWrapMode::Wrap),
        );
    }

    /// Labelled single-line text field inside a grid row
    pub fn form_row(ui: &mut egui::Ui, label: &str, value: &mut String, enabled: bool) {
        ui.label(label);
        ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(value).desired_width(260.0),
        );
        ui.end_row();
    }
}
