use crate::app::TelemetryApp;
use eframe::egui;
use telemetry_oxide::chart::hue_for;

/// Render the variable toggles (left sidebar)
pub fn render_series_panel(app: &mut TelemetryApp, ui: &mut egui::Ui) {
    let variables = app.session.variables();

    ui.heading("Variables");
    ui.separator();

    if variables.is_empty() {
        ui.label("No plottable columns");
        return;
    }

    let selected: Vec<&String> = variables
        .iter()
        .filter(|v| app.session.selected().contains(v))
        .collect();
    let colors: Vec<(String, egui::Color32)> = selected
        .iter()
        .enumerate()
        .map(|(k, name)| {
            let hue = hue_for(k, selected.len());
            ((*name).clone(), super::plot::series_color(hue))
        })
        .collect();

    egui::ScrollArea::vertical().show(ui, |ui| {
        for name in &variables {
            let mut checked = app.session.selected().contains(name);
            ui.horizontal(|ui| {
                if ui.checkbox(&mut checked, name).changed() {
                    app.session.toggle_variable(name);
                }
                if let Some((_, color)) = colors.iter().find(|(n, _)| n == name) {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
                    ui.painter().circle_filled(rect.center(), 4.0, *color);
                }
            });
        }
    });

    ui.separator();
    if ui.small_button("Clear selection").clicked() {
        app.session.clear_selection();
    }
}
