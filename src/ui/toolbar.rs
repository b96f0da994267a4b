use super::range_input::TimeRangeInput;
use crate::app::TelemetryApp;
use eframe::egui;

/// Render the file controls and the ingestion progress bar
pub fn render_toolbar(app: &mut TelemetryApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        // File operations
        if ui.button("📂").on_hover_text("Open telemetry log").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Telemetry", &["csv", "tsv", "txt", "log"])
                .add_filter("All files", &["*"])
                .pick_file()
            {
                app.open_file(path);
            }
        }

        // Recent files menu
        if !app.recent_files.is_empty() {
            egui::ComboBox::from_id_salt("recent_files")
                .selected_text("📋")
                .show_ui(ui, |ui| {
                    ui.label("Recent Files:");
                    ui.separator();
                    for path in app.recent_files.clone() {
                        if let Some(name) = path.file_name() {
                            if ui
                                .button(name.to_string_lossy())
                                .on_hover_text(path.display().to_string())
                                .clicked()
                            {
                                app.open_file(path.clone());
                            }
                        }
                    }
                });
        }

        if app.session.dataset().is_some()
            && ui.button("⟲").on_hover_text("Reset view (R)").clicked()
        {
            app.session.reset_view();
        }

        if let Some(file) = &app.current_file {
            ui.label(format!(
                "📄 {}",
                file.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("Unknown")
            ))
            .on_hover_text(file.display().to_string());
        }

        if app.is_reading() {
            ui.spinner();
            ui.label("Reading…");
        } else if let Some(progress) = app.session.progress() {
            ui.add(
                egui::ProgressBar::new(progress / 100.0)
                    .desired_width(200.0)
                    .show_percentage(),
            );
        }
    });

    let Some(total) = app
        .session
        .dataset()
        .map(|d| d.metadata().total_elapsed())
    else {
        return;
    };

    ui.horizontal(|ui| {
        let speed = (total / 1000.0).max(0.001);
        if TimeRangeInput::new(&mut app.range_input, total)
            .speed(speed)
            .show(ui)
        {
            app.apply_range_input();
        }

        ui.separator();

        let mut fixed = app.is_fixed_resolution();
        if ui.checkbox(&mut fixed, "Sample every").changed() {
            app.set_fixed_resolution(fixed);
        }
        let nth = ui.add_enabled(
            fixed,
            egui::DragValue::new(&mut app.nth_row)
                .speed(1.0)
                .range(1.0..=1_000_000.0),
        );
        ui.label("th row");
        if nth.changed() {
            app.set_fixed_resolution(true);
        }
    });
}
