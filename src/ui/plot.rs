use std::time::Instant;

use crate::app::TelemetryApp;
use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points, VLine};
use telemetry_oxide::chart::{ChartFrame, ChartView, EventMarker, PlotDataset};
use telemetry_oxide::constants::{layout, plot as plot_consts};

const EVENT_LINE_NAME: &str = "events";

/// Color for a hue in degrees
pub fn series_color(hue: f32) -> egui::Color32 {
    egui::ecolor::Hsva::new(hue / 360.0, 1.0, 1.0, 1.0).into()
}

/// Contiguous runs of numeric points; text values split the line
fn segments(dataset: &PlotDataset) -> Vec<Vec<[f64; 2]>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for point in &dataset.points {
        match point.y {
            Some(y) => current.push([point.x, y]),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Event rows of `dataset` that have a numeric value to sit on
fn event_points(dataset: &PlotDataset) -> Vec<[f64; 2]> {
    dataset
        .points
        .iter()
        .filter(|p| p.message.is_some())
        .filter_map(|p| p.y.map(|y| [p.x, y]))
        .collect()
}

/// Distinct event timestamps, one vertical line each
fn event_lines(events: &[EventMarker]) -> Vec<f64> {
    let mut xs: Vec<f64> = events.iter().map(|e| e.x).collect();
    xs.dedup();
    xs
}

fn event_at(events: &[EventMarker], x: f64) -> Option<&str> {
    events
        .iter()
        .find(|e| (e.x - x).abs() <= f64::EPSILON * e.x.abs().max(1.0))
        .map(|e| e.message.as_str())
}

/// Render the chart and feed x-axis zoom/pan back into the session
pub fn render_plot(app: &mut TelemetryApp, ui: &mut egui::Ui) {
    profiling::scope!("render_plot");

    let Some(view) = app.session.chart() else {
        return;
    };

    let (frame, x_domain) = match view {
        ChartView::Plot(frame) => {
            let x_domain = frame.x_domain;
            (Some(frame), x_domain)
        }
        ChartView::NoDataInRange { x_domain } => (None, x_domain),
    };
    app.last_step = frame.as_ref().map(|f| f.step);

    if frame.is_none() {
        let (min, max) = x_domain;
        ui.vertical_centered(|ui| {
            ui.label(format!("No data in range {:.3} .. {:.3}", min, max));
        });
    } else if app.session.selected().is_empty() {
        ui.vertical_centered(|ui| {
            ui.label("Select a variable on the left to plot it");
        });
    }

    let plot_height = ui.available_height().max(layout::MIN_PLOT_HEIGHT);
    let events = frame
        .as_ref()
        .map(|f| f.events.clone())
        .unwrap_or_default();

    let mut plot = Plot::new("telemetry_plot")
        .allow_zoom([true, false])
        .allow_drag([true, false])
        .allow_scroll([true, false])
        .allow_boxed_zoom(false)
        .height(plot_height)
        .legend(Legend::default().position(egui_plot::Corner::RightTop))
        .include_x(x_domain.0)
        .include_x(x_domain.1)
        .label_formatter(move |name, value| {
            let base = if name.is_empty() {
                format!("t: {:.3}\ny: {:.3}", value.x, value.y)
            } else {
                format!("{}\nt: {:.3}\ny: {:.3}", name, value.x, value.y)
            };
            match event_at(&events, value.x) {
                Some(message) => format!("{}\n⚑ {}", base, message),
                None => base,
            }
        });

    if let Some(frame) = &frame {
        if let Some(y) = frame.y_domain.0 {
            plot = plot.include_y(y);
        }
        if let Some(y) = frame.y_domain.1 {
            plot = plot.include_y(y);
        }
    }

    if app.reset_plot {
        plot = plot.reset();
        app.reset_plot = false;
    }

    let plot_response = plot.show(ui, |plot_ui| {
        if let Some(frame) = &frame {
            draw_frame(plot_ui, frame);
        }
    });

    // Only gestures move the viewport; auto-fitted bounds must not feed back
    let response = &plot_response.response;
    let gesture = response.dragged()
        || (response.hovered()
            && ui.input(|i| i.smooth_scroll_delta != egui::Vec2::ZERO || i.zoom_delta() != 1.0));
    if gesture {
        let bounds = plot_response.transform.bounds();
        app.session
            .request_viewport(bounds.min()[0], bounds.max()[0], Instant::now());
    }
}

fn draw_frame(plot_ui: &mut egui_plot::PlotUi, frame: &ChartFrame) {
    profiling::scope!("draw_frame");

    // Every event gets a tick, even with no variable to sit on
    for x in event_lines(&frame.events) {
        plot_ui.vline(
            VLine::new(EVENT_LINE_NAME, x)
                .color(egui::Color32::from_gray(140))
                .width(1.0),
        );
    }

    for dataset in &frame.datasets {
        let color = series_color(dataset.color_hue);
        for run in segments(dataset) {
            plot_ui.line(
                Line::new(dataset.label.clone(), PlotPoints::from(run))
                    .color(color)
                    .width(plot_consts::LINE_WIDTH),
            );
        }

        let markers = event_points(dataset);
        if !markers.is_empty() {
            plot_ui.points(
                Points::new(dataset.label.clone(), markers)
                    .radius(plot_consts::EVENT_MARKER_RADIUS)
                    .color(color),
            );
        }
    }
}
