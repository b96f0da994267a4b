use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use eframe::egui;

use telemetry_oxide::config::{Config, ResolutionPolicy};
use telemetry_oxide::constants::{performance, plot};
use telemetry_oxide::perf::{BackgroundWorker, WorkerResult};
use telemetry_oxide::state::{Session, Viewport};

use crate::ui;

pub struct TelemetryApp {
    pub session: Session,
    worker: BackgroundWorker,
    /// Id of the file read whose result we are waiting for
    pending_read: Option<u64>,
    pub current_file: Option<PathBuf>,
    pub recent_files: Vec<PathBuf>,
    /// Drop egui_plot's remembered bounds on the next frame
    pub reset_plot: bool,
    seen_revision: u64,
    /// Density step of the last drawn chart
    pub last_step: Option<usize>,
    /// Contents of the "From .. to .." fields
    pub range_input: [f64; 2],
    shown_viewport: Option<Viewport>,
    /// Row step used while the fixed policy is on
    pub nth_row: f64,
}

impl TelemetryApp {
    pub fn new(config: Config) -> Self {
        let nth_row = match config.resolution {
            ResolutionPolicy::Fixed { min_resolution } => min_resolution,
            ResolutionPolicy::Adaptive => config.initial_min_resolution,
        };
        Self {
            session: Session::new(config),
            worker: BackgroundWorker::spawn(),
            pending_read: None,
            current_file: None,
            recent_files: Vec::new(),
            reset_plot: false,
            seen_revision: 0,
            last_step: None,
            range_input: [0.0, 0.0],
            shown_viewport: None,
            nth_row,
        }
    }

    /// Queue `path` for reading; any earlier read still in flight is ignored
    pub fn open_file(&mut self, path: PathBuf) {
        tracing::info!("Opening {}", path.display());
        self.pending_read = Some(self.worker.read_file_async(path));
    }

    pub fn is_reading(&self) -> bool {
        self.pending_read.is_some()
    }

    fn poll_worker(&mut self) {
        while let Some(result) = self.worker.poll() {
            if self.pending_read != Some(result.request_id()) {
                tracing::debug!("Ignoring stale read #{}", result.request_id());
                continue;
            }
            self.pending_read = None;

            match result {
                WorkerResult::FileRead { path, text, .. } => {
                    if self.session.load_text(text) {
                        self.push_recent(path.clone());
                        self.current_file = Some(path);
                    }
                }
                WorkerResult::Failed { error, .. } => self.session.report_error(error),
            }
        }
    }

    fn push_recent(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(performance::MAX_RECENT_FILES);
    }

    /// Follow session-side viewport changes: refit the plot after jumps and
    /// mirror the current window into the range fields
    pub fn sync_view_state(&mut self) {
        let revision = self.session.view_revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.reset_plot = true;
        }

        let viewport = self.session.viewport();
        if self.shown_viewport != Some(viewport) {
            self.shown_viewport = Some(viewport);
            self.range_input = [viewport.min(), viewport.max()];
        }
    }

    pub fn apply_range_input(&mut self) {
        let [min, max] = self.range_input;
        self.session.set_viewport(min, max);
    }

    pub fn is_fixed_resolution(&self) -> bool {
        matches!(
            self.session.config().resolution,
            ResolutionPolicy::Fixed { .. }
        )
    }

    /// Sample every `nth_row` rows when `fixed`, adaptive otherwise
    pub fn set_fixed_resolution(&mut self, fixed: bool) {
        self.nth_row = self.nth_row.max(1.0).round();
        let policy = if fixed {
            ResolutionPolicy::Fixed {
                min_resolution: self.nth_row,
            }
        } else {
            ResolutionPolicy::Adaptive
        };
        self.session.set_resolution_policy(policy);
    }

    /// Human-readable start time when the first timestamp looks like Unix seconds
    pub fn start_time_label(initial_timestamp: f64) -> Option<String> {
        if !(plot::MIN_EPOCH_SECONDS..=plot::MAX_EPOCH_SECONDS).contains(&initial_timestamp) {
            return None;
        }
        let secs = initial_timestamp.floor() as i64;
        let nanos = ((initial_timestamp.fract() * 1_000_000_000.0) as u32).min(999_999_999);
        DateTime::<Utc>::from_timestamp(secs, nanos)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    }

    fn render_error_banner(&mut self, ctx: &egui::Context) {
        let Some((title, message)) = self
            .session
            .last_error()
            .map(|e| (e.title(), e.user_message()))
        else {
            return;
        };

        egui::TopBottomPanel::top("error_banner").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(255, 80, 80), format!("⚠ {}", title));
                ui.label(message);
                if ui.small_button("✕").clicked() {
                    self.session.dismiss_error();
                }
            });
        });
    }

    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(name) = self.current_file.as_ref().and_then(|f| f.file_name()) {
                    ui.label(format!("📁 {}", name.to_string_lossy()));
                    ui.separator();
                }

                let Some(dataset) = self.session.dataset() else {
                    ui.label("No data");
                    return;
                };
                let meta = dataset.metadata();
                ui.label(format!("Rows: {}", meta.row_count));
                ui.separator();
                match meta.sample_rate() {
                    Some(rate) => ui.label(format!("Sample rate: {:.3}", rate)),
                    None => ui.label("Sample rate: n/a"),
                };
                if let Some(start) = Self::start_time_label(meta.initial_timestamp) {
                    ui.separator();
                    ui.label(format!("Start: {}", start));
                }
                let viewport = self.session.viewport();
                ui.separator();
                ui.label(format!("View: {:.2} .. {:.2}", viewport.min(), viewport.max()));
                if let Some(step) = self.last_step {
                    ui.separator();
                    ui.label(format!("Step: {}", step));
                }
            });
        });
    }
}

impl eframe::App for TelemetryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        profiling::finish_frame!();

        self.poll_worker();
        self.session.pump();
        self.session.poll(Instant::now());

        // Handle keyboard shortcuts
        let typing = ctx.wants_keyboard_input();
        ctx.input(|i| {
            if typing {
                return;
            }
            if i.key_pressed(egui::Key::R) {
                self.session.reset_view();
            }
            if i.key_pressed(egui::Key::ArrowLeft) {
                self.session.pan_view(-0.1);
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                self.session.pan_view(0.1);
            }
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                self.session.zoom_view(0.5);
            }
            if i.key_pressed(egui::Key::Minus) {
                self.session.zoom_view(2.0);
            }
        });
        self.sync_view_state();

        // Handle drag and drop
        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .first()
                .and_then(|f| f.path.clone())
        });
        if let Some(path) = dropped {
            self.open_file(path);
        }

        self.render_error_banner(ctx);
        self.render_status_bar(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::render_toolbar(self, ui);
        });

        if self.session.dataset().is_some() {
            egui::SidePanel::left("series_panel")
                .default_width(telemetry_oxide::constants::layout::SERIES_PANEL_WIDTH)
                .show(ctx, |ui| {
                    ui::render_series_panel(self, ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.session.dataset().is_some() {
                ui::render_plot(self, ui);
            } else {
                ui.vertical_centered(|ui| {
                    ui.heading("No data loaded");
                    ui.label("Open a telemetry log or drag and drop one here to get started");
                });
            }
        });

        if self.session.is_loading() || self.is_reading() {
            ctx.request_repaint();
        } else if let Some(due) = self.session.pending_viewport_in(Instant::now()) {
            ctx.request_repaint_after(due);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_time_label() {
        assert_eq!(
            TelemetryApp::start_time_label(1_700_000_000.0).as_deref(),
            Some("2023-11-14 22:13:20 UTC")
        );
        assert_eq!(TelemetryApp::start_time_label(0.0), None);
        assert_eq!(TelemetryApp::start_time_label(f64::NAN), None);
    }

    #[test]
    fn test_recent_files_move_to_front() {
        let mut app = TelemetryApp::new(Config::default());
        app.push_recent(PathBuf::from("a.csv"));
        app.push_recent(PathBuf::from("b.csv"));
        app.push_recent(PathBuf::from("a.csv"));
        assert_eq!(
            app.recent_files,
            vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]
        );

        for i in 0..20 {
            app.push_recent(PathBuf::from(format!("{}.csv", i)));
        }
        assert_eq!(app.recent_files.len(), performance::MAX_RECENT_FILES);
    }

    const FLIGHT: &str = "timestamp,altitude,messages\n0,0,\n1,10,\n2,20,liftoff\n3,30,\n";

    fn load(app: &mut TelemetryApp, text: &str) {
        assert!(app.session.load_text(text));
        while app.session.pump().is_some() {}
    }

    #[test]
    fn test_new_dataset_refits_plot() {
        let mut app = TelemetryApp::new(Config::default());
        load(&mut app, FLIGHT);
        app.sync_view_state();
        assert!(app.reset_plot);
        assert_eq!(app.range_input, [0.0, 3.0]);

        // The plot consumed the reset; zoom in, then load another file
        app.reset_plot = false;
        app.session.set_viewport(1.0, 2.0);
        app.sync_view_state();
        app.reset_plot = false;

        load(&mut app, "timestamp,v\n0,1\n10,2\n");
        app.sync_view_state();
        assert!(app.reset_plot);
        assert_eq!(app.range_input, [0.0, 10.0]);
    }

    #[test]
    fn test_range_input_applies_viewport() {
        let mut app = TelemetryApp::new(Config::default());
        load(&mut app, FLIGHT);
        app.sync_view_state();

        app.range_input = [0.5, 2.5];
        app.apply_range_input();
        assert_eq!(app.session.viewport(), Viewport::new(0.5, 2.5));

        app.range_input = [1.0, 50.0];
        app.apply_range_input();
        app.sync_view_state();
        assert_eq!(app.range_input, [1.0, 3.0]);
    }

    #[test]
    fn test_fixed_resolution_toggle() {
        let mut app = TelemetryApp::new(Config::default());
        load(&mut app, FLIGHT);
        assert!(!app.is_fixed_resolution());

        app.nth_row = 2.4;
        app.set_fixed_resolution(true);
        assert!(app.is_fixed_resolution());
        assert_eq!(app.session.resampler().min_resolution, 2.0);

        app.set_fixed_resolution(false);
        assert!(!app.is_fixed_resolution());
    }
}
