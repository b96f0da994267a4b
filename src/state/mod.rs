//! Session state
//!
//! [`Session`] ties the engine together for an interactive host: it owns the
//! configuration, the published dataset, the in-flight ingestion, the viewport,
//! the variable selection and the resolution state. The host drives it with
//! [`Session::pump`] and [`Session::poll`] once per frame.

mod debounce;
mod view;

pub use debounce::Debouncer;
pub use view::{SelectedVariables, Viewport};

use crate::chart::{ChartView, available_variables, build_chart};
use crate::config::{Config, ResolutionPolicy};
use crate::constants::interaction::VIEWPORT_EPSILON;
use crate::data::{ChunkedIngestor, Dataset, IngestStep, SeriesStore};
use crate::error::TelemetryError;
use crate::perf::ResamplerState;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct Session {
    config: Config,
    store: SeriesStore,
    ingestor: Option<ChunkedIngestor>,
    progress: Option<f32>,
    viewport: Viewport,
    selected: SelectedVariables,
    resampler: ResamplerState,
    debouncer: Debouncer<Viewport>,
    last_error: Option<TelemetryError>,
    /// Bumped whenever the viewport changes other than through a debounced gesture
    view_revision: u64,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            store: SeriesStore::new(),
            ingestor: None,
            progress: None,
            viewport: Viewport::full(0.0),
            selected: SelectedVariables::new(),
            resampler: ResamplerState::new(&config),
            debouncer: Debouncer::new(config.debounce()),
            last_error: None,
            view_revision: 0,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start ingesting `text`, superseding any in-flight load.
    ///
    /// On a structural error the previous dataset and any in-flight load are
    /// kept, and the error is stored for display. Returns whether a load started.
    pub fn load_text(&mut self, text: impl Into<String>) -> bool {
        let store = &mut self.store;
        match ChunkedIngestor::start(text, &self.config, || store.begin_load()) {
            Ok(ingestor) => {
                tracing::info!("Starting load #{}", ingestor.token().generation());
                self.ingestor = Some(ingestor);
                self.progress = Some(0.0);
                self.last_error = None;
                true
            }
            Err(e) => {
                tracing::warn!("Load rejected: {}", e);
                self.last_error = Some(e);
                false
            }
        }
    }

    /// Record an error raised outside the session, such as a failed file read
    pub fn report_error(&mut self, error: TelemetryError) {
        tracing::warn!("{}", error);
        self.last_error = Some(error);
    }

    /// Advance the in-flight load by one chunk.
    ///
    /// Returns the progress reached, or `None` when nothing is loading.
    pub fn pump(&mut self) -> Option<f32> {
        let ingestor = self.ingestor.as_mut()?;
        match ingestor.step() {
            IngestStep::InProgress { progress } => {
                self.progress = Some(progress);
                Some(progress)
            }
            IngestStep::Done(dataset) => {
                let progress = ingestor.progress();
                let token = ingestor.token().clone();
                self.ingestor = None;
                self.progress = None;
                if self.store.publish(&token, Arc::clone(&dataset)) {
                    self.on_published(&dataset);
                }
                Some(progress)
            }
            IngestStep::Cancelled => {
                self.ingestor = None;
                self.progress = None;
                None
            }
        }
    }

    fn on_published(&mut self, dataset: &Dataset) {
        self.debouncer.cancel();
        self.selected.retain_available(&available_variables(dataset));
        self.resampler = ResamplerState::new(&self.config);
        self.jump_to(Viewport::full(dataset.metadata().total_elapsed()));
    }

    /// Schedule a viewport change; applied by [`Session::poll`] after the debounce delay
    pub fn request_viewport(&mut self, min: f64, max: f64, now: Instant) {
        let requested = self.clamp(Viewport::new(min, max));
        if !self.debouncer.is_pending()
            && !requested.differs_from(&self.viewport, VIEWPORT_EPSILON)
        {
            return;
        }
        self.debouncer.schedule(requested, now);
    }

    /// Apply a scheduled viewport whose deadline has passed.
    ///
    /// Returns true if the viewport changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(viewport) if viewport.differs_from(&self.viewport, VIEWPORT_EPSILON) => {
                self.apply_viewport(viewport);
                true
            }
            _ => false,
        }
    }

    /// Apply a viewport immediately, dropping any scheduled one
    pub fn set_viewport(&mut self, min: f64, max: f64) {
        let viewport = self.clamp(Viewport::new(min, max));
        self.jump_to(viewport);
    }

    /// Back to the whole series
    pub fn reset_view(&mut self) {
        self.jump_to(Viewport::full(self.total_elapsed()));
    }

    /// Shift the view by `fraction` of its width
    pub fn pan_view(&mut self, fraction: f64) {
        let delta = self.viewport.range() * fraction;
        let viewport = self.viewport.pan(delta, self.total_elapsed());
        self.jump_to(viewport);
    }

    /// Scale the view width around its center (`factor < 1` zooms in)
    pub fn zoom_view(&mut self, factor: f64) {
        let center = (self.viewport.min() + self.viewport.max()) / 2.0;
        let viewport = self.viewport.zoom(factor, center, self.total_elapsed());
        self.jump_to(viewport);
    }

    /// Non-gesture viewport change; the renderer must refit its bounds
    fn jump_to(&mut self, viewport: Viewport) {
        self.debouncer.cancel();
        self.apply_viewport(viewport);
        self.view_revision += 1;
    }

    /// Changes whenever the host should drop its own zoom state
    pub fn view_revision(&self) -> u64 {
        self.view_revision
    }

    /// Switch between adaptive and fixed resolution, keeping the current view
    pub fn set_resolution_policy(&mut self, policy: ResolutionPolicy) {
        self.config.resolution = policy;
        self.resampler = ResamplerState::new(&self.config);
        self.apply_viewport(self.viewport);
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(dataset) = self.store.current() {
            self.resampler
                .on_viewport_change(viewport.range(), dataset.metadata());
        }
    }

    fn clamp(&self, viewport: Viewport) -> Viewport {
        match self.store.current() {
            Some(_) => viewport.clamped(self.total_elapsed()),
            None => viewport,
        }
    }

    fn total_elapsed(&self) -> f64 {
        self.store
            .current()
            .map(|d| d.metadata().total_elapsed())
            .unwrap_or(0.0)
    }

    /// Flip a variable's selection; returns the new state
    pub fn toggle_variable(&mut self, name: &str) -> bool {
        self.selected.toggle(name)
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Chart for the current dataset and viewport
    pub fn chart(&self) -> Option<ChartView> {
        let dataset = self.store.current()?;
        Some(build_chart(
            dataset,
            self.viewport,
            &self.selected,
            &self.resampler,
            &self.config,
        ))
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.store.current()
    }

    /// Candidate variables of the current dataset
    pub fn variables(&self) -> Vec<String> {
        self.store
            .current()
            .map(|d| available_variables(d))
            .unwrap_or_default()
    }

    pub fn selected(&self) -> &SelectedVariables {
        &self.selected
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resampler(&self) -> &ResamplerState {
        &self.resampler
    }

    pub fn is_loading(&self) -> bool {
        self.ingestor.is_some()
    }

    /// Progress of the in-flight load, 0-100
    pub fn progress(&self) -> Option<f32> {
        self.progress
    }

    /// Time until a scheduled viewport is due
    pub fn pending_viewport_in(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    pub fn last_error(&self) -> Option<&TelemetryError> {
        self.last_error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLIGHT: &str = "timestamp,altitude,messages\n0,0,\n1,10,\n2,20,liftoff\n3,30,\n";

    fn pump_all(session: &mut Session) -> Vec<f32> {
        let mut progress = Vec::new();
        while let Some(p) = session.pump() {
            progress.push(p);
        }
        progress
    }

    fn loaded(text: &str) -> Session {
        let mut session = Session::default();
        assert!(session.load_text(text));
        pump_all(&mut session);
        session
    }

    #[test]
    fn test_load_publishes_and_resets_view() {
        let mut session = Session::new(Config {
            chunk_rows: 1,
            ..Config::default()
        });
        assert!(session.load_text(FLIGHT));
        assert!(session.is_loading());
        assert!(session.chart().is_none());

        let progress = pump_all(&mut session);
        assert_eq!(progress.len(), 4);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.last(), Some(&100.0));
        assert!(!session.is_loading());
        assert_eq!(session.progress(), None);
        assert_eq!(session.dataset().unwrap().metadata().row_count, 4);
        assert_eq!(session.viewport(), Viewport::new(0.0, 3.0));
        assert_eq!(session.variables(), vec!["altitude"]);
    }

    #[test]
    fn test_missing_timestamp_publishes_nothing() {
        let mut session = loaded(FLIGHT);
        let before = Arc::clone(session.dataset().unwrap());

        assert!(!session.load_text("time,altitude\n0,1\n"));
        assert!(matches!(
            session.last_error(),
            Some(TelemetryError::MissingTimestampColumn { .. })
        ));
        assert!(!session.is_loading());
        assert!(Arc::ptr_eq(session.dataset().unwrap(), &before));

        session.dismiss_error();
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_failed_load_keeps_in_flight_run() {
        let mut session = Session::new(Config {
            chunk_rows: 1,
            ..Config::default()
        });
        assert!(session.load_text(FLIGHT));
        session.pump();
        assert!(!session.load_text(""));
        pump_all(&mut session);
        assert_eq!(session.dataset().unwrap().metadata().row_count, 4);
    }

    #[test]
    fn test_newer_load_supersedes_in_flight_run() {
        let mut session = Session::new(Config {
            chunk_rows: 1,
            ..Config::default()
        });
        assert!(session.load_text(FLIGHT));
        session.pump();
        assert!(session.load_text("timestamp,v\n0,1\n10,2\n"));
        pump_all(&mut session);

        let ds = session.dataset().unwrap();
        assert_eq!(ds.metadata().row_count, 2);
        assert_eq!(session.viewport(), Viewport::new(0.0, 10.0));
    }

    #[test]
    fn test_viewport_requests_are_debounced() {
        let mut session = loaded(FLIGHT);
        let t0 = Instant::now();
        let delay = session.config().debounce();

        session.request_viewport(0.0, 1.0, t0);
        session.request_viewport(1.0, 2.0, t0 + Duration::from_millis(10));
        assert!(!session.poll(t0 + Duration::from_millis(20)));
        assert_eq!(session.viewport(), Viewport::new(0.0, 3.0));

        assert!(session.poll(t0 + Duration::from_millis(10) + delay));
        assert_eq!(session.viewport(), Viewport::new(1.0, 2.0));
        assert_eq!(session.pending_viewport_in(t0), None);
    }

    #[test]
    fn test_viewport_is_clamped_to_series() {
        let mut session = loaded(FLIGHT);
        session.set_viewport(-5.0, 50.0);
        assert_eq!(session.viewport(), Viewport::new(0.0, 3.0));

        session.set_viewport(1.0, 2.0);
        session.reset_view();
        assert_eq!(session.viewport(), Viewport::new(0.0, 3.0));
    }

    #[test]
    fn test_adaptive_resolution_follows_viewport() {
        let mut text = String::from("timestamp,v\n");
        for i in 0..=10_000 {
            text.push_str(&format!("{},{}\n", i, i));
        }
        let mut session = loaded(&text);
        // 10001 rows over 10000 units, 500 point budget
        assert_eq!(session.resampler().min_resolution, 21.0);

        session.set_viewport(0.0, 1000.0);
        assert_eq!(session.resampler().min_resolution, 3.0);
    }

    #[test]
    fn test_toggle_and_chart() {
        let mut session = loaded(FLIGHT);
        assert!(session.toggle_variable("altitude"));

        let Some(ChartView::Plot(frame)) = session.chart() else {
            panic!("expected a plot");
        };
        assert_eq!(frame.datasets.len(), 1);
        assert_eq!(frame.events.len(), 1);

        session.set_viewport(2.5, 2.9);
        assert!(matches!(
            session.chart(),
            Some(ChartView::NoDataInRange { .. })
        ));
    }

    #[test]
    fn test_reload_drops_missing_selections() {
        let mut session = loaded(FLIGHT);
        session.toggle_variable("altitude");
        session.load_text("timestamp,speed\n0,1\n");
        pump_all(&mut session);
        assert!(session.selected().is_empty());
    }

    #[test]
    fn test_view_revision_tracks_jumps_not_gestures() {
        let mut session = Session::default();
        assert!(session.load_text(FLIGHT));
        let before_publish = session.view_revision();
        pump_all(&mut session);
        let published = session.view_revision();
        assert!(published > before_publish);

        let t0 = Instant::now();
        session.request_viewport(1.0, 2.0, t0);
        assert!(session.poll(t0 + session.config().debounce()));
        assert_eq!(session.view_revision(), published);

        session.set_viewport(0.5, 1.5);
        assert!(session.view_revision() > published);
    }

    #[test]
    fn test_reload_refits_view_after_zoom() {
        let mut session = loaded(FLIGHT);
        session.set_viewport(1.0, 2.0);
        let zoomed = session.view_revision();

        session.load_text("timestamp,v\n0,1\n10,2\n");
        pump_all(&mut session);
        assert_eq!(session.viewport(), Viewport::new(0.0, 10.0));
        assert!(session.view_revision() > zoomed);
    }

    #[test]
    fn test_typed_range_is_applied_and_clamped() {
        let mut session = loaded(FLIGHT);
        session.set_viewport(2.0, 1.0);
        assert_eq!(session.viewport(), Viewport::new(1.0, 2.0));
        session.set_viewport(2.5, 99.0);
        assert_eq!(session.viewport(), Viewport::new(2.5, 3.0));
    }

    #[test]
    fn test_pan_and_zoom_view() {
        let mut text = String::from("timestamp,v\n");
        for i in 0..=100 {
            text.push_str(&format!("{},{}\n", i, i));
        }
        let mut session = loaded(&text);

        session.zoom_view(0.5);
        assert_eq!(session.viewport(), Viewport::new(25.0, 75.0));
        session.pan_view(0.2);
        assert_eq!(session.viewport(), Viewport::new(35.0, 85.0));
        session.pan_view(10.0);
        assert_eq!(session.viewport(), Viewport::new(50.0, 100.0));
    }

    #[test]
    fn test_fixed_resolution_from_ui() {
        let mut session = loaded(FLIGHT);
        session.set_resolution_policy(ResolutionPolicy::Fixed { min_resolution: 2.0 });
        assert_eq!(session.resampler().min_resolution, 2.0);
        session.toggle_variable("altitude");

        let Some(ChartView::Plot(frame)) = session.chart() else {
            panic!("expected a plot");
        };
        assert_eq!(frame.step, 2);

        session.clear_selection();
        assert!(session.selected().is_empty());
    }
}
