//! Viewport-driven resampling
//!
//! Two passes, in this order:
//! 1. range filter: rows whose relative timestamp lies in the viewport (inclusive)
//! 2. density filter: every `step`-th row of the range set, plus every event row
//!
//! The step comes from [`ResamplerState::step_size`]. Zoomed in, it tends to 1
//! (every row); zoomed out it tends to the minimum resolution, scaled by the
//! number of variables drawn at once.

use crate::config::{Config, ResolutionPolicy};
use crate::constants::resample::MAX_RESOLUTION;
use crate::data::{Dataset, Row, SeriesMetadata};
use crate::state::Viewport;

/// Resolution parameters, owned by whoever drives the chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResamplerState {
    /// Coarsest step (rows skipped per plotted row) at full zoom-out
    pub min_resolution: f64,
    /// Finest step
    pub max_resolution: f64,
    pub policy: ResolutionPolicy,
    pub target_onscreen_points: usize,
}

impl ResamplerState {
    pub fn new(config: &Config) -> Self {
        let min_resolution = match config.resolution {
            ResolutionPolicy::Fixed { min_resolution } => min_resolution,
            ResolutionPolicy::Adaptive => config.initial_min_resolution,
        };
        Self {
            min_resolution,
            max_resolution: MAX_RESOLUTION,
            policy: config.resolution,
            target_onscreen_points: config.target_onscreen_points.max(1),
        }
    }

    /// State pinned to a fixed minimum resolution
    pub fn fixed(min_resolution: f64) -> Self {
        Self::new(&Config {
            resolution: ResolutionPolicy::Fixed { min_resolution },
            ..Config::default()
        })
    }

    /// Re-derive the minimum resolution for a new visible range.
    ///
    /// Only the adaptive policy reacts. An undefined sample rate (empty or
    /// zero-duration series) leaves the current value in place.
    pub fn on_viewport_change(&mut self, visible_range: f64, metadata: &SeriesMetadata) {
        if self.policy != ResolutionPolicy::Adaptive {
            return;
        }
        let Some(rate) = metadata.sample_rate() else {
            return;
        };
        let derived = (visible_range * rate / self.target_onscreen_points as f64).ceil();
        if derived.is_finite() {
            self.min_resolution = derived.max(1.0);
            tracing::debug!(
                "min_resolution = {} for range {:.3} at {:.3} rows/unit",
                self.min_resolution,
                visible_range,
                rate
            );
        }
    }

    /// Row step for the density filter, always >= 1.
    ///
    /// Zero selected variables or an undefined elapsed time mean "show all".
    pub fn step_size(
        &self,
        visible_range: f64,
        selected_count: usize,
        total_elapsed: f64,
    ) -> usize {
        if selected_count == 0 || !(total_elapsed.is_finite() && total_elapsed > 0.0) {
            return 1;
        }
        let range_ratio =
            (visible_range * selected_count as f64) / (total_elapsed * self.max_resolution);
        let s = self.min_resolution
            + (self.max_resolution - self.min_resolution) * (1.0 - range_ratio);
        if !s.is_finite() || s < 1.0 {
            return 1;
        }
        s.floor() as usize
    }
}

impl Default for ResamplerState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// Result of a resampling pass
#[derive(Debug, Clone, PartialEq)]
pub enum Resampled<'a> {
    Rows { rows: Vec<&'a Row>, step: usize },
    /// Nothing lies inside the viewport; the caller shows a placeholder
    EmptyRange,
}

impl<'a> Resampled<'a> {
    pub fn rows(&self) -> &[&'a Row] {
        match self {
            Resampled::Rows { rows, .. } => rows,
            Resampled::EmptyRange => &[],
        }
    }
}

/// Rows whose timestamp minus `origin` lies in the viewport, in input order.
///
/// Bounds are found by binary search, which assumes non-decreasing timestamps.
/// Rows with a non-numeric timestamp are never returned.
pub fn range_filter<'a>(
    rows: &'a [Row],
    timestamp_index: usize,
    origin: f64,
    viewport: Viewport,
) -> Vec<&'a Row> {
    profiling::scope!("range_filter");

    let relative = |row: &Row| row.number(timestamp_index).map(|t| t - origin);
    let start = rows.partition_point(|r| relative(r).is_some_and(|t| t < viewport.min()));
    let end = rows.partition_point(|r| relative(r).is_none_or(|t| t <= viewport.max()));
    if start >= end {
        return Vec::new();
    }

    rows[start..end]
        .iter()
        .filter(|r| relative(*r).is_some_and(|t| viewport.contains(t)))
        .collect()
}

/// Keep every `step`-th row plus every row carrying a message
pub fn density_filter<'a>(
    rows: Vec<&'a Row>,
    step: usize,
    message_index: Option<usize>,
) -> Vec<&'a Row> {
    profiling::scope!("density_filter");

    if step <= 1 {
        return rows;
    }
    rows.into_iter()
        .enumerate()
        .filter(|(i, row)| i % step == 0 || row.has_message(message_index))
        .map(|(_, row)| row)
        .collect()
}

/// Select the rows to plot for `viewport`
pub fn resample<'a>(
    dataset: &'a Dataset,
    viewport: Viewport,
    selected_count: usize,
    state: &ResamplerState,
) -> Resampled<'a> {
    profiling::scope!("resample");

    let metadata = dataset.metadata();
    let in_range = range_filter(
        dataset.rows(),
        dataset.timestamp_index(),
        metadata.initial_timestamp,
        viewport,
    );
    if in_range.is_empty() {
        return Resampled::EmptyRange;
    }

    let step = state.step_size(viewport.range(), selected_count, metadata.total_elapsed());
    let rows = density_filter(in_range, step, dataset.message_index());
    Resampled::Rows { rows, step }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ingest_all;
    use std::sync::Arc;

    const FLIGHT: &str = "timestamp,altitude,messages\n0,0,\n1,10,\n2,20,liftoff\n3,30,\n";

    fn load(text: &str) -> Arc<Dataset> {
        ingest_all(text, &Config::default()).unwrap().0
    }

    fn relative_times(ds: &Dataset, rows: &[&Row]) -> Vec<f64> {
        rows.iter().filter_map(|r| ds.relative_time(r)).collect()
    }

    /// 10_000 rows at 100 Hz with an event every 733 rows
    fn long_series() -> Arc<Dataset> {
        let mut text = String::from("timestamp,a,b,messages\n");
        for i in 0..10_000 {
            let msg = if i % 733 == 5 { format!("event {}", i) } else { String::new() };
            text.push_str(&format!("{},{},{},{}\n", 1000.0 + i as f64 * 0.01, i, i % 7, msg));
        }
        load(&text)
    }

    #[test]
    fn test_flight_step_two() {
        let ds = load(FLIGHT);
        let state = ResamplerState::fixed(2.0);
        let out = resample(&ds, Viewport::new(0.0, 3.0), 1, &state);

        let Resampled::Rows { rows, step } = out else {
            panic!("expected rows");
        };
        assert_eq!(step, 2);
        assert_eq!(relative_times(&ds, &rows), vec![0.0, 2.0]);
    }

    #[test]
    fn test_out_of_data_viewport_is_empty() {
        let ds = load(FLIGHT);
        let out = resample(&ds, Viewport::new(5.0, 6.0), 1, &ResamplerState::default());
        assert_eq!(out, Resampled::EmptyRange);
        assert!(out.rows().is_empty());
    }

    #[test]
    fn test_range_is_inclusive() {
        let ds = load(FLIGHT);
        let rows = range_filter(ds.rows(), 0, 0.0, Viewport::new(1.0, 2.0));
        assert_eq!(relative_times(&ds, &rows), vec![1.0, 2.0]);
    }

    #[test]
    fn test_range_filter_uses_relative_time() {
        let ds = load("timestamp,v\n100,1\n101,2\n102,3\n");
        let rows = range_filter(ds.rows(), 0, 100.0, Viewport::new(1.0, 5.0));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_range_filter_skips_text_timestamps() {
        let ds = load("timestamp,v\n0,1\n1,2\nglitch,3\n3,4\n4,5\n");
        let rows = range_filter(ds.rows(), 0, 0.0, Viewport::new(0.5, 3.5));
        assert_eq!(relative_times(&ds, &rows), vec![1.0, 3.0]);
    }

    #[test]
    fn test_range_filter_is_idempotent() {
        let ds = long_series();
        let origin = ds.metadata().initial_timestamp;
        let vp = Viewport::new(12.345, 47.5);

        let once: Vec<Row> = range_filter(ds.rows(), 0, origin, vp)
            .into_iter()
            .cloned()
            .collect();
        let twice: Vec<Row> = range_filter(&once, 0, origin, vp)
            .into_iter()
            .cloned()
            .collect();
        assert!(!once.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_events_survive_any_step() {
        let ds = long_series();
        let vp = Viewport::new(3.0, 90.0);
        let expected: Vec<f64> = ds
            .rows()
            .iter()
            .filter(|r| ds.is_event(r))
            .filter_map(|r| ds.relative_time(r))
            .filter(|t| vp.contains(*t))
            .collect();
        assert!(!expected.is_empty());

        for min_res in [1.0, 2.0, 17.0, 100.0, 5000.0] {
            let out = resample(&ds, vp, 3, &ResamplerState::fixed(min_res));
            let kept: Vec<f64> = out
                .rows()
                .iter()
                .filter(|r| ds.is_event(r))
                .filter_map(|r| ds.relative_time(r))
                .collect();
            assert_eq!(kept, expected, "min_resolution {}", min_res);
        }
    }

    #[test]
    fn test_step_non_decreasing_with_range() {
        let state = ResamplerState::fixed(100.0);
        let total = 100.0;
        for count in 1..4 {
            let steps: Vec<usize> = (0..=100)
                .map(|r| state.step_size(r as f64, count, total))
                .collect();
            assert!(steps.windows(2).all(|w| w[0] <= w[1]), "count {}", count);
            assert_eq!(steps[0], 1);
        }
        assert_eq!(state.step_size(total, 1, total), 100);
    }

    #[test]
    fn test_more_variables_thin_harder() {
        let state = ResamplerState::fixed(100.0);
        let one = state.step_size(50.0, 1, 100.0);
        let three = state.step_size(50.0, 3, 100.0);
        assert!(three > one);
    }

    #[test]
    fn test_zero_guards_show_all() {
        let state = ResamplerState::fixed(100.0);
        assert_eq!(state.step_size(10.0, 0, 100.0), 1);
        assert_eq!(state.step_size(10.0, 2, 0.0), 1);
        assert_eq!(state.step_size(10.0, 2, f64::NAN), 1);
    }

    #[test]
    fn test_adaptive_min_resolution() {
        let ds = long_series();
        let mut state = ResamplerState::default();
        assert_eq!(state.min_resolution, 100.0);

        // ~100.01 rows per unit, 50 units visible, 500 target points
        state.on_viewport_change(50.0, ds.metadata());
        assert_eq!(state.min_resolution, 11.0);

        state.on_viewport_change(0.5, ds.metadata());
        assert_eq!(state.min_resolution, 1.0);
    }

    #[test]
    fn test_adaptive_ignores_undefined_rate() {
        let ds = load("timestamp,v\n");
        let mut state = ResamplerState::default();
        state.on_viewport_change(10.0, ds.metadata());
        assert_eq!(state.min_resolution, 100.0);
    }

    #[test]
    fn test_fixed_policy_ignores_viewport() {
        let ds = long_series();
        let mut state = ResamplerState::fixed(42.0);
        state.on_viewport_change(1.0, ds.metadata());
        assert_eq!(state.min_resolution, 42.0);
    }

    #[test]
    fn test_full_view_point_budget() {
        let ds = long_series();
        let total = ds.metadata().total_elapsed();
        let mut state = ResamplerState::default();
        state.on_viewport_change(total, ds.metadata());

        let out = resample(&ds, Viewport::full(total), 1, &state);
        // ~500 sampled rows plus at most one extra per event
        assert!(out.rows().len() <= 500 + 14, "{}", out.rows().len());
        assert!(out.rows().len() >= 450, "{}", out.rows().len());
    }
}
