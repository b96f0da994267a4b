//! Projection of resampled rows into renderer-ready datasets

use crate::config::Config;
use crate::data::{Dataset, Row};
use crate::perf::{Resampled, ResamplerState, resample};
use crate::state::{SelectedVariables, Viewport};

/// One point of a plotted series
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    /// Timestamp relative to the first row
    pub x: f64,
    /// `None` where the field is not a number; drawn as a gap
    pub y: Option<f64>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotDataset {
    pub label: String,
    pub points: Vec<PlotPoint>,
    /// Degrees on the color wheel, `[0, 360)`
    pub color_hue: f32,
}

/// An event marker on the time axis
#[derive(Debug, Clone, PartialEq)]
pub struct EventMarker {
    pub x: f64,
    pub message: String,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub datasets: Vec<PlotDataset>,
    pub x_domain: (f64, f64),
    pub y_domain: (Option<f64>, Option<f64>),
    pub step: usize,
    pub events: Vec<EventMarker>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    Plot(ChartFrame),
    /// The viewport holds no rows
    NoDataInRange { x_domain: (f64, f64) },
}

/// Columns that can be plotted, in header order
pub fn available_variables(dataset: &Dataset) -> Vec<String> {
    let ts = dataset.timestamp_index();
    let msg = dataset.message_index();
    dataset
        .header()
        .names()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ts && Some(*i) != msg)
        .map(|(_, name)| name.clone())
        .collect()
}

/// Evenly spaced hue for dataset `k` of `n`
pub fn hue_for(k: usize, n: usize) -> f32 {
    if n == 0 {
        return 0.0;
    }
    (k as f64 * 360.0 / n as f64) as f32
}

/// One dataset per selected variable, in header order
pub fn project(rows: &[&Row], dataset: &Dataset, selected: &SelectedVariables) -> Vec<PlotDataset> {
    profiling::scope!("project");

    let header = dataset.header();
    let columns: Vec<(usize, String)> = available_variables(dataset)
        .into_iter()
        .filter(|name| selected.contains(name))
        .filter_map(|name| header.index_of(&name).map(|idx| (idx, name)))
        .collect();
    let n = columns.len();

    columns
        .into_iter()
        .enumerate()
        .map(|(k, (idx, label))| {
            let points = rows
                .iter()
                .filter_map(|row| {
                    let x = dataset.relative_time(row)?;
                    Some(PlotPoint {
                        x,
                        y: row.number(idx),
                        message: dataset.message(row),
                    })
                })
                .collect();
            PlotDataset {
                label,
                points,
                color_hue: hue_for(k, n),
            }
        })
        .collect()
}

/// Resample `dataset` for `viewport` and project the selected variables
pub fn build_chart(
    dataset: &Dataset,
    viewport: Viewport,
    selected: &SelectedVariables,
    state: &ResamplerState,
    config: &Config,
) -> ChartView {
    let x_domain = (viewport.min(), viewport.max());
    match resample(dataset, viewport, selected.len(), state) {
        Resampled::EmptyRange => ChartView::NoDataInRange { x_domain },
        Resampled::Rows { rows, step } => {
            let events = rows
                .iter()
                .filter_map(|row| {
                    Some(EventMarker {
                        x: dataset.relative_time(row)?,
                        message: dataset.message(row)?,
                    })
                })
                .collect();
            ChartView::Plot(ChartFrame {
                datasets: project(&rows, dataset, selected),
                x_domain,
                y_domain: (config.y_min, config.y_max),
                step,
                events,
            })
        }
    }
}
