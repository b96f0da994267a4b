//! Telemetry log ingestion and viewport-driven resampling
//!
//! Raw delimited text is parsed chunk by chunk into an immutable [`data::Dataset`].
//! For every viewport the [`perf`] resampler picks which rows to draw, and
//! [`chart`] projects them into one series per selected variable. [`state::Session`]
//! wires these together for an interactive host.

pub mod chart;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod perf;
pub mod state;
