//! Performance-sensitive paths
//!
//! - viewport resampling (range + density filter)
//! - background file reading
//!
//! Hot paths are instrumented with `profiling::scope!`, which compiles to
//! nothing unless a `profile-with-*` feature is enabled.

mod resample;
mod worker;

pub use resample::{Resampled, ResamplerState, density_filter, range_filter, resample};
pub use worker::{BackgroundWorker, WorkerRequest, WorkerResult};

// Re-export profiling macros for convenience
// When no profiling feature is enabled, these become no-ops
pub use profiling;
