//! Application-wide constants and default values
//!
//! This module centralizes all magic numbers and default values used throughout
//! the engine and viewer, making them easier to maintain and configure.

/// Ingestion defaults
pub mod ingest {
    /// Data lines parsed per cooperative step
    pub const DEFAULT_CHUNK_ROWS: usize = 5000;

    /// Default field delimiter
    pub const DEFAULT_DELIMITER: char = ',';

    /// Progress value reported once ingestion completes
    pub const PROGRESS_COMPLETE: f32 = 100.0;
}

/// Column naming defaults
pub mod columns {
    /// Column holding the monotonic timestamp
    pub const DEFAULT_TIMESTAMP_COLUMN: &str = "timestamp";

    /// Optional sparse column carrying event messages
    pub const DEFAULT_MESSAGE_COLUMN: &str = "messages";
}

/// Resampling policy constants
pub mod resample {
    /// On-screen point budget used to derive the minimum resolution
    pub const DEFAULT_TARGET_ONSCREEN_POINTS: usize = 500;

    /// Coarsest step before any viewport change has been observed
    pub const DEFAULT_MIN_RESOLUTION: f64 = 100.0;

    /// Finest step: every row is plotted
    pub const MAX_RESOLUTION: f64 = 1.0;
}

/// Interaction timing
pub mod interaction {
    /// Quiet period after the last pan/zoom before resampling
    pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

    /// Relative change in viewport bounds that counts as a new gesture
    pub const VIEWPORT_EPSILON: f64 = 1e-9;
}

/// Performance and optimization constants
pub mod performance {
    /// Maximum number of recent files to track
    pub const MAX_RECENT_FILES: usize = 10;
}

/// Plotting and visualization defaults
pub mod plot {
    /// Marker radius for rows carrying a message
    pub const EVENT_MARKER_RADIUS: f32 = 5.0;

    /// Line width for sensor series
    pub const LINE_WIDTH: f32 = 1.5;

    /// Unix seconds treated as the earliest plausible wall-clock timestamp (2000-01-01)
    pub const MIN_EPOCH_SECONDS: f64 = 946_684_800.0;

    /// Unix seconds treated as the latest plausible wall-clock timestamp (2038-01-19)
    pub const MAX_EPOCH_SECONDS: f64 = 2_147_483_647.0;
}

/// UI layout defaults
pub mod layout {
    /// Left panel (variable selector) default width
    pub const SERIES_PANEL_WIDTH: f32 = 200.0;

    /// Minimum plot height
    pub const MIN_PLOT_HEIGHT: f32 = 200.0;
}

/// Configuration file paths
pub mod config {
    /// Configuration file name
    pub const CONFIG_FILE: &str = "telemetry-oxide.json";
}
