mod plot;
mod range_input;
mod series_panel;
mod toolbar;

pub use plot::render_plot;
pub use series_panel::render_series_panel;
pub use toolbar::render_toolbar;
