#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::Path;

use telemetry_oxide::config::Config;
use telemetry_oxide::constants;
use tracing_subscriber::EnvFilter;

mod app;
mod ui;

use app::TelemetryApp;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    #[cfg(feature = "profile-with-puffin")]
    let _puffin_server = {
        puffin::set_scopes_on(true);
        let addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        match puffin_http::Server::new(&addr) {
            Ok(server) => {
                tracing::info!("Puffin server listening on {}", addr);
                Some(server)
            }
            Err(e) => {
                tracing::warn!("Could not start puffin server: {}", e);
                None
            }
        }
    };

    let config = Config::load_or_default(Path::new(constants::config::CONFIG_FILE));
    let mut app = TelemetryApp::new(config);
    if let Some(path) = std::env::args_os().nth(1) {
        app.open_file(path.into());
    }

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Telemetry Oxide",
        options,
        Box::new(|_| Ok(Box::new(app))),
    )
}
