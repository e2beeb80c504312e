//! User interface for the Parley client

pub mod app;
pub mod components;
pub mod theme;

pub use app::ParleyApp;
pub use theme::Theme;

use crate::config::AppConfig;
use crate::connection::CredentialFetcher;
use crate::session::SessionSupervisor;
use crate::transport::LoopbackTransport;
use std::sync::Arc;

/// Start the supervisor and run the GUI application until exit.
///
/// The loopback transport stands in for the production media layer; an
/// embedding application provides its own [`crate::transport::Transport`]
/// and wires it through [`SessionSupervisor::new`] the same way.
pub fn run(config: AppConfig) -> eframe::Result<()> {
    let fetcher = CredentialFetcher::new(config.backend_url.clone());
    let (supervisor, handle) =
        SessionSupervisor::new(&config, Arc::new(fetcher), Arc::new(LoopbackTransport::new()));
    supervisor.start();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 640.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Parley",
        options,
        Box::new(move |cc| Ok(Box::new(ParleyApp::new(cc, handle, &config)))),
    )
}
