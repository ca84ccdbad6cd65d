//! Minipad - minimalist markdown notepad
//!
//! Multiple documents in tabs, live preview, search and replace, themes,
//! auto-save and export.

mod app;
mod core;
mod render;
mod ui;

use app::NotepadApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Minipad...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Minipad"),
        ..Default::default()
    };

    eframe::run_native(
        "Minipad",
        native_options,
        Box::new(|cc| Ok(Box::new(NotepadApp::new(cc)))),
    )
}
