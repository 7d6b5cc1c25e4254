mod app;
mod charts;
mod color;
mod config;
mod dashboard;
mod data;
mod state;
mod ui;

use app::HappinessApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    eframe::run_native(
        "World Happiness Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(HappinessApp::new(config)))),
    )
}
