mod app;
mod color;
mod config;
mod data;
mod money;
mod state;
mod ui;

use std::path::Path;

use app::SavingsScopeApp;
use config::SourceConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = SourceConfig::load_or_default(Path::new("savings-scope.json"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Savings Scope – Contract Savings Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(SavingsScopeApp::new(config)))),
    )
}
