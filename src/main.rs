mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use app::RideWiseApp;
use clap::Parser;
use config::{Cli, Mode};
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let sources = cli.sources();

    match cli.mode {
        Some(Mode::Report(args)) => report::run(&sources, &args),
        Some(Mode::Gui) | None => run_gui(sources),
    }
}

fn run_gui(sources: config::Sources) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "RideWise – Komuter Ridership Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(RideWiseApp::new(sources)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
