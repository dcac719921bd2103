use eframe::egui;

use crate::config::Sources;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RideWiseApp {
    pub state: AppState,
}

impl RideWiseApp {
    /// Build the app and load the configured tables straight away.
    pub fn new(sources: Sources) -> Self {
        let mut state = AppState::new(sources);
        state.load();
        Self { state }
    }
}

impl eframe::App for RideWiseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::dashboard_view(ui, &self.state);
        });
    }
}
