use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MeshstatApp {
    pub state: AppState,
}

impl MeshstatApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for MeshstatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: toolbar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: chart list ----
        egui::SidePanel::left("chart_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart grid ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_grid(ui, &self.state);
        });
    }
}
