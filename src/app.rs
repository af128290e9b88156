use eframe::egui;

use reflectance_classifier::config::Config;

use crate::state::DashboardState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: DashboardState,
}

impl DashboardApp {
    /// Build the dashboard and run the pipeline once, like a page load.
    pub fn new(config: Config) -> Self {
        let mut state = DashboardState::new(config);
        state.refresh();
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar, refresh, timestamp ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: classification per model ----
        egui::SidePanel::left("results_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Bottom panel: reflectance table ----
        egui::TopBottomPanel::bottom("table_panel")
            .resizable(true)
            .default_height(120.0)
            .show(ctx, |ui| {
                table::reflectance_table(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::reflectance_plot(ui, &self.state);
        });
    }
}
