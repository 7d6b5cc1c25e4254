use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HappinessApp {
    pub state: AppState,
    pub config: DashboardConfig,
}

impl HappinessApp {
    /// Start with the configured dataset already loaded (or its error shown).
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::default();
        state.load(&config.dataset_path);
        Self { state, config }
    }
}

impl eframe::App for HappinessApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(self.config.sidebar_width)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        self.state.rerun();

        // ---- Central panel: table and views ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::dashboard_panel(ui, &self.state, &self.config);
        });
    }
}
