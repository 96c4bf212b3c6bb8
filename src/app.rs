use eframe::egui;

use crate::color;
use crate::state::AppState;
use crate::ui::{kpi, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ChurnInsightsApp {
    pub state: AppState,
}

impl ChurnInsightsApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Self { state }
    }
}

impl eframe::App for ChurnInsightsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: header and contract filter ----
        egui::SidePanel::left("filter_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, tabs, charts ----
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(color::background()))
            .show(ctx, |ui| {
                if self.state.dataset.is_some() {
                    kpi::kpi_row(ui, &self.state.kpis);
                    ui.add_space(12.0);
                    panels::tab_bar(ui, &mut self.state);
                    ui.separator();
                }
                plot::tab_content(ui, &self.state);
            });
    }
}
