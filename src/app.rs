use eframe::egui;

use crate::state::AppState;
use crate::ui::logos::LogoTextures;
use crate::ui::map_view::MapWidget;
use crate::ui::{charts, map_view, panels};

const MAP_HEIGHT: f32 = 600.0;
const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PointsDashboardApp {
    pub state: AppState,
    map: MapWidget,
    logos: LogoTextures,
}

impl PointsDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            map: MapWidget::default(),
            logos: LogoTextures::default(),
        }
    }
}

impl eframe::App for PointsDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: map, then statistics ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("🗺 Interactive map");
                    map_view::map_view(ui, &mut self.state, &mut self.map, &mut self.logos, MAP_HEIGHT);
                    map_view::pin_legend(ui, &self.state);

                    ui.add_space(12.0);
                    ui.heading("📊 Statistics of the filtered points");
                    ui.columns(2, |columns| {
                        charts::company_chart(&mut columns[0], &self.state, CHART_HEIGHT);
                        charts::category_chart(&mut columns[1], &self.state, CHART_HEIGHT);
                    });

                    ui.add_space(12.0);
                    ui.heading("🏘 Top neighborhoods");
                    charts::neighborhood_chart(ui, &self.state, CHART_HEIGHT);
                });
        });
    }
}
