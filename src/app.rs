use eframe::egui::{self, ScrollArea, Ui};

use crate::state::DashboardState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CreditDashboardApp {
    pub state: DashboardState,
}

impl CreditDashboardApp {
    pub fn new(state: DashboardState) -> Self {
        Self { state }
    }
}

impl eframe::App for CreditDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: client choice ----
        egui::SidePanel::left("client_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: score, table, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    panels::client_summary(ui, &self.state);
                    ui.separator();

                    ui.heading("Filtered client information");
                    panels::filter_panel(ui, &mut self.state);
                    table::client_table(ui, &self.state);
                    ui.separator();

                    ui.heading("Income");
                    plot::income_histogram(ui, &self.state);

                    ui.heading("Indicator comparison");
                    plot::indicator_comparison(ui, &mut self.state);

                    ui.heading("Income by number of children");
                    plot::children_income_scatter(ui, &self.state);

                    ui.heading("Feature attributions");
                    plot::attribution_chart(ui, &self.state);
                });
        });
    }
}
