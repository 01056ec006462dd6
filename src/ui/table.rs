use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::DashboardState;

const ROW_HEIGHT: f32 = 18.0;

/// The filtered client table, identifier column first.
pub fn client_table(ui: &mut Ui, state: &DashboardState) {
    let clients = &state.datasets.clients;
    let visible = &state.visible_rows;

    ui.label(format!("{} of {} clients", visible.len(), clients.len()));

    ui.push_id("client_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(320.0)
            .column(Column::auto().at_least(90.0))
            .columns(Column::auto().at_least(70.0), clients.columns().len())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                header.col(|ui| {
                    ui.strong(clients.id_column());
                });
                for col in clients.columns() {
                    header.col(|ui| {
                        ui.strong(col);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, visible.len(), |mut row| {
                    let record = &clients.rows()[visible[row.index()]];
                    row.col(|ui| {
                        ui.label(record.id.to_string());
                    });
                    for value in &record.values {
                        row.col(|ui| {
                            ui.label(value.to_string());
                        });
                    }
                });
            });
    });
}
