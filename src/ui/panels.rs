use eframe::egui::{self, Color32, RichText, Ui};

use credit_dashboard::data::Value;

use crate::color;
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Left side panel – client selection
// ---------------------------------------------------------------------------

/// Render the left panel with the client picker.
pub fn side_panel(ui: &mut Ui, state: &mut DashboardState) {
    ui.heading("Client");
    ui.separator();

    if state.client_ids.is_empty() {
        ui.label("No client to score.");
        return;
    }

    let selected_text = state
        .selected
        .map(|id| id.to_string())
        .unwrap_or_default();

    let mut picked = None;
    egui::ComboBox::from_id_salt("client_choice")
        .selected_text(selected_text)
        .height(400.0)
        .show_ui(ui, |ui: &mut Ui| {
            for &id in &state.client_ids {
                if ui
                    .selectable_label(state.selected == Some(id), id.to_string())
                    .clicked()
                {
                    picked = Some(id);
                }
            }
        });

    if let Some(id) = picked {
        if state.selected != Some(id) {
            log::debug!("Client {id} selected");
            state.select_client(id);
        }
    }

    ui.add_space(8.0);
    ui.label(format!("{} clients available", state.client_ids.len()));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar and the status line.
pub fn top_bar(ui: &mut Ui, state: &DashboardState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading(RichText::new("CREDIT SCORING").strong());

        ui.separator();
        ui.label(format!(
            "{} clients loaded, {} visible",
            state.datasets.clients.len(),
            state.visible_rows.len()
        ));

        for msg in state.chart_error.iter().chain(&state.status_message) {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Score and client information
// ---------------------------------------------------------------------------

/// Default probability, risk label and the client's main attributes.
pub fn client_summary(ui: &mut Ui, state: &DashboardState) {
    let Some(id) = state.selected else {
        return;
    };
    let report = &state.report;

    if let Some(score) = report.score {
        ui.label(
            RichText::new(format!(
                "Default probability of client {id}: {:.0} %",
                score * 100.0
            ))
            .strong()
            .size(16.0),
        );
    }
    if let Some(tier) = report.tier {
        ui.label(
            RichText::new(format!("The client presents a {tier}."))
                .color(color::tier_color(tier.color())),
        );
    }

    ui.add_space(8.0);
    ui.strong("Main client information");
    if let Some(profile) = &report.profile {
        egui::Grid::new("client_profile")
            .num_columns(2)
            .spacing([24.0, 4.0])
            .show(ui, |ui: &mut Ui| {
                for (label, value) in profile.lines() {
                    ui.label(RichText::new(label).strong());
                    ui.label(value);
                    ui.end_row();
                }
            });
    }
}

// ---------------------------------------------------------------------------
// Filter widgets
// ---------------------------------------------------------------------------

/// Pick filter columns, then one value per column.
pub fn filter_panel(ui: &mut Ui, state: &mut DashboardState) {
    let columns = state.datasets.clients.columns().to_vec();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Filter variables");
        egui::ComboBox::from_id_salt("filter_add")
            .selected_text("Add…")
            .height(300.0)
            .show_ui(ui, |ui: &mut Ui| {
                for col in &columns {
                    let active = state.filter_columns.contains(col);
                    if ui.selectable_label(active, col).clicked() {
                        if active {
                            state.remove_filter_column(col);
                        } else {
                            state.add_filter_column(col);
                        }
                    }
                }
            });
    });

    // Clone what we need so we can mutate state inside the loop.
    let active = state.filter_columns.clone();
    for col in &active {
        let choices = state.filter_choices.get(col).cloned().unwrap_or_default();
        let current = state.filter_values.get(col).cloned();

        ui.horizontal(|ui: &mut Ui| {
            ui.label(format!("Value of {col}"));
            let mut picked: Option<Value> = None;
            egui::ComboBox::from_id_salt(("filter_value", col))
                .selected_text(current.as_ref().map(|v| v.to_string()).unwrap_or_default())
                .height(300.0)
                .show_ui(ui, |ui: &mut Ui| {
                    for value in &choices {
                        if ui
                            .selectable_label(current.as_ref() == Some(value), value.to_string())
                            .clicked()
                        {
                            picked = Some(value.clone());
                        }
                    }
                });
            if let Some(value) = picked {
                state.set_filter_value(col, value);
            }
            if ui.small_button("✖").clicked() {
                state.remove_filter_column(col);
            }
        });
    }
}
