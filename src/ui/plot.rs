use eframe::egui::{self, Ui};
use egui_plot::{Bar, BarChart, Legend, LineStyle, Plot, Points, VLine};

use credit_dashboard::profile;

use crate::color;
use crate::state::DashboardState;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Income distribution
// ---------------------------------------------------------------------------

/// Histogram of every client's income, the selected client marked.
pub fn income_histogram(ui: &mut Ui, state: &DashboardState) {
    let bars: Vec<Bar> = state
        .income_bins
        .iter()
        .map(|b| Bar::new(b.center(), b.count as f64).width(b.width()))
        .collect();

    let client_income = state
        .report
        .profile
        .as_ref()
        .and_then(|p| p.income.as_f64());

    Plot::new("income_histogram")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Income")
        .y_axis_label("Count")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("Clients")
                    .color(color::population_color()),
            );
            if let Some(income) = client_income {
                plot_ui.vline(
                    VLine::new(income)
                        .name("Selected client")
                        .color(color::client_color())
                        .style(LineStyle::dashed_loose()),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Indicator comparison
// ---------------------------------------------------------------------------

const COMPARISON_LABELS: [&str; 2] = ["Selected client", "Mean of other clients"];

/// Indicator picker plus client-vs-others bars.
pub fn indicator_comparison(ui: &mut Ui, state: &mut DashboardState) {
    let mut picked = None;
    egui::ComboBox::from_id_salt("indicator_choice")
        .selected_text(state.indicator)
        .show_ui(ui, |ui: &mut Ui| {
            for indicator in profile::COMPARABLE_INDICATORS {
                if ui
                    .selectable_label(state.indicator == indicator, indicator)
                    .clicked()
                {
                    picked = Some(indicator);
                }
            }
        });
    if let Some(indicator) = picked {
        state.set_indicator(indicator);
    }

    let Some(comparison) = state.report.comparison else {
        return;
    };

    let bars: Vec<Bar> = comparison
        .bars()
        .iter()
        .zip(COMPARISON_LABELS)
        .enumerate()
        .map(|(i, (&value, label))| {
            let fill = if i == 0 {
                color::client_color()
            } else {
                color::population_color()
            };
            Bar::new(i as f64, value).width(0.6).name(label).fill(fill)
        })
        .collect();

    Plot::new("indicator_comparison")
        .height(CHART_HEIGHT)
        .y_axis_label(state.indicator)
        .x_axis_formatter(|mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() < 1e-6 && (0.0..=1.0).contains(&i) {
                COMPARISON_LABELS[i as usize].to_string()
            } else {
                String::new()
            }
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Income vs. children
// ---------------------------------------------------------------------------

pub fn children_income_scatter(ui: &mut Ui, state: &DashboardState) {
    Plot::new("children_income")
        .height(CHART_HEIGHT)
        .x_axis_label("Number of children")
        .y_axis_label("Income")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(state.children_vs_income.clone())
                    .radius(2.5)
                    .color(color::population_color()),
            );
        });
}

// ---------------------------------------------------------------------------
// Feature attributions
// ---------------------------------------------------------------------------

/// Horizontal bars of the strongest contributions, largest on top.
pub fn attribution_chart(ui: &mut Ui, state: &DashboardState) {
    let attributions = &state.report.attributions;
    if attributions.is_empty() {
        ui.label("No feature attributions for this client.");
        return;
    }

    let max_abs = attributions
        .iter()
        .map(|(_, v)| v.abs())
        .fold(0.0, f64::max);
    let n = attributions.len();

    let bars: Vec<Bar> = attributions
        .iter()
        .enumerate()
        .map(|(i, (name, value))| {
            Bar::new((n - 1 - i) as f64, *value)
                .width(0.7)
                .name(name)
                .fill(color::attribution_color(*value, max_abs))
        })
        .collect();

    let names: Vec<String> = attributions.iter().rev().map(|(n, _)| n.clone()).collect();

    Plot::new("attributions")
        .height(CHART_HEIGHT)
        .x_axis_label("Contribution to default log-odds")
        .y_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < names.len() {
                names[i as usize].clone()
            } else {
                String::new()
            }
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}
