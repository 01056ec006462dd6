mod app;
mod color;
mod state;
mod ui;

use anyhow::Context;
use app::CreditDashboardApp;
use credit_dashboard::data::DatasetStore;
use credit_dashboard::model::ModelStore;
use credit_dashboard::scoring;
use credit_dashboard::DashboardConfig;
use eframe::egui;
use state::DashboardState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let state = match load_state() {
        Ok(state) => state,
        Err(e) => {
            log::error!("{e:#}");
            return Err(e);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Credit Scoring Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CreditDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Load datasets and model once; any failure ends the session.
fn load_state() -> anyhow::Result<DashboardState> {
    let config = DashboardConfig::from_env()?;
    log::info!("Starting with {config:?}");

    let datasets = DatasetStore::from_config(&config)
        .load()
        .context("loading client datasets")?;
    let model = ModelStore::new(&config.model_path)
        .load()
        .context("loading model")?;
    scoring::check_model_fits(model.as_ref(), &datasets.features)
        .context("model does not match the feature sample")?;

    Ok(DashboardState::new(datasets, model, config.histogram_bins))
}
