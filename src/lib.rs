//! Credit-risk scoring dashboard core: client tables, the default-risk
//! classifier, risk tiers, table filters and chart data. The egui front end
//! lives in the binary.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod profile;
pub mod risk;
pub mod scoring;

pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
