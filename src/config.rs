use std::path::PathBuf;

use anyhow::Context;

/// Where the dashboard finds its inputs, and how it draws them.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub clients_path: PathBuf,
    pub features_path: PathBuf,
    pub model_path: PathBuf,
    pub id_column: String,
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            clients_path: PathBuf::from("data/default_risk.csv"),
            features_path: PathBuf::from("data/X_sample.csv"),
            model_path: PathBuf::from("model/model.json"),
            id_column: "SK_ID_CURR".to_string(),
            histogram_bins: 100,
        }
    }
}

impl DashboardConfig {
    /// Read `CREDIT_DASHBOARD_*` variables, honouring a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let histogram_bins = match get("CREDIT_DASHBOARD_HISTOGRAM_BINS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .with_context(|| {
                    format!("CREDIT_DASHBOARD_HISTOGRAM_BINS must be a positive integer, got '{raw}'")
                })?,
            None => defaults.histogram_bins,
        };

        Ok(Self {
            clients_path: get("CREDIT_DASHBOARD_CLIENTS")
                .map(PathBuf::from)
                .unwrap_or(defaults.clients_path),
            features_path: get("CREDIT_DASHBOARD_FEATURES")
                .map(PathBuf::from)
                .unwrap_or(defaults.features_path),
            model_path: get("CREDIT_DASHBOARD_MODEL")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            id_column: get("CREDIT_DASHBOARD_ID_COLUMN").unwrap_or(defaults.id_column),
            histogram_bins,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_variables_use_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("CREDIT_DASHBOARD_MODEL", "/srv/models/lgbm.json"),
            ("CREDIT_DASHBOARD_HISTOGRAM_BINS", "40"),
            ("CREDIT_DASHBOARD_ID_COLUMN", "  "),
        ]))
        .unwrap();
        assert_eq!(config.model_path, PathBuf::from("/srv/models/lgbm.json"));
        assert_eq!(config.histogram_bins, 40);
        assert_eq!(config.id_column, "SK_ID_CURR");
    }

    #[test]
    fn bad_bin_count_is_rejected() {
        assert!(DashboardConfig::from_lookup(lookup(&[("CREDIT_DASHBOARD_HISTOGRAM_BINS", "0")])).is_err());
        assert!(DashboardConfig::from_lookup(lookup(&[("CREDIT_DASHBOARD_HISTOGRAM_BINS", "many")])).is_err());
    }
}
