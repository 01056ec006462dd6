use std::collections::BTreeMap;
use std::sync::Arc;

use credit_dashboard::charts::{self, Bin, Comparison, DEFAULT_MAX_DISPLAY};
use credit_dashboard::data::filter::{self, FilterCriterion};
use credit_dashboard::data::{Datasets, Value};
use credit_dashboard::model::Classifier;
use credit_dashboard::profile::{self, ClientProfile};
use credit_dashboard::risk::{self, RiskTier};
use credit_dashboard::scoring::{self, ScoringService};
use credit_dashboard::Result;

// ---------------------------------------------------------------------------
// Per-client results
// ---------------------------------------------------------------------------

/// Everything computed for the selected client. A part that failed is
/// `None` and its error is in the status line.
#[derive(Debug, Clone, Default)]
pub struct ClientReport {
    pub score: Option<f64>,
    pub tier: Option<RiskTier>,
    pub profile: Option<ClientProfile>,
    pub comparison: Option<Comparison>,
    /// Strongest feature attributions, largest magnitude first.
    pub attributions: Vec<(String, f64)>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct DashboardState {
    /// Loaded once at startup, shared read-only.
    pub datasets: Arc<Datasets>,
    /// One model instance for scoring and explanation.
    pub model: Arc<dyn Classifier>,

    /// Clients that can be scored (ids of the feature sample).
    pub client_ids: Vec<i64>,
    pub selected: Option<i64>,
    pub report: ClientReport,

    /// Indicator used in the comparison chart.
    pub indicator: &'static str,

    /// Filter columns in the order the operator picked them.
    pub filter_columns: Vec<String>,
    /// Chosen value per filter column.
    pub filter_values: BTreeMap<String, Value>,
    /// Choices offered per filter column (cached).
    pub filter_choices: BTreeMap<String, Vec<Value>>,
    /// Client-table rows passing the current filters (cached).
    pub visible_rows: Vec<usize>,

    /// Population charts, independent of the selection.
    pub income_bins: Vec<Bin>,
    pub children_vs_income: Vec<[f64; 2]>,

    /// Why the population charts are empty, if they failed. Kept apart from
    /// `status_message`, which each selection clears.
    pub chart_error: Option<String>,
    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl DashboardState {
    pub fn new(datasets: Arc<Datasets>, model: Arc<dyn Classifier>, histogram_bins: usize) -> Self {
        let client_ids: Vec<i64> = datasets.features.ids().collect();
        let visible_rows = (0..datasets.clients.len()).collect();

        let mut state = Self {
            datasets,
            model,
            client_ids,
            selected: None,
            report: ClientReport::default(),
            indicator: profile::COMPARABLE_INDICATORS[0],
            filter_columns: Vec::new(),
            filter_values: BTreeMap::new(),
            filter_choices: BTreeMap::new(),
            visible_rows,
            income_bins: Vec::new(),
            children_vs_income: Vec::new(),
            chart_error: None,
            status_message: None,
        };

        let clients = &state.datasets.clients;
        let bins = charts::column_values(clients, profile::INCOME)
            .and_then(|values| charts::histogram(&values, histogram_bins));
        let points = charts::scatter(clients, profile::CHILDREN, profile::INCOME);
        state.income_bins = state.record(bins).unwrap_or_default();
        state.children_vs_income = state.record(points).unwrap_or_default();
        state.chart_error = state.status_message.take();

        if let Some(&first) = state.client_ids.first() {
            state.select_client(first);
        }
        state
    }

    /// Keep the value, or log the error and show it in the status line.
    fn record<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(format!("Error: {e}"));
                None
            }
        }
    }

    // -- Client selection ---------------------------------------------------

    /// Recompute score, interpretation, profile and charts for `id`.
    pub fn select_client(&mut self, id: i64) {
        self.selected = Some(id);
        self.status_message = None;

        let datasets = Arc::clone(&self.datasets);
        let model = Arc::clone(&self.model);
        let service = ScoringService::new(model.as_ref());

        let score = self.record(service.score(&datasets.features, id));
        let tier = match score {
            Some(s) => self.record(risk::interpret(s)).map(|(tier, _)| tier),
            None => None,
        };
        let profile = self.record(ClientProfile::extract(&datasets.clients, id));

        let attributions = match service.explain(&datasets.features, id) {
            Some(result) => self
                .record(result)
                .map(|a| {
                    let names = scoring::feature_names(&datasets.features);
                    charts::attribution_summary(names, &a, DEFAULT_MAX_DISPLAY)
                })
                .unwrap_or_default(),
            None => Vec::new(),
        };

        self.report = ClientReport {
            score,
            tier,
            profile,
            comparison: None,
            attributions,
        };
        self.refresh_comparison();
    }

    pub fn set_indicator(&mut self, indicator: &'static str) {
        self.indicator = indicator;
        self.refresh_comparison();
    }

    fn refresh_comparison(&mut self) {
        let Some(id) = self.selected else {
            return;
        };
        let datasets = Arc::clone(&self.datasets);
        let comparison = charts::indicator_comparison(&datasets.clients, id, self.indicator);
        self.report.comparison = self.record(comparison);
    }

    // -- Table filters ------------------------------------------------------

    /// The active criteria, in pick order.
    pub fn criteria(&self) -> Vec<FilterCriterion> {
        self.filter_columns
            .iter()
            .filter_map(|col| {
                self.filter_values
                    .get(col)
                    .map(|v| FilterCriterion::new(col.clone(), v.clone()))
            })
            .collect()
    }

    /// Start filtering on `column`, defaulting to its first value.
    pub fn add_filter_column(&mut self, column: &str) {
        if self.filter_columns.iter().any(|c| c == column) {
            return;
        }
        let datasets = Arc::clone(&self.datasets);
        let Some(choices) = self.record(filter::unique_values(&datasets.clients, column)) else {
            return;
        };
        let choices: Vec<Value> = choices.into_iter().collect();
        if let Some(first) = choices.first() {
            self.filter_values.insert(column.to_string(), first.clone());
        }
        self.filter_choices.insert(column.to_string(), choices);
        self.filter_columns.push(column.to_string());
        self.refilter();
    }

    pub fn remove_filter_column(&mut self, column: &str) {
        self.filter_columns.retain(|c| c != column);
        self.filter_values.remove(column);
        self.filter_choices.remove(column);
        self.refilter();
    }

    pub fn set_filter_value(&mut self, column: &str, value: Value) {
        self.filter_values.insert(column.to_string(), value);
        self.refilter();
    }

    /// Recompute `visible_rows` after a filter change.
    pub fn refilter(&mut self) {
        let datasets = Arc::clone(&self.datasets);
        let criteria = self.criteria();
        if let Some(view) = self.record(filter::apply(&datasets.clients, &criteria)) {
            self.visible_rows = view.indices().to_vec();
        }
    }
}
