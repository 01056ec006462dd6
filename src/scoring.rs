use crate::data::{Table, Value};
use crate::error::{DashboardError, Result};
use crate::model::{Attribution, Classifier};

/// The numeric feature vector of one client: every feature-sample column
/// except the trailing one. Nulls become NaN (missing), booleans 0/1.
pub fn feature_vector(features: &Table, client_id: i64) -> Result<Vec<f64>> {
    let row = features.row(client_id)?;
    let n = row.values.len().saturating_sub(1);

    row.values[..n]
        .iter()
        .zip(features.columns())
        .map(|(value, column)| match value {
            Value::Null => Ok(f64::NAN),
            Value::String(s) => Err(DashboardError::invalid(format!(
                "feature '{column}' of client {client_id} is not numeric: '{s}'"
            ))),
            other => other.as_f64().ok_or_else(|| {
                DashboardError::invalid(format!("feature '{column}' is not numeric"))
            }),
        })
        .collect()
}

/// Names of the scored columns, aligned with [`feature_vector`].
pub fn feature_names(features: &Table) -> &[String] {
    let columns = features.columns();
    &columns[..columns.len().saturating_sub(1)]
}

/// Fail unless the model consumes exactly the scored feature columns, in
/// the same order when the model records their names.
pub fn check_model_fits(model: &dyn Classifier, features: &Table) -> Result<()> {
    let columns = feature_names(features);
    if model.num_features() != columns.len() {
        return Err(DashboardError::schema(format!(
            "model expects {} features but the feature sample has {}",
            model.num_features(),
            columns.len()
        )));
    }
    let trained = model.feature_names();
    if !trained.is_empty() && trained != columns {
        return Err(DashboardError::schema(format!(
            "feature sample columns {columns:?} do not match the model's {trained:?}"
        )));
    }
    Ok(())
}

/// Scores clients with a shared, immutable classifier.
#[derive(Clone, Copy)]
pub struct ScoringService<'m> {
    model: &'m dyn Classifier,
}

impl<'m> ScoringService<'m> {
    pub fn new(model: &'m dyn Classifier) -> Self {
        ScoringService { model }
    }

    /// Probability that `client_id` defaults, in [0, 1].
    pub fn score(&self, features: &Table, client_id: i64) -> Result<f64> {
        let x = feature_vector(features, client_id)?;
        let [_, default] = self.model.predict_proba(&x)?;
        if !(0.0..=1.0).contains(&default) {
            return Err(DashboardError::invalid(format!(
                "model returned probability {default} for client {client_id}"
            )));
        }
        Ok(default)
    }

    /// Per-feature attributions of the client's score, if the model has them.
    pub fn explain(&self, features: &Table, client_id: i64) -> Option<Result<Attribution>> {
        match feature_vector(features, client_id) {
            Ok(x) => self.model.explain(&x),
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::Row;

    /// Always predicts the same default probability.
    #[derive(Debug)]
    pub(crate) struct ConstantModel(pub f64);

    impl Classifier for ConstantModel {
        fn num_features(&self) -> usize {
            2
        }

        fn predict_proba(&self, _features: &[f64]) -> Result<[f64; 2]> {
            Ok([1.0 - self.0, self.0])
        }
    }

    /// Echoes the first feature as the probability, to check row selection.
    #[derive(Debug)]
    struct FirstFeature;

    impl Classifier for FirstFeature {
        fn num_features(&self) -> usize {
            2
        }

        fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
            assert_eq!(features.len(), 2, "trailing column must be dropped");
            Ok([1.0 - features[0], features[0]])
        }
    }

    pub(crate) fn sample_features() -> Table {
        let columns = vec!["f0".to_string(), "f1".to_string(), "TARGET".to_string()];
        let rows = vec![
            Row { id: 100, values: vec![0.25.into(), 3.into(), Value::Null] },
            Row { id: 200, values: vec![0.75.into(), Value::Null, Value::Null] },
            Row { id: 300, values: vec![0.5.into(), "oops".into(), Value::Null] },
        ];
        Table::new("SK_ID_CURR", columns, rows).unwrap()
    }

    #[test]
    fn feature_vector_drops_trailing_column() {
        let t = sample_features();
        assert_eq!(feature_vector(&t, 100).unwrap(), vec![0.25, 3.0]);
        assert!(feature_vector(&t, 200).unwrap()[1].is_nan());
        assert_eq!(feature_names(&t), ["f0", "f1"]);
    }

    #[test]
    fn score_returns_positive_class_for_selected_row() {
        let t = sample_features();
        let model = FirstFeature;
        let svc = ScoringService::new(&model);
        assert_eq!(svc.score(&t, 100).unwrap(), 0.25);
        assert_eq!(svc.score(&t, 200).unwrap(), 0.75);
    }

    #[test]
    fn score_is_deterministic() {
        let t = sample_features();
        let model = crate::model::gbdt::GbdtModel::from_json(
            br#"{"num_class": 1, "max_feature_idx": 1, "objective": "binary sigmoid:1",
                 "tree_info": [{"tree_structure": {"split_feature": 1, "threshold": 2.0,
                   "decision_type": "<=", "internal_count": 10,
                   "left_child": {"leaf_value": -0.3, "leaf_count": 4},
                   "right_child": {"leaf_value": 0.6, "leaf_count": 6}}}]}"#,
        )
        .unwrap();
        let svc = ScoringService::new(&model);
        assert_eq!(svc.score(&t, 100).unwrap(), svc.score(&t, 100).unwrap());
        assert!(svc.explain(&t, 100).unwrap().is_ok());
    }

    #[test]
    fn model_width_must_match_feature_sample() {
        let t = sample_features();
        assert!(check_model_fits(&ConstantModel(0.5), &t).is_ok());
        let three = crate::model::gbdt::tests::two_trees();
        assert!(matches!(check_model_fits(&three, &t), Err(DashboardError::Schema(_))));
    }

    #[test]
    fn model_columns_must_match_in_order() {
        let t = sample_features();
        let model = |names: &str| {
            let json = format!(
                r#"{{"num_class": 1, "max_feature_idx": 1, "objective": "binary sigmoid:1",
                    "feature_names": {names},
                    "tree_info": [{{"tree_structure": {{"leaf_value": 0.0, "leaf_count": 1}}}}]}}"#
            );
            crate::model::gbdt::GbdtModel::from_json(json.as_bytes()).unwrap()
        };

        assert!(check_model_fits(&model(r#"["f0", "f1"]"#), &t).is_ok());
        assert!(check_model_fits(&model("[]"), &t).is_ok());
        let swapped = check_model_fits(&model(r#"["f1", "f0"]"#), &t);
        assert!(matches!(swapped, Err(DashboardError::Schema(_))));
    }

    #[test]
    fn unknown_client_is_not_found() {
        let t = sample_features();
        let model = ConstantModel(0.8);
        let err = ScoringService::new(&model).score(&t, 999).unwrap_err();
        assert!(matches!(err, DashboardError::NotFound(999)));
    }

    #[test]
    fn string_feature_is_rejected() {
        let t = sample_features();
        let model = ConstantModel(0.8);
        let err = ScoringService::new(&model).score(&t, 300).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidArgument(_)));
    }

    #[test]
    fn models_without_attributions_explain_nothing() {
        let t = sample_features();
        let model = ConstantModel(0.8);
        assert!(ScoringService::new(&model).explain(&t, 100).is_none());
    }
}
