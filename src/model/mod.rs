/// Model layer: the classifier seam, the tree-ensemble implementation and
/// its loader.
///
/// ```text
///   model.json ──► store ──► GbdtModel ──► Arc<dyn Classifier>
///                               │
///                               └──► shap (per-feature attributions)
/// ```

pub mod gbdt;
pub mod shap;
pub mod store;

use std::fmt;

use crate::error::Result;

pub use gbdt::GbdtModel;
pub use store::ModelStore;

/// Per-feature contributions to one prediction, in raw (log-odds) units.
///
/// `base_value + values.iter().sum()` equals the raw model output.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    /// Expected raw output over the training data.
    pub base_value: f64,
    /// One contribution per input feature, in feature order.
    pub values: Vec<f64>,
}

/// A trained binary classifier over numeric feature vectors.
pub trait Classifier: fmt::Debug + Send + Sync {
    /// Length of the feature vector the model expects.
    fn num_features(&self) -> usize;

    /// Training column names in input order, empty when the artifact has none.
    fn feature_names(&self) -> &[String] {
        &[]
    }

    /// Class probabilities `[P(no default), P(default)]`.
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]>;

    /// Per-feature attributions, when the model supports them.
    fn explain(&self, _features: &[f64]) -> Option<Result<Attribution>> {
        None
    }
}
