use serde::Deserialize;

use crate::error::{DashboardError, Result};

use super::{shap, Attribution, Classifier};

/// LightGBM treats magnitudes below this as zero for `missing_type: Zero`.
const ZERO_THRESHOLD: f64 = 1e-35;

// ---------------------------------------------------------------------------
// On-disk layout: LightGBM `Booster.dump_model()` JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DumpedModel {
    num_class: usize,
    #[serde(default = "one")]
    num_tree_per_iteration: usize,
    max_feature_idx: usize,
    objective: String,
    #[serde(default)]
    average_output: bool,
    #[serde(default)]
    feature_names: Vec<String>,
    tree_info: Vec<DumpedTree>,
}

fn one() -> usize {
    1
}

#[derive(Debug, Deserialize)]
struct DumpedTree {
    tree_structure: DumpedNode,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpedNode {
    Split(DumpedSplit),
    Leaf(DumpedLeaf),
}

#[derive(Debug, Deserialize)]
struct DumpedSplit {
    split_feature: usize,
    threshold: DumpedThreshold,
    decision_type: String,
    #[serde(default)]
    default_left: bool,
    #[serde(default)]
    missing_type: MissingType,
    #[serde(default)]
    internal_count: f64,
    left_child: Box<DumpedNode>,
    right_child: Box<DumpedNode>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpedThreshold {
    Numeric(f64),
    Categories(String),
}

#[derive(Debug, Deserialize)]
struct DumpedLeaf {
    leaf_value: f64,
    #[serde(default)]
    leaf_count: f64,
}

// ---------------------------------------------------------------------------
// In-memory trees
// ---------------------------------------------------------------------------

/// How a split treats missing values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum MissingType {
    /// NaN is read as 0.0.
    #[default]
    None,
    /// Zero (and NaN) take the default branch.
    Zero,
    /// NaN takes the default branch.
    NaN,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SplitRule {
    /// `x <= threshold` goes left.
    Numeric(f64),
    /// `x` in the category list goes left.
    Categorical(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Split {
        feature: usize,
        rule: SplitRule,
        default_left: bool,
        missing: MissingType,
        /// Training rows that reached this node.
        count: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        value: f64,
        count: f64,
    },
}

impl Node {
    /// Number of training rows behind this node (the TreeSHAP cover).
    pub fn count(&self) -> f64 {
        match self {
            Node::Split { count, .. } | Node::Leaf { count, .. } => *count,
        }
    }

    /// Whether `x` follows the left branch of this split.
    pub fn goes_left(
        rule: &SplitRule,
        default_left: bool,
        missing: MissingType,
        value: f64,
    ) -> bool {
        match rule {
            SplitRule::Numeric(threshold) => {
                let nan = value.is_nan();
                if (missing == MissingType::Zero && (nan || value.abs() <= ZERO_THRESHOLD))
                    || (missing == MissingType::NaN && nan)
                {
                    return default_left;
                }
                let value = if nan { 0.0 } else { value };
                value <= *threshold
            }
            SplitRule::Categorical(categories) => {
                if value.is_nan() && missing == MissingType::NaN {
                    return false;
                }
                let value = if value.is_nan() { 0.0 } else { value };
                if value < 0.0 {
                    return false;
                }
                categories.contains(&(value as i64))
            }
        }
    }

    fn leaf_value(&self, x: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    rule,
                    default_left,
                    missing,
                    left,
                    right,
                    ..
                } => {
                    node = if Self::goes_left(rule, *default_left, *missing, x[*feature]) {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GbdtModel – binary gradient-boosted trees
// ---------------------------------------------------------------------------

/// A binary LightGBM ensemble: raw score is the sum of leaf values, the
/// probability of default is `sigmoid(k * raw)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GbdtModel {
    trees: Vec<Node>,
    num_features: usize,
    sigmoid: f64,
    average_output: bool,
    feature_names: Vec<String>,
}

impl GbdtModel {
    /// Parse a LightGBM JSON dump of a binary model.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let dumped: DumpedModel = serde_json::from_slice(bytes)
            .map_err(|e| DashboardError::Deserialization(e.to_string()))?;

        if dumped.num_class != 1 || dumped.num_tree_per_iteration != 1 {
            return Err(DashboardError::Deserialization(format!(
                "expected a binary model, got num_class={}",
                dumped.num_class
            )));
        }
        let sigmoid = parse_objective(&dumped.objective)?;
        let num_features = dumped.max_feature_idx + 1;

        let trees = dumped
            .tree_info
            .into_iter()
            .map(|t| convert(t.tree_structure, num_features))
            .collect::<Result<Vec<_>>>()?;

        Ok(GbdtModel {
            trees,
            num_features,
            sigmoid,
            average_output: dumped.average_output,
            feature_names: dumped.feature_names,
        })
    }

    pub fn trees(&self) -> &[Node] {
        &self.trees
    }

    /// Scale applied to the summed tree outputs (random-forest mode averages).
    pub(crate) fn output_scale(&self) -> f64 {
        if self.average_output && !self.trees.is_empty() {
            1.0 / self.trees.len() as f64
        } else {
            1.0
        }
    }

    pub(crate) fn check_len(&self, features: &[f64]) -> Result<()> {
        if features.len() != self.num_features {
            return Err(DashboardError::invalid(format!(
                "model expects {} features, got {}",
                self.num_features,
                features.len()
            )));
        }
        Ok(())
    }

    /// Log-odds output for one feature vector.
    pub fn raw_score(&self, features: &[f64]) -> Result<f64> {
        self.check_len(features)?;
        let sum: f64 = self.trees.iter().map(|t| t.leaf_value(features)).sum();
        Ok(sum * self.output_scale())
    }

    /// Map a raw score to the probability of the positive class.
    pub fn probability(&self, raw: f64) -> f64 {
        1.0 / (1.0 + (-self.sigmoid * raw).exp())
    }
}

impl Classifier for GbdtModel {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        let p = self.probability(self.raw_score(features)?);
        Ok([1.0 - p, p])
    }

    fn explain(&self, features: &[f64]) -> Option<Result<Attribution>> {
        Some(shap::tree_shap(self, features))
    }
}

/// `"binary sigmoid:1"` → 1.0
fn parse_objective(objective: &str) -> Result<f64> {
    let mut parts = objective.split_whitespace();
    if parts.next() != Some("binary") {
        return Err(DashboardError::Deserialization(format!(
            "unsupported objective '{objective}'"
        )));
    }
    for part in parts {
        if let Some(k) = part.strip_prefix("sigmoid:") {
            return k
                .parse::<f64>()
                .ok()
                .filter(|k| k.is_finite() && *k > 0.0)
                .ok_or_else(|| {
                    DashboardError::Deserialization(format!("bad sigmoid in '{objective}'"))
                });
        }
    }
    Ok(1.0)
}

fn convert(node: DumpedNode, num_features: usize) -> Result<Node> {
    match node {
        DumpedNode::Leaf(leaf) => Ok(Node::Leaf {
            value: leaf.leaf_value,
            count: leaf.leaf_count,
        }),
        DumpedNode::Split(split) => {
            if split.split_feature >= num_features {
                return Err(DashboardError::Deserialization(format!(
                    "split on feature {} but the model has {num_features}",
                    split.split_feature
                )));
            }
            let rule = match (split.decision_type.as_str(), split.threshold) {
                ("<=", DumpedThreshold::Numeric(t)) => SplitRule::Numeric(t),
                ("==", DumpedThreshold::Categories(list)) => {
                    SplitRule::Categorical(parse_categories(&list)?)
                }
                ("==", DumpedThreshold::Numeric(t)) if t.fract() == 0.0 => {
                    SplitRule::Categorical(vec![t as i64])
                }
                (other, _) => {
                    return Err(DashboardError::Deserialization(format!(
                        "unsupported decision_type '{other}'"
                    )))
                }
            };
            Ok(Node::Split {
                feature: split.split_feature,
                rule,
                default_left: split.default_left,
                missing: split.missing_type,
                count: split.internal_count,
                left: Box::new(convert(*split.left_child, num_features)?),
                right: Box::new(convert(*split.right_child, num_features)?),
            })
        }
    }
}

fn parse_categories(list: &str) -> Result<Vec<i64>> {
    list.split("||")
        .map(|c| {
            c.trim().parse::<i64>().map_err(|_| {
                DashboardError::Deserialization(format!("bad category '{c}' in '{list}'"))
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two trees over three features; counts make TreeSHAP well defined.
    pub(crate) const TWO_TREES: &str = r#"{
        "name": "tree", "version": "v3", "num_class": 1, "num_tree_per_iteration": 1,
        "label_index": 0, "max_feature_idx": 2, "objective": "binary sigmoid:1",
        "average_output": false, "feature_names": ["income", "children", "ratio"],
        "tree_info": [
            {"tree_index": 0, "num_leaves": 3, "shrinkage": 1,
             "tree_structure": {
                "split_index": 0, "split_feature": 0, "threshold": 30000.0,
                "decision_type": "<=", "default_left": true, "missing_type": "NaN",
                "internal_value": 0, "internal_count": 100,
                "left_child": {"leaf_index": 0, "leaf_value": 0.8, "leaf_count": 40},
                "right_child": {
                    "split_index": 1, "split_feature": 1, "threshold": 1.5,
                    "decision_type": "<=", "default_left": false, "missing_type": "None",
                    "internal_count": 60,
                    "left_child": {"leaf_index": 1, "leaf_value": -0.5, "leaf_count": 45},
                    "right_child": {"leaf_index": 2, "leaf_value": 0.3, "leaf_count": 15}
                }
             }},
            {"tree_index": 1, "num_leaves": 2, "shrinkage": 0.1,
             "tree_structure": {
                "split_index": 0, "split_feature": 2, "threshold": "1||3",
                "decision_type": "==", "default_left": false, "missing_type": "NaN",
                "internal_count": 100,
                "left_child": {"leaf_index": 0, "leaf_value": 0.2, "leaf_count": 25},
                "right_child": {"leaf_index": 1, "leaf_value": -0.1, "leaf_count": 75}
             }}
        ]
    }"#;

    pub(crate) fn two_trees() -> GbdtModel {
        GbdtModel::from_json(TWO_TREES.as_bytes()).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn raw_score_follows_thresholds() {
        let m = two_trees();
        assert_eq!(m.num_features(), 3);
        assert!(close(m.raw_score(&[20000.0, 0.0, 3.0]).unwrap(), 0.8 + 0.2));
        assert!(close(m.raw_score(&[50000.0, 1.0, 2.0]).unwrap(), -0.5 - 0.1));
        assert!(close(m.raw_score(&[50000.0, 2.0, 1.0]).unwrap(), 0.3 + 0.2));
    }

    #[test]
    fn missing_values_take_configured_branches() {
        let m = two_trees();
        // NaN income takes default_left; NaN children (missing_type None) reads as 0.
        assert!(close(m.raw_score(&[f64::NAN, 5.0, f64::NAN]).unwrap(), 0.8 - 0.1));
        assert!(close(m.raw_score(&[40000.0, f64::NAN, 0.0]).unwrap(), -0.5 - 0.1));
    }

    #[test]
    fn probability_is_sigmoid_of_raw_score() {
        let m = two_trees();
        let x = [20000.0, 0.0, 3.0];
        let [p0, p1] = m.predict_proba(&x).unwrap();
        assert!(close(p1, 1.0 / (1.0 + (-1.0f64).exp())));
        assert!(close(p0 + p1, 1.0));
    }

    #[test]
    fn wrong_feature_count_is_rejected() {
        let m = two_trees();
        assert!(matches!(
            m.predict_proba(&[1.0, 2.0]),
            Err(DashboardError::InvalidArgument(_))
        ));
    }

    #[test]
    fn reloading_same_bytes_gives_same_model() {
        assert_eq!(two_trees(), two_trees());
    }

    #[test]
    fn single_leaf_tree_is_accepted() {
        let json = r#"{"num_class": 1, "max_feature_idx": 0, "objective": "binary sigmoid:2",
                       "tree_info": [{"tree_structure": {"leaf_value": 0.25}}]}"#;
        let m = GbdtModel::from_json(json.as_bytes()).unwrap();
        let [_, p] = m.predict_proba(&[123.0]).unwrap();
        assert!(close(p, 1.0 / (1.0 + (-0.5f64).exp())));
    }

    #[test]
    fn corrupt_or_incompatible_models_fail_to_deserialize() {
        let cases = [
            "not json at all",
            r#"{"num_class": 3, "max_feature_idx": 0, "objective": "multiclass num_class:3", "tree_info": []}"#,
            r#"{"num_class": 1, "max_feature_idx": 0, "objective": "regression", "tree_info": []}"#,
            r#"{"num_class": 1, "max_feature_idx": 0, "objective": "binary sigmoid:1",
                "tree_info": [{"tree_structure": {"split_feature": 4, "threshold": 1.0,
                    "decision_type": "<=", "left_child": {"leaf_value": 0}, "right_child": {"leaf_value": 1}}}]}"#,
        ];
        for json in cases {
            assert!(
                matches!(GbdtModel::from_json(json.as_bytes()), Err(DashboardError::Deserialization(_))),
                "accepted: {json}"
            );
        }
    }
}
