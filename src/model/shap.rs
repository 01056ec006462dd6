//! Exact TreeSHAP (Lundberg et al., "Consistent individualized feature
//! attribution for tree ensembles", algorithm 2) over [`GbdtModel`] trees,
//! using node training counts as cover.

use crate::error::{DashboardError, Result};

use super::gbdt::{GbdtModel, Node};
use super::Attribution;

/// One feature on the path from the root to the current node.
#[derive(Debug, Clone, Copy)]
struct PathElement {
    /// `None` for the root placeholder.
    feature: Option<usize>,
    /// Fraction of cover flowing this way when the feature is unknown.
    zero_fraction: f64,
    /// 1.0 if `x` flows this way, else 0.0.
    one_fraction: f64,
    /// Permutation weight.
    weight: f64,
}

/// Attribute the raw output of `model` at `features` to each feature.
pub fn tree_shap(model: &GbdtModel, features: &[f64]) -> Result<Attribution> {
    model.check_len(features)?;

    let mut values = vec![0.0; features.len()];
    let mut base_value = 0.0;
    for tree in model.trees() {
        base_value += expected_value(tree)?;
        recurse(tree, features, &[], 1.0, 1.0, None, &mut values);
    }

    let scale = model.output_scale();
    Ok(Attribution {
        base_value: base_value * scale,
        values: values.into_iter().map(|v| v * scale).collect(),
    })
}

/// Cover-weighted mean leaf value of one tree.
fn expected_value(node: &Node) -> Result<f64> {
    match node {
        Node::Leaf { value, .. } => Ok(*value),
        Node::Split {
            count, left, right, ..
        } => {
            if *count <= 0.0 {
                return Err(DashboardError::Deserialization(
                    "model has no node counts; attributions are unavailable".to_string(),
                ));
            }
            Ok((left.count() * expected_value(left)? + right.count() * expected_value(right)?)
                / count)
        }
    }
}

fn recurse(
    node: &Node,
    x: &[f64],
    parent_path: &[PathElement],
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
    phi: &mut [f64],
) {
    let mut path = parent_path.to_vec();
    extend(&mut path, zero_fraction, one_fraction, feature);

    match node {
        Node::Leaf { value, .. } => {
            for i in 1..path.len() {
                let w = unwound_sum(&path, i);
                let el = path[i];
                if let Some(f) = el.feature {
                    phi[f] += w * (el.one_fraction - el.zero_fraction) * value;
                }
            }
        }
        Node::Split {
            feature: split,
            rule,
            default_left,
            missing,
            count,
            left,
            right,
        } => {
            let (hot, cold) = if Node::goes_left(rule, *default_left, *missing, x[*split]) {
                (left.as_ref(), right.as_ref())
            } else {
                (right.as_ref(), left.as_ref())
            };
            let hot_zero = hot.count() / count;
            let cold_zero = cold.count() / count;

            // A feature split on twice is undone before being re-added.
            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;
            if let Some(k) = path.iter().position(|el| el.feature == Some(*split)) {
                incoming_zero = path[k].zero_fraction;
                incoming_one = path[k].one_fraction;
                unwind(&mut path, k);
            }

            recurse(hot, x, &path, hot_zero * incoming_zero, incoming_one, Some(*split), phi);
            recurse(cold, x, &path, cold_zero * incoming_zero, 0.0, Some(*split), phi);
        }
    }
}

fn extend(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });
    let d = depth as f64;
    for i in (0..depth).rev() {
        let fi = i as f64;
        path[i + 1].weight += one_fraction * path[i].weight * (fi + 1.0) / (d + 1.0);
        path[i].weight = zero_fraction * path[i].weight * (d - fi) / (d + 1.0);
    }
}

/// Remove element `index` from the path, undoing its effect on the weights.
fn unwind(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let d = depth as f64;
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let mut next_one_portion = path[depth].weight;

    for i in (0..depth).rev() {
        let fi = i as f64;
        if one != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next_one_portion * (d + 1.0) / ((fi + 1.0) * one);
            next_one_portion = tmp - path[i].weight * zero * (d - fi) / (d + 1.0);
        } else {
            path[i].weight = path[i].weight * (d + 1.0) / (zero * (d - fi));
        }
    }

    // Weights stay positional; only the feature data shifts down.
    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

/// Total permutation weight of the path if element `index` were unwound.
fn unwound_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let d = depth as f64;
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let mut next_one_portion = path[depth].weight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        let fi = i as f64;
        if one != 0.0 {
            let tmp = next_one_portion * (d + 1.0) / ((fi + 1.0) * one);
            total += tmp;
            next_one_portion = path[i].weight - tmp * zero * (d - fi) / (d + 1.0);
        } else {
            total += path[i].weight / zero / ((d - fi) / (d + 1.0));
        }
    }
    total
}
