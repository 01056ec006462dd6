//! Chart-ready data. Everything here is pure; the UI only draws the result.

use crate::data::{Table, Value};
use crate::error::{DashboardError, Result};
use crate::model::Attribution;

/// Features shown in the attribution summary.
pub const DEFAULT_MAX_DISPLAY: usize = 7;

// ---------------------------------------------------------------------------
// Indicator comparison
// ---------------------------------------------------------------------------

/// Selected client's value next to the mean of every other client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub client: f64,
    pub others_mean: f64,
}

impl Comparison {
    /// Bar heights in display order.
    pub fn bars(&self) -> [f64; 2] {
        [self.client, self.others_mean]
    }
}

/// Numeric cells of a column; strings are an error, nulls are `None`.
fn numeric_column(table: &Table, column: &str) -> Result<Vec<(i64, Option<f64>)>> {
    let col = table.column_index(column)?;
    table
        .rows()
        .iter()
        .map(|row| match &row.values[col] {
            Value::String(s) => Err(DashboardError::invalid(format!(
                "column '{column}' is not numeric (client {} has '{s}')",
                row.id
            ))),
            other => Ok((row.id, other.as_f64().filter(|v| !v.is_nan()))),
        })
        .collect()
}

/// Compare one client's `column` against the mean of the others, skipping
/// their missing values.
pub fn indicator_comparison(table: &Table, client_id: i64, column: &str) -> Result<Comparison> {
    let values = numeric_column(table, column)?;
    table.row(client_id)?;

    let client = values
        .iter()
        .find(|(id, _)| *id == client_id)
        .and_then(|(_, v)| *v)
        .ok_or_else(|| {
            DashboardError::invalid(format!("client {client_id} has no value for '{column}'"))
        })?;

    let others: Vec<f64> = values
        .iter()
        .filter(|(id, _)| *id != client_id)
        .filter_map(|(_, v)| *v)
        .collect();
    if others.is_empty() {
        return Err(DashboardError::invalid(format!(
            "no other client has a value for '{column}'"
        )));
    }

    Ok(Comparison {
        client,
        others_mean: others.iter().sum::<f64>() / others.len() as f64,
    })
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width bins over the finite values; the last bin is closed.
pub fn histogram(values: &[f64], bins: usize) -> Result<Vec<Bin>> {
    if bins == 0 {
        return Err(DashboardError::invalid("histogram needs at least one bin"));
    }
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Ok(Vec::new());
    }

    let min = finite.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max - min < f64::EPSILON {
        return Ok(vec![Bin {
            start: min - 0.5,
            end: min + 0.5,
            count: finite.len(),
        }]);
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: min + i as f64 * width,
            end: if i + 1 == bins { max } else { min + (i + 1) as f64 * width },
            count,
        })
        .collect())
}

/// All numeric values of a column, for [`histogram`].
pub fn column_values(table: &Table, column: &str) -> Result<Vec<f64>> {
    Ok(numeric_column(table, column)?
        .into_iter()
        .filter_map(|(_, v)| v)
        .collect())
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

/// `(x, y)` points for every client with both values present.
pub fn scatter(table: &Table, x: &str, y: &str) -> Result<Vec<[f64; 2]>> {
    let xs = numeric_column(table, x)?;
    let ys = numeric_column(table, y)?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|((_, x), (_, y))| Some([x?, y?]))
        .collect())
}

// ---------------------------------------------------------------------------
// Attribution summary
// ---------------------------------------------------------------------------

/// The `max_display` strongest attributions, largest magnitude first.
pub fn attribution_summary(
    names: &[String],
    attribution: &Attribution,
    max_display: usize,
) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = names
        .iter()
        .cloned()
        .zip(attribution.values.iter().copied())
        .collect();
    pairs.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    pairs.truncate(max_display);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::tests::sample_clients;
    use crate::data::Row;

    #[test]
    fn comparison_uses_mean_of_other_clients() {
        let t = sample_clients();
        let c = indicator_comparison(&t, 100, "AMT_INCOME_TOTAL").unwrap();
        assert_eq!(c.bars(), [20000.0, 65000.0]);

        let c = indicator_comparison(&t, 200, "CNT_CHILDREN").unwrap();
        assert_eq!(c.bars(), [2.0, 0.5]);
    }

    #[test]
    fn comparison_errors() {
        let t = sample_clients();
        assert!(matches!(
            indicator_comparison(&t, 999, "AMT_INCOME_TOTAL"),
            Err(DashboardError::NotFound(999))
        ));
        assert!(matches!(
            indicator_comparison(&t, 100, "missing"),
            Err(DashboardError::Schema(_))
        ));
        assert!(matches!(
            indicator_comparison(&t, 100, "CODE_GENDER"),
            Err(DashboardError::InvalidArgument(_))
        ));
    }

    #[test]
    fn comparison_skips_missing_values_of_others() {
        let rows = vec![
            Row { id: 1, values: vec![10.into()] },
            Row { id: 2, values: vec![Value::Null] },
            Row { id: 3, values: vec![30.into()] },
        ];
        let t = Table::new("SK_ID_CURR", vec!["v".into()], rows).unwrap();
        assert_eq!(indicator_comparison(&t, 1, "v").unwrap().others_mean, 30.0);
        assert!(indicator_comparison(&t, 2, "v").is_err());
    }

    #[test]
    fn histogram_counts_every_finite_value() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0, f64::NAN], 4).unwrap();
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![1, 1, 1, 2]);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[3].end, 4.0);
    }

    #[test]
    fn histogram_edge_cases() {
        assert!(histogram(&[1.0], 0).is_err());
        assert!(histogram(&[], 10).unwrap().is_empty());
        let single = histogram(&[5.0, 5.0], 10).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 2);
    }

    #[test]
    fn scatter_pairs_columns_by_row() {
        let t = sample_clients();
        let pts = scatter(&t, "CNT_CHILDREN", "AMT_INCOME_TOTAL").unwrap();
        assert_eq!(pts, vec![[0.0, 20000.0], [2.0, 50000.0], [1.0, 80000.0]]);
        assert!(scatter(&t, "CODE_GENDER", "AMT_INCOME_TOTAL").is_err());
    }

    #[test]
    fn summary_keeps_strongest_features() {
        let names: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let attribution = Attribution {
            base_value: 0.0,
            values: vec![0.1, -0.9, 0.5, 0.0],
        };
        let top = attribution_summary(&names, &attribution, 2);
        assert_eq!(top, vec![("b".to_string(), -0.9), ("c".to_string(), 0.5)]);
    }
}
