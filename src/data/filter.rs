use std::collections::BTreeSet;

use crate::error::{DashboardError, Result};

use super::table::{Row, Table};
use super::value::Value;

// ---------------------------------------------------------------------------
// Filter criteria: column == value, combined with AND
// ---------------------------------------------------------------------------

/// Keep only rows whose `column` cell equals `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriterion {
    pub column: String,
    pub value: Value,
}

impl FilterCriterion {
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterCriterion {
            column: column.into(),
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TableView – the rows of a table that passed the filters
// ---------------------------------------------------------------------------

/// A borrowed subset of a table's rows, in table order.
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> TableView<'a> {
    /// Positions of the visible rows within the source table.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.rows()[i])
    }

    pub fn ids(&self) -> Vec<i64> {
        self.rows().map(|r| r.id).collect()
    }

    /// Materialise the view as an owned table.
    pub fn to_table(&self) -> Table {
        self.table.subset(&self.indices)
    }
}

/// Apply `criteria` in order, each narrowing the rows left by the previous
/// one. An empty list keeps every row.
///
/// Missing cells never match, like Pandas `==` on NaN. A NaN or null
/// criterion value is therefore an invalid-argument error, and an unknown
/// column is a schema error.
pub fn apply<'a>(table: &'a Table, criteria: &[FilterCriterion]) -> Result<TableView<'a>> {
    let mut indices: Vec<usize> = (0..table.len()).collect();

    for criterion in criteria {
        let col = table.column_index(&criterion.column)?;
        if is_missing(&criterion.value) {
            return Err(DashboardError::invalid(format!(
                "filter value for '{}' is missing",
                criterion.column
            )));
        }
        indices.retain(|&i| {
            let cell = &table.rows()[i].values[col];
            !is_missing(cell) && *cell == criterion.value
        });
    }

    Ok(TableView { table, indices })
}

fn is_missing(value: &Value) -> bool {
    matches!(value, Value::Null) || matches!(value, Value::Float(f) if f.is_nan())
}

/// Sorted distinct values of a column, for populating value pickers.
/// Missing cells are left out since no filter can select them.
pub fn unique_values(table: &Table, column: &str) -> Result<BTreeSet<Value>> {
    Ok(table
        .column_values(column)?
        .into_iter()
        .filter(|v| !is_missing(v))
        .cloned()
        .collect())
}
