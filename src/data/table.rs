use std::collections::HashMap;

use crate::error::{DashboardError, Result};

use super::value::Value;

// ---------------------------------------------------------------------------
// Row – one client
// ---------------------------------------------------------------------------

/// A single row of a table, keyed by the client identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: i64,
    /// One value per attribute column, in column order.
    pub values: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Table – a loaded dataset indexed by client id
// ---------------------------------------------------------------------------

/// A read-only table whose identifier column acts as the index
/// (it is not part of `columns`).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    id_column: String,
    columns: Vec<String>,
    rows: Vec<Row>,
    index: HashMap<i64, usize>,
}

impl Table {
    /// Build a table, checking row widths and identifier uniqueness.
    pub fn new(id_column: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let id_column = id_column.into();
        let mut index = HashMap::with_capacity(rows.len());

        for (pos, row) in rows.iter().enumerate() {
            if row.values.len() != columns.len() {
                return Err(DashboardError::schema(format!(
                    "row {} has {} values, expected {}",
                    row.id,
                    row.values.len(),
                    columns.len()
                )));
            }
            if index.insert(row.id, pos).is_some() {
                return Err(DashboardError::schema(format!(
                    "duplicate {id_column} value {}",
                    row.id
                )));
            }
        }

        Ok(Table {
            id_column,
            columns,
            rows,
            index,
        })
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Ordered attribute column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Client identifiers in file order.
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().map(|r| r.id)
    }

    /// Position of a column, or a schema error naming it.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DashboardError::schema(format!("no column named '{column}'")))
    }

    pub fn position(&self, id: i64) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn row(&self, id: i64) -> Result<&Row> {
        self.position(id)
            .map(|pos| &self.rows[pos])
            .ok_or(DashboardError::NotFound(id))
    }

    /// Copy of the rows at `positions`, keeping columns and id column.
    pub(crate) fn subset(&self, positions: &[usize]) -> Table {
        let rows: Vec<Row> = positions.iter().map(|&p| self.rows[p].clone()).collect();
        let index = rows.iter().enumerate().map(|(pos, r)| (r.id, pos)).collect();
        Table {
            id_column: self.id_column.clone(),
            columns: self.columns.clone(),
            rows,
            index,
        }
    }

    /// Cell lookup by client id and column name.
    pub fn value(&self, id: i64, column: &str) -> Result<&Value> {
        let col = self.column_index(column)?;
        Ok(&self.row(id)?.values[col])
    }

    /// All cells of one column, in row order.
    pub fn column_values(&self, column: &str) -> Result<Vec<&Value>> {
        let col = self.column_index(column)?;
        Ok(self.rows.iter().map(|r| &r.values[col]).collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Three clients used across the crate's unit tests.
    pub(crate) fn sample_clients() -> Table {
        let columns = vec![
            "CODE_GENDER".to_string(),
            "AMT_INCOME_TOTAL".to_string(),
            "CNT_CHILDREN".to_string(),
        ];
        let rows = vec![
            Row { id: 100, values: vec!["F".into(), 20000.0.into(), 0.into()] },
            Row { id: 200, values: vec!["M".into(), 50000.0.into(), 2.into()] },
            Row { id: 300, values: vec!["F".into(), 80000.0.into(), 1.into()] },
        ];
        Table::new("SK_ID_CURR", columns, rows).unwrap()
    }

    #[test]
    fn lookup_by_id_and_column() {
        let t = sample_clients();
        assert_eq!(t.len(), 3);
        assert_eq!(t.value(200, "CNT_CHILDREN").unwrap(), &Value::Integer(2));
        assert_eq!(t.ids().collect::<Vec<_>>(), vec![100, 200, 300]);
    }

    #[test]
    fn unknown_id_and_column_are_reported() {
        let t = sample_clients();
        assert!(matches!(t.row(999), Err(DashboardError::NotFound(999))));
        assert!(matches!(t.column_index("nope"), Err(DashboardError::Schema(_))));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let rows = vec![
            Row { id: 1, values: vec![Value::Null] },
            Row { id: 1, values: vec![Value::Null] },
        ];
        let err = Table::new("SK_ID_CURR", vec!["a".into()], rows).unwrap_err();
        assert!(matches!(err, DashboardError::Schema(_)));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![Row { id: 1, values: vec![] }];
        assert!(Table::new("SK_ID_CURR", vec!["a".into()], rows).is_err());
    }
}
