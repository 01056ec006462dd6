use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use crate::error::{DashboardError, Result};

use super::table::{Row, Table};
use super::value::Value;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a client table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one client per line (pandas `to_csv`)
/// * `.json`    – `[{ "SK_ID_CURR": 100, ... }, ...]`
/// * `.parquet` – flat scalar columns
///
/// `id_column` names the unique integer identifier; it becomes the table
/// index and is removed from the attribute columns.
pub fn load_table(path: &Path, id_column: &str) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path, id_column),
        "json" => load_json(path, id_column),
        "parquet" | "pq" => load_parquet(path, id_column),
        other => Err(DashboardError::io(
            path,
            format!("unsupported file extension: .{other}"),
        )),
    }?;

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Convert an identifier cell into the row key.
fn row_id(value: &Value, id_column: &str, row_no: usize) -> Result<i64> {
    value.as_i64().ok_or_else(|| {
        DashboardError::schema(format!(
            "row {row_no}: {id_column} value '{value}' is not an integer"
        ))
    })
}

fn missing_id(id_column: &str) -> DashboardError {
    DashboardError::schema(format!("missing identifier column '{id_column}'"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one client per line.
/// Cell types are guessed per cell (see [`Value::parse`]).
fn load_csv(path: &Path, id_column: &str) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| DashboardError::io(path, e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DashboardError::io(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let id_idx = headers
        .iter()
        .position(|h| h == id_column)
        .ok_or_else(|| missing_id(id_column))?;

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != id_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| DashboardError::schema(format!("CSV row {row_no}: {e}")))?;

        let id = row_id(&Value::parse(record.get(id_idx).unwrap_or("")), id_column, row_no)?;
        let values = record
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_idx)
            .map(|(_, cell)| Value::parse(cell))
            .collect();

        rows.push(Row { id, values });
    }

    Table::new(id_column, columns, rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "SK_ID_CURR": 100002, "CODE_GENDER": "M", "CNT_CHILDREN": 0 },
///   ...
/// ]
/// ```
///
/// Column order follows first appearance; keys absent from a record load
/// as null.
fn load_json(path: &Path, id_column: &str) -> Result<Table> {
    let text = std::fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| DashboardError::schema(format!("invalid JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| DashboardError::schema("expected a top-level JSON array"))?;

    let mut objects = Vec::with_capacity(records.len());
    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DashboardError::schema(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if key != id_column && !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let mut rows = Vec::with_capacity(objects.len());
    for (i, obj) in objects.into_iter().enumerate() {
        let id_value = obj.get(id_column).ok_or_else(|| missing_id(id_column))?;
        let id = row_id(&json_to_value(id_value), id_column, i)?;
        let values = columns
            .iter()
            .map(|col| obj.get(col).map(json_to_value).unwrap_or(Value::Null))
            .collect();
        rows.push(Row { id, values });
    }

    if rows.is_empty() {
        return Err(DashboardError::schema(format!(
            "JSON table has no records, so '{id_column}' and the other columns are unknown"
        )));
    }
    Table::new(id_column, columns, rows)
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), as long as the identifier is a regular
/// column (`index=False` or `reset_index()` first).
fn load_parquet(path: &Path, id_column: &str) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|e| DashboardError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DashboardError::io(path, e))?;
    let schema = builder.schema().clone();
    let reader = builder.build().map_err(|e| DashboardError::io(path, e))?;

    let id_idx = schema.index_of(id_column).map_err(|_| missing_id(id_column))?;
    let value_cols: Vec<(usize, String)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != id_idx)
        .map(|(i, f)| (i, f.name().clone()))
        .collect();

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| DashboardError::io(path, e))?;
        let id_col = batch.column(id_idx);

        for row in 0..batch.num_rows() {
            let row_no = rows.len();
            let id = row_id(&extract_value(id_col, row), id_column, row_no)?;
            let values = value_cols
                .iter()
                .map(|(col_idx, _)| extract_value(batch.column(*col_idx), row))
                .collect();
            rows.push(Row { id, values });
        }
    }

    let columns = value_cols.into_iter().map(|(_, name)| name).collect();
    Table::new(id_column, columns, rows)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        other => Value::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const CSV: &str = "SK_ID_CURR,CODE_GENDER,AMT_INCOME_TOTAL,CNT_CHILDREN\n\
                       100,F,20000.5,0\n\
                       200,M,50000.5,2\n\
                       300,F,,1\n";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_uses_id_column_as_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "clients.csv", CSV);
        let table = load_table(&path, "SK_ID_CURR").unwrap();

        assert_eq!(table.columns(), ["CODE_GENDER", "AMT_INCOME_TOTAL", "CNT_CHILDREN"]);
        assert_eq!(table.value(200, "CODE_GENDER").unwrap(), &Value::from("M"));
        assert_eq!(table.value(300, "AMT_INCOME_TOTAL").unwrap(), &Value::Null);
    }

    #[test]
    fn csv_without_id_column_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "clients.csv", "ID,CODE_GENDER\n1,F\n");
        let err = load_table(&path, "SK_ID_CURR").unwrap_err();
        assert!(matches!(err, DashboardError::Schema(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("absent.csv"), "SK_ID_CURR").unwrap_err();
        assert!(matches!(err, DashboardError::Io { .. }));
    }

    #[test]
    fn unsupported_extension_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "clients.xlsx", "");
        assert!(matches!(
            load_table(&path, "SK_ID_CURR"),
            Err(DashboardError::Io { .. })
        ));
    }

    #[test]
    fn json_records_match_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv = load_table(&write_file(&dir, "c.csv", CSV), "SK_ID_CURR").unwrap();
        let json = r#"[
            {"SK_ID_CURR": 100, "CODE_GENDER": "F", "AMT_INCOME_TOTAL": 20000.5, "CNT_CHILDREN": 0},
            {"SK_ID_CURR": 200, "CODE_GENDER": "M", "AMT_INCOME_TOTAL": 50000.5, "CNT_CHILDREN": 2},
            {"SK_ID_CURR": 300, "CODE_GENDER": "F", "AMT_INCOME_TOTAL": null, "CNT_CHILDREN": 1}
        ]"#;
        let from_json = load_table(&write_file(&dir, "c.json", json), "SK_ID_CURR").unwrap();
        assert_eq!(csv, from_json);
    }

    #[test]
    fn empty_json_array_is_reported_as_such() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&write_file(&dir, "c.json", "[]"), "SK_ID_CURR").unwrap_err();
        assert!(matches!(&err, DashboardError::Schema(m) if m.contains("no records")));
    }

    #[test]
    fn parquet_matches_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv = load_table(&write_file(&dir, "c.csv", CSV), "SK_ID_CURR").unwrap();
        let path = dir.path().join("clients.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("SK_ID_CURR", DataType::Int64, false),
            Field::new("CODE_GENDER", DataType::Utf8, false),
            Field::new("AMT_INCOME_TOTAL", DataType::Float64, true),
            Field::new("CNT_CHILDREN", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![100, 200, 300])),
                Arc::new(StringArray::from(vec!["F", "M", "F"])),
                Arc::new(Float64Array::from(vec![Some(20000.5), Some(50000.5), None])),
                Arc::new(Int64Array::from(vec![0, 2, 1])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let from_parquet = load_table(&path, "SK_ID_CURR").unwrap();
        assert_eq!(csv, from_parquet);
    }
}
