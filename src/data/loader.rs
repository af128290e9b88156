use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Reading, SpectralRow};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported payload shape: {0}")]
    Shape(String),

    #[error("payload contains no data rows")]
    Empty,

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the first row of a spectral table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – same payload shapes as the HTTP endpoints
/// * `.csv`     – header row of wavelength labels, first record is the reading
/// * `.parquet` – one column per wavelength, first row is the reading
pub fn load_file(path: &Path) -> Result<SpectralRow, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

/// Decode the first row of a JSON table payload.
///
/// Accepted shapes (the usual `DataFrame` JSON orientations):
///
/// ```json
/// [{ "410": 1.2, "435": 1.4 }, ...]        // records
/// { "410": [1.2, ...], "435": [1.4, ...] } // columns
/// { "410": 1.2, "435": 1.4 }               // single row
/// ```
///
/// Cells are coerced permissively: numbers, numeric strings and booleans
/// become readings, anything else becomes a missing reading. For records
/// the columns are the union of keys over all records and the values come
/// from the first record.
pub fn decode_json_row(value: &JsonValue) -> Result<SpectralRow, LoadError> {
    match value {
        JsonValue::Array(records) => {
            let objects = records
                .iter()
                .map(|rec| {
                    rec.as_object()
                        .ok_or_else(|| LoadError::Shape("expected an array of objects".into()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let first = objects.first().ok_or(LoadError::Empty)?;

            // Columns are the union of keys over all records, in order of
            // first appearance; keys absent from the first record are missing.
            let mut row = SpectralRow::new();
            for obj in &objects {
                for key in obj.keys() {
                    if !row.contains(key) {
                        row.insert(key.as_str(), first.get(key).and_then(coerce_json));
                    }
                }
            }
            Ok(row)
        }
        JsonValue::Object(map) if map.is_empty() => Err(LoadError::Empty),
        JsonValue::Object(map) if map.values().all(JsonValue::is_array) => {
            let first_cells: Vec<(&str, Option<&JsonValue>)> = map
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_array().and_then(|a| a.first())))
                .collect();
            if first_cells.iter().all(|(_, cell)| cell.is_none()) {
                return Err(LoadError::Empty);
            }
            Ok(first_cells
                .into_iter()
                .map(|(k, cell)| (k, cell.and_then(coerce_json)))
                .collect())
        }
        JsonValue::Object(map) => Ok(map.iter().map(|(k, v)| (k.as_str(), coerce_json(v))).collect()),
        other => Err(LoadError::Shape(format!(
            "expected a JSON array or object, got {}",
            json_kind(other)
        ))),
    }
}

/// Permissive numeric coercion of a single JSON cell. Booleans count as
/// `1.0` / `0.0`.
pub fn coerce_json(val: &JsonValue) -> Reading {
    match val {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        JsonValue::String(s) => coerce_str(s),
        _ => None,
    }
}

/// Permissive numeric coercion of a text cell. NaN counts as missing.
pub fn coerce_str(s: &str) -> Reading {
    s.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn json_kind(val: &JsonValue) -> &'static str {
    match val {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<SpectralRow, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;
    decode_json_row(&root)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with the wavelength labels, then one record per
/// reading.  Only the first record is used.
fn load_csv(path: &Path) -> Result<SpectralRow, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let record = reader.records().next().ok_or(LoadError::Empty)??;

    Ok(headers
        .iter()
        .enumerate()
        .map(|(i, label)| (label, record.get(i).and_then(coerce_str)))
        .collect())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load the first row of a Parquet file with one column per wavelength.
///
/// Float, integer and string columns are coerced; nulls and any other
/// column type become missing readings.
fn load_parquet(path: &Path) -> Result<SpectralRow, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    for batch_result in reader {
        let batch = batch_result?;
        if batch.num_rows() == 0 {
            continue;
        }
        let schema = batch.schema();
        return Ok(schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name().as_str(), extract_reading(batch.column(i), 0)))
            .collect());
    }

    Err(LoadError::Empty)
}

// -- Arrow helpers --

/// Extract a single reading from an Arrow column at a given row.
fn extract_reading(col: &Arc<dyn Array>, row: usize) -> Reading {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .and_then(|a| coerce_str(a.value(row))),
        DataType::LargeUtf8 => coerce_str(col.as_string::<i64>().value(row)),
        _ => None,
    };
    value.filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_records_payload_takes_first_row() {
        let payload = json!([
            {"410": 1.5, "435": "2.5", "460": "n/a"},
            {"410": 9.0, "435": 9.0, "460": 9.0}
        ]);
        let row = decode_json_row(&payload).unwrap();

        let labels: Vec<&str> = row.labels().collect();
        assert_eq!(labels, vec!["410", "435", "460"]);
        assert_eq!(row.get("410"), Some(Some(1.5)));
        assert_eq!(row.get("435"), Some(Some(2.5)));
        assert_eq!(row.get("460"), Some(None));
    }

    #[test]
    fn test_records_payload_uses_key_union() {
        let payload = json!([
            {"400": 1.0},
            {"400": 2.0, "500": 3.0}
        ]);
        let row = decode_json_row(&payload).unwrap();

        let labels: Vec<&str> = row.labels().collect();
        assert_eq!(labels, vec!["400", "500"]);
        assert_eq!(row.get("400"), Some(Some(1.0)));
        assert_eq!(row.get("500"), Some(None));
    }

    #[test]
    fn test_column_payload() {
        let payload = json!({"410": [1.0, 2.0], "435": [], "460": [null]});
        let row = decode_json_row(&payload).unwrap();
        assert_eq!(row.get("410"), Some(Some(1.0)));
        assert_eq!(row.get("435"), Some(None));
        assert_eq!(row.get("460"), Some(None));
    }

    #[test]
    fn test_flat_object_payload() {
        let payload = json!({"500": 3, "400": true, "600": false, "700": null});
        let row = decode_json_row(&payload).unwrap();
        // preserve_order keeps the payload order rather than sorting keys
        let labels: Vec<&str> = row.labels().collect();
        assert_eq!(labels, vec!["500", "400", "600", "700"]);
        assert_eq!(row.get("500"), Some(Some(3.0)));
        assert_eq!(row.get("400"), Some(Some(1.0)));
        assert_eq!(row.get("600"), Some(Some(0.0)));
        assert_eq!(row.get("700"), Some(None));
    }

    #[test]
    fn test_empty_and_invalid_payloads() {
        assert!(matches!(decode_json_row(&json!([])), Err(LoadError::Empty)));
        assert!(matches!(decode_json_row(&json!({})), Err(LoadError::Empty)));
        assert!(matches!(
            decode_json_row(&json!({"410": []})),
            Err(LoadError::Empty)
        ));
        assert!(matches!(decode_json_row(&json!(42)), Err(LoadError::Shape(_))));
        assert!(matches!(decode_json_row(&json!([1, 2])), Err(LoadError::Shape(_))));
    }

    #[test]
    fn test_coerce_str() {
        assert_eq!(coerce_str(" 1.25 "), Some(1.25));
        assert_eq!(coerce_str("1e3"), Some(1000.0));
        assert_eq!(coerce_str(""), None);
        assert_eq!(coerce_str("NaN"), None);
        assert_eq!(coerce_str("abc"), None);
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "400,500,600").unwrap();
        writeln!(file, "1.0,,x").unwrap();
        writeln!(file, "7.0,7.0,7.0").unwrap();
        file.flush().unwrap();

        let row = load_file(file.path()).unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row.get("400"), Some(Some(1.0)));
        assert_eq!(row.get("500"), Some(None));
        assert_eq!(row.get("600"), Some(None));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"400": 2.0, "500": 4.0}}]"#).unwrap();
        file.flush().unwrap();

        let row = load_file(file.path()).unwrap();
        assert_eq!(row.get("500"), Some(Some(4.0)));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("readings.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "xlsx"));
    }
}
