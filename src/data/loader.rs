use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::record_batch::RecordBatch;
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, Indicator, Record, COL_CONTINENT, COL_COUNTRY, COL_RANK, REQUIRED_COLUMNS};

/// Fatal dataset problems; the dashboard cannot render without a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("required column '{0}' is missing")]
    MissingColumn(String),
    #[error("row {row}, column '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },
    #[error("dataset contains no rows")]
    NoRecords,
    #[error(transparent)]
    Parse(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the happiness dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; extra columns are ignored
/// * `.json`    – `[{ "Country or region": "Finland", "Score": 7.769, ... }, ...]`
/// * `.parquet` – one column per required field
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    validate(records)
}

/// Reject empty tables and any value that must not reach a chart.
fn validate(records: Vec<Record>) -> Result<Dataset, LoadError> {
    if records.is_empty() {
        return Err(LoadError::NoRecords);
    }
    for (row, record) in records.iter().enumerate() {
        if let Some((column, reason)) = record.first_invalid_field() {
            return Err(LoadError::InvalidValue {
                row,
                column: column.to_string(),
                reason,
            });
        }
    }
    Ok(Dataset::from_records(records))
}

fn require_columns(mut has: impl FnMut(&str) -> bool) -> Result<(), LoadError> {
    match REQUIRED_COLUMNS.iter().find(|col| !has(**col)) {
        Some(missing) => Err(LoadError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Record>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let headers = reader.headers().context("reading CSV headers")?.clone();
    require_columns(|col| headers.iter().any(|h| h == col))?;

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<Record>().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `to_json(orient='records')` shape.
fn load_json(path: &Path) -> Result<Vec<Record>, LoadError> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        require_columns(|col| obj.contains_key(col))?;

        let record: Record = serde_json::from_value(row.clone())
            .with_context(|| format!("Row {i}: invalid field"))?;
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Record>, LoadError> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    require_columns(|col| schema.index_of(col).is_ok())?;

    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let rank_col = column(&batch, COL_RANK)?;
        let country_col = column(&batch, COL_COUNTRY)?;
        let continent_col = column(&batch, COL_CONTINENT)?;
        let indicator_cols = Indicator::ALL
            .iter()
            .map(|ind| column(&batch, ind.column()))
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            let global_row = records.len();
            let rank = f64_at(rank_col, row)
                .with_context(|| format!("Row {global_row}: '{COL_RANK}'"))?;
            if rank.fract() != 0.0 || rank < 1.0 || rank > u32::MAX as f64 {
                return Err(LoadError::InvalidValue {
                    row: global_row,
                    column: COL_RANK.to_string(),
                    reason: format!("{rank} is not a positive whole rank"),
                });
            }

            let mut values = [0.0; 7];
            for (slot, (ind, col)) in values
                .iter_mut()
                .zip(Indicator::ALL.iter().zip(&indicator_cols))
            {
                *slot = f64_at(col, row)
                    .with_context(|| format!("Row {global_row}: '{}'", ind.column()))?;
            }

            records.push(Record {
                overall_rank: rank as u32,
                country: string_at(country_col, row)
                    .with_context(|| format!("Row {global_row}: '{COL_COUNTRY}'"))?,
                continent: string_at(continent_col, row)
                    .with_context(|| format!("Row {global_row}: '{COL_CONTINENT}'"))?,
                score: values[0],
                gdp_per_capita: values[1],
                social_support: values[2],
                healthy_life_expectancy: values[3],
                freedom: values[4],
                generosity: values[5],
                corruption: values[6],
            });
        }
    }
    Ok(records)
}

// -- Arrow helpers --

fn column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .with_context(|| format!("record batch missing '{name}'"))?;
    Ok(batch.column(idx))
}

fn string_at(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    let s = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row),
        DataType::Utf8View => col.as_string_view().value(row),
        other => bail!("expected a string column, got {other:?}"),
    };
    Ok(s.to_string())
}

fn f64_at(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let v = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as f64,
        DataType::Int16 => col.as_primitive::<Int16Type>().value(row) as f64,
        DataType::Int8 => col.as_primitive::<Int8Type>().value(row) as f64,
        DataType::UInt64 => col.as_primitive::<UInt64Type>().value(row) as f64,
        DataType::UInt32 => col.as_primitive::<UInt32Type>().value(row) as f64,
        DataType::UInt16 => col.as_primitive::<UInt16Type>().value(row) as f64,
        DataType::UInt8 => col.as_primitive::<UInt8Type>().value(row) as f64,
        other => bail!("expected a numeric column, got {other:?}"),
    };
    Ok(v)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "Overall rank,Country or region,Continent,Score,GDP per capita,Social support,Healthy life expectancy,Freedom to make life choices,Generosity,Perceptions of corruption";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_csv_with_extra_columns() {
        let csv = format!(
            "Unnamed: 0,{HEADER}\n\
             0,1,Finland,Europe,7.769,1.340,1.587,0.986,0.596,0.153,0.393\n\
             1,2,Denmark,Europe,7.600,1.383,1.573,0.996,0.592,0.252,0.410\n\
             2,28,Brazil,South America,6.300,1.004,1.439,0.802,0.390,0.099,0.086\n"
        );
        let file = write_temp(".csv", &csv);

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records()[0].country, "Finland");
        assert_eq!(ds.records()[2].overall_rank, 28);
        assert_eq!(ds.score_bounds(), (6.3, 7.769));
        assert_eq!(ds.continents(), ["Europe", "South America"]);
    }

    #[test]
    fn missing_column_is_named() {
        let csv = "Overall rank,Country or region,Continent,Score\n1,Finland,Europe,7.7\n";
        let file = write_temp(".csv", csv);

        match load_file(file.path()) {
            Err(LoadError::MissingColumn(col)) => assert_eq!(col, "GDP per capita"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn header_only_csv_has_no_records() {
        let file = write_temp(".csv", &format!("{HEADER}\n"));
        assert!(matches!(load_file(file.path()), Err(LoadError::NoRecords)));
    }

    #[test]
    fn nan_values_are_rejected() {
        let csv = format!("{HEADER}\n1,Finland,Europe,NaN,1.3,1.5,0.9,0.5,0.1,0.3\n");
        let file = write_temp(".csv", &csv);

        match load_file(file.path()) {
            Err(LoadError::InvalidValue { row, column, .. }) => {
                assert_eq!(row, 0);
                assert_eq!(column, "Score");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_number_is_a_parse_error() {
        let csv = format!("{HEADER}\n1,Finland,Europe,high,1.3,1.5,0.9,0.5,0.1,0.3\n");
        let file = write_temp(".csv", &csv);
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        assert!(format!("{err:#}").contains("CSV row 0"));
    }

    #[test]
    fn loads_records_oriented_json() {
        let json = r#"[
            {"Overall rank": 3, "Country or region": "Norway", "Continent": "Europe",
             "Score": 7.554, "GDP per capita": 1.488, "Social support": 1.582,
             "Healthy life expectancy": 1.028, "Freedom to make life choices": 0.603,
             "Generosity": 0.271, "Perceptions of corruption": 0.341}
        ]"#;
        let file = write_temp(".json", json);

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].generosity, 0.271);
    }

    #[test]
    fn json_missing_column_is_named() {
        let json = r#"[{"Overall rank": 3, "Country or region": "Norway"}]"#;
        let file = write_temp(".json", json);
        assert!(matches!(
            load_file(file.path()),
            Err(LoadError::MissingColumn(col)) if col == "Continent"
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_temp(".xlsx", "irrelevant");
        assert!(matches!(
            load_file(file.path()),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }
}
