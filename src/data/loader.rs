use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::IngestError;

use super::model::{RawRow, RawValue};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Header names are matched case-sensitively: `drive_frequency` and
/// `Frequency` are different quantities.
pub const DRIVE_FREQUENCY: &str = "drive_frequency";
pub const DRIVE_FREQUENCY_SPACED: &str = "drive frequency";
pub const FREQUENCY: &str = "Frequency";
pub const GAMMA_LOWER: &str = "gamma_lower";
pub const GAMMA_UPPER: &str = "gamma_upper";
pub const PICTURE_ID: &str = "picture_id";

/// Extensions `load_table` understands.
pub const TABLE_EXTENSIONS: [&str; 4] = ["csv", "tsv", "parquet", "pq"];

/// Position of each known column in a table header.
#[derive(Debug, Default, Clone, Copy)]
struct ColumnMap {
    drive_frequency: Option<usize>,
    frequency: Option<usize>,
    gamma_lower: Option<usize>,
    gamma_upper: Option<usize>,
    picture_id: Option<usize>,
}

impl ColumnMap {
    fn from_headers<'a>(source: &Path, headers: impl IntoIterator<Item = &'a str>) -> Self {
        let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
        let find = |name: &str| headers.iter().position(|h| *h == name);

        let map = ColumnMap {
            drive_frequency: find(DRIVE_FREQUENCY).or_else(|| find(DRIVE_FREQUENCY_SPACED)),
            frequency: find(FREQUENCY),
            gamma_lower: find(GAMMA_LOWER),
            gamma_upper: find(GAMMA_UPPER),
            picture_id: find(PICTURE_ID),
        };

        for (name, idx) in [
            (DRIVE_FREQUENCY, map.drive_frequency),
            (FREQUENCY, map.frequency),
            (GAMMA_LOWER, map.gamma_lower),
            (GAMMA_UPPER, map.gamma_upper),
            (PICTURE_ID, map.picture_id),
        ] {
            if idx.is_none() {
                log::warn!(
                    "{}: no '{name}' column, every row treated as missing",
                    source.display()
                );
            }
        }
        map
    }

    fn row(&self, cell: impl Fn(usize) -> RawValue) -> RawRow {
        let get = |idx: Option<usize>| idx.map(&cell).unwrap_or_default();
        RawRow {
            drive_frequency: get(self.drive_frequency),
            frequency: get(self.frequency),
            gamma_lower: get(self.gamma_lower),
            gamma_upper: get(self.gamma_upper),
            picture_id: get(self.picture_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the raw rows of one sweep table.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row naming the columns
/// * `.parquet`      – one column per field, numeric or string typed
pub fn load_table(path: &Path) -> Result<Vec<RawRow>> {
    if !path.exists() {
        return Err(IngestError::MissingSource {
            path: path.to_path_buf(),
        }
        .into());
    }

    let rows = match extension_of(path).as_str() {
        "csv" => load_delimited(path, b',')?,
        "tsv" => load_delimited(path, b'\t')?,
        "parquet" | "pq" => load_parquet(path)?,
        other => {
            return Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: other.to_string(),
            }
            .into())
        }
    };

    log::info!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// All loadable tables in `dir`, sorted by file name.
pub fn scan_tables(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(IngestError::MissingSource {
            path: dir.to_path_buf(),
        }
        .into());
    }
    if !dir.is_dir() {
        return Err(IngestError::NotADirectory {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let mut tables = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry.context("reading directory entry")?.path();
        if path.is_file() && TABLE_EXTENSIONS.contains(&extension_of(&path).as_str()) {
            tables.push(path);
        }
    }
    tables.sort();
    Ok(tables)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// CSV / TSV loader
// ---------------------------------------------------------------------------

/// Every cell is read as text; coercion happens later in the normalizer.
/// Short rows are tolerated and their trailing cells count as missing.
fn load_delimited(path: &Path, delimiter: u8) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = reader.headers().context("reading table headers")?.clone();
    let columns = ColumnMap::from_headers(path, headers.iter());

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{} row {row_no}", path.display()))?;
        rows.push(columns.row(|idx| match record.get(idx) {
            Some(text) => RawValue::Text(text.to_string()),
            None => RawValue::Missing,
        }));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by Pandas (`df.to_parquet()`) and Polars.
fn load_parquet(path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    // All batches share the file schema; resolve columns once.
    let columns = ColumnMap::from_headers(
        path,
        builder.schema().fields().iter().map(|f| f.name().as_str()),
    );
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(columns.row(|idx| extract_cell(batch.column(idx), row)));
        }
    }

    Ok(rows)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> RawValue {
    if col.is_null(row) {
        return RawValue::Missing;
    }
    match col.data_type() {
        DataType::Utf8 => match col.as_any().downcast_ref::<StringArray>() {
            Some(s) => RawValue::Text(s.value(row).to_string()),
            None => RawValue::Missing,
        },
        DataType::LargeUtf8 => RawValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map_or(RawValue::Missing, |a| RawValue::Number(a.value(row) as f64)),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or(RawValue::Missing, |a| RawValue::Number(a.value(row) as f64)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map_or(RawValue::Missing, |a| RawValue::Number(a.value(row) as f64)),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or(RawValue::Missing, |a| RawValue::Number(a.value(row))),
        _ => match array_value_to_string(col.as_ref(), row) {
            Ok(text) => RawValue::Text(text),
            Err(_) => RawValue::Missing,
        },
    }
}
