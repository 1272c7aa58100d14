use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Calibration;
use crate::error::IngestError;

use super::builder::build_dataset;
use super::loader::{load_table, scan_tables};
use super::model::Dataset;

/// Write `dataset` as `<out_dir>/<id>.json`, creating `out_dir` if needed.
pub fn write_dataset(out_dir: &Path, dataset: &Dataset) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let path = out_dir.join(format!("{}.json", dataset.id));
    let text = serde_json::to_string_pretty(dataset).context("serializing dataset")?;
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "wrote {} ({} regions)",
        path.display(),
        dataset.regions.len()
    );
    Ok(path)
}

/// Read one dataset document.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(IngestError::MissingSource {
            path: path.to_path_buf(),
        }
        .into());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let dataset: Dataset = serde_json::from_str(&text)
        .with_context(|| format!("parsing dataset {}", path.display()))?;
    Ok(dataset)
}

/// Every `*.json` dataset document in `dir`, sorted by file name.
pub fn load_datasets(dir: &Path) -> Result<Vec<Dataset>> {
    if !dir.is_dir() {
        return Err(IngestError::MissingSource {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry.context("reading directory entry")?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths.iter().map(|p| read_dataset(p)).collect()
}

/// Full ingest of a directory: scan → load → build → write.
///
/// Every table is loaded and built before anything is written, so a missing
/// directory or two tables sharing a dataset id leave `output_dir` untouched.
pub fn convert_directory(
    input_dir: &Path,
    output_dir: &Path,
    calibration: &Calibration,
) -> Result<Vec<PathBuf>> {
    calibration.validate()?;
    let tables = scan_tables(input_dir)?;
    if tables.is_empty() {
        log::warn!("no tables found in {}", input_dir.display());
    }

    let mut seen: HashMap<String, PathBuf> = HashMap::with_capacity(tables.len());
    let mut datasets = Vec::with_capacity(tables.len());
    for table in &tables {
        let source = table
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| IngestError::InvalidDatasetName {
                path: table.clone(),
            })?;
        let rows = load_table(table)?;
        let dataset = build_dataset(source, &rows, calibration);
        if let Some(first) = seen.insert(dataset.id.clone(), table.clone()) {
            return Err(IngestError::DuplicateDataset {
                id: dataset.id,
                first,
                second: table.clone(),
            }
            .into());
        }
        datasets.push(dataset);
    }

    datasets
        .iter()
        .map(|dataset| write_dataset(output_dir, dataset))
        .collect()
}
