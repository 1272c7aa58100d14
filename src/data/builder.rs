use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Calibration;

use super::model::{Dataset, DatasetMeta, RawRow, Sentinels};
use super::normalize::normalize_row;

/// Build the canonical dataset for one source table.
///
/// Indices are assigned here and nowhere else: `regions[i].index == i`.
/// Malformed cells become absent values, so this never fails.
pub fn build_dataset(source: &str, rows: &[RawRow], calibration: &Calibration) -> Dataset {
    let regions: Vec<_> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| normalize_row(row, index, calibration))
        .collect();

    log::debug!(
        "built dataset from {source}: {} regions ({} with a pattern)",
        regions.len(),
        regions.iter().filter(|r| r.has_picture()).count()
    );

    Dataset {
        id: dataset_id(source),
        source: source.to_string(),
        meta: dataset_meta(calibration),
        regions,
    }
}

/// Metadata describing how to read the region fields of a dataset built
/// with `calibration`.
pub fn dataset_meta(calibration: &Calibration) -> DatasetMeta {
    let columns: BTreeMap<String, String> = [
        ("index", "0-based row order in the source table"),
        ("drive_frequency", "drive frequency as recorded, Hz; null if not numeric"),
        ("frequency", "nominal excitation frequency, Hz; null if not numeric"),
        ("df", "frequency bin width, Hz (same for every region)"),
        ("frequency_min", "frequency - df/2; null when frequency is null"),
        ("frequency_max", "frequency + df/2; null when frequency is null"),
        ("gamma_lower", "lower threshold, dimensionless Gamma; null if not measured"),
        ("gamma_upper", "upper threshold, dimensionless Gamma; null if not measured"),
        ("picture_id", "captured pattern reference, or \"-\""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    DatasetMeta {
        sensitivity_mv_per_g: calibration.sensitivity_mv_per_g,
        df: calibration.df,
        formula: calibration.formula(),
        gamma_unit: "g (acceleration amplitude / gravitational acceleration)".to_string(),
        sentinels: Sentinels::default(),
        columns,
    }
}

/// Stable slug for a source: base name without directory or extension,
/// lowercased, non-alphanumeric runs collapsed to a single `-`.
pub fn dataset_id(source: &str) -> String {
    let path = Path::new(source);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source);

    let mut slug = String::with_capacity(stem.len());
    for ch in stem.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "dataset".to_string()
    } else {
        slug
    }
}
