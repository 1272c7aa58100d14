use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions raised by the I/O layer around the pure core.
///
/// The normalizer, builder, boundary extractor and layout code never produce
/// these; malformed cells degrade to absent values instead.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("source not found: {}", .path.display())]
    MissingSource { path: PathBuf },

    #[error("not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("unsupported table format: .{extension} ({})", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("invalid calibration: {parameter} = {value} ({reason})")]
    InvalidCalibration {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("cannot derive a dataset name from {}", .path.display())]
    InvalidDatasetName { path: PathBuf },

    #[error("{} and {} both map to dataset '{id}'", .first.display(), .second.display())]
    DuplicateDataset {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl IngestError {
    /// Whether the error stems from the environment (paths) rather than from
    /// configuration values.
    pub fn is_environmental(&self) -> bool {
        match self {
            IngestError::MissingSource { .. } => true,
            IngestError::NotADirectory { .. } => true,
            IngestError::UnsupportedFormat { .. } => true,
            IngestError::InvalidDatasetName { .. } => true,
            IngestError::DuplicateDataset { .. } => true,
            IngestError::InvalidCalibration { .. } => false,
        }
    }
}
