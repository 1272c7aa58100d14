use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal placeholder used in tables and documents for "no pattern" and
/// "not yet measured".
pub const DASH: &str = "-";

// ---------------------------------------------------------------------------
// RawValue – a single cell as read from a source table
// ---------------------------------------------------------------------------

/// A cell before coercion. Text tables only ever produce `Text` / `Missing`;
/// typed sources (Parquet) may hand over numbers directly.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    Text(String),
    Number(f64),
    #[default]
    Missing,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => write!(f, "{s}"),
            RawValue::Number(v) => write!(f, "{v}"),
            RawValue::Missing => write!(f, "<missing>"),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

// ---------------------------------------------------------------------------
// RawRow – one row of a sweep table
// ---------------------------------------------------------------------------

/// One input record. `frequency` is the table's capitalized `Frequency`
/// column, the nominal excitation frequency in Hz; `drive_frequency` is the
/// separate lowercase column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    pub drive_frequency: RawValue,
    pub frequency: RawValue,
    /// Peak voltage, mV.
    pub gamma_lower: RawValue,
    /// Peak voltage, mV.
    pub gamma_upper: RawValue,
    pub picture_id: RawValue,
}

// ---------------------------------------------------------------------------
// ImageRef – reference to a captured pattern image
// ---------------------------------------------------------------------------

/// Non-empty reference to a captured pattern. "No pattern" is expressed as
/// `Option::<ImageRef>::None`, never as a dash inside an `ImageRef`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageRef(String);

impl ImageRef {
    /// Trim `text`; empty text and the dash mean "no pattern".
    pub fn parse(text: &str) -> Option<ImageRef> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == DASH {
            None
        } else {
            Some(ImageRef(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serialize `Option<ImageRef>` as a plain string, `None` as the dash.
pub mod picture_id_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{ImageRef, DASH};

    pub fn serialize<S: Serializer>(value: &Option<ImageRef>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(image) => s.serialize_str(image.as_str()),
            None => s.serialize_str(DASH),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ImageRef>, D::Error> {
        let text: Option<String> = Option::deserialize(d)?;
        Ok(text.as_deref().and_then(ImageRef::parse))
    }
}

// ---------------------------------------------------------------------------
// Region – one normalized observation
// ---------------------------------------------------------------------------

/// Canonical, unit-converted form of one table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Original row position; disambiguation only.
    pub index: usize,
    pub drive_frequency: Option<f64>,
    pub frequency: Option<f64>,
    #[serde(alias = "frequency_bin_width")]
    pub df: f64,
    pub frequency_min: Option<f64>,
    pub frequency_max: Option<f64>,
    #[serde(alias = "Gamma_lower")]
    pub gamma_lower: Option<f64>,
    /// `None` means the upper boundary was not measured, not zero.
    #[serde(alias = "Gamma_upper")]
    pub gamma_upper: Option<f64>,
    #[serde(with = "picture_id_serde")]
    pub picture_id: Option<ImageRef>,
}

impl Region {
    /// Whether a captured pattern exists for this point.
    pub fn has_picture(&self) -> bool {
        self.picture_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// Dataset – one source table, normalized
// ---------------------------------------------------------------------------

/// How the sentinel dash is to be read in each field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentinels {
    pub picture_id: String,
    pub gamma_upper: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            picture_id: "\"-\" means no captured pattern for this point (base state)".to_string(),
            gamma_upper: "null means the upper boundary was not measured; never zero".to_string(),
        }
    }
}

/// Conversion constants and data-shape documentation carried with a dataset
/// so consumers never need to re-derive the formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub sensitivity_mv_per_g: f64,
    pub df: f64,
    pub formula: String,
    pub gamma_unit: String,
    pub sentinels: Sentinels,
    pub columns: BTreeMap<String, String>,
}

/// The canonical dataset document. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub source: String,
    pub meta: DatasetMeta,
    pub regions: Vec<Region>,
}

impl Dataset {
    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the dataset has no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// BoundaryPoint – derived, never persisted inside a Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub frequency: f64,
    pub threshold: f64,
}
