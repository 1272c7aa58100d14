use crate::config::Calibration;

use super::model::{ImageRef, RawRow, RawValue, Region, DASH};

// ---------------------------------------------------------------------------
// Scalar coercion
// ---------------------------------------------------------------------------

/// Coerce a cell to a finite number. Empty text, the dash, unparseable text
/// and non-finite values all come back as `None`; this never fails.
pub fn coerce_number(cell: &RawValue) -> Option<f64> {
    let value = match cell {
        RawValue::Number(v) => *v,
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == DASH {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        RawValue::Missing => return None,
    };
    value.is_finite().then_some(value)
}

/// Coerce a cell to a pattern reference; missing, empty and dash cells mean
/// "no pattern".
pub fn coerce_picture(cell: &RawValue) -> Option<ImageRef> {
    match cell {
        RawValue::Text(s) => ImageRef::parse(s),
        RawValue::Number(v) if v.is_finite() => ImageRef::parse(&v.to_string()),
        RawValue::Number(_) | RawValue::Missing => None,
    }
}

// ---------------------------------------------------------------------------
// Unit conversion
// ---------------------------------------------------------------------------

/// Peak voltage (mV) to dimensionless forcing amplitude Γ.
pub fn mv_to_gamma(mv: f64, sensitivity_mv_per_g: f64) -> f64 {
    mv / sensitivity_mv_per_g
}

/// `(f - df/2, f + df/2)`.
pub fn frequency_bin(frequency: f64, df: f64) -> (f64, f64) {
    let half = df / 2.0;
    (frequency - half, frequency + half)
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

/// Turn one raw row into a region. `index` is the row's position in its
/// source table.
pub fn normalize_row(row: &RawRow, index: usize, calibration: &Calibration) -> Region {
    let frequency = coerce_number(&row.frequency);
    let bin = frequency.map(|f| frequency_bin(f, calibration.df));
    let to_gamma = |cell: &RawValue| {
        coerce_number(cell).map(|mv| mv_to_gamma(mv, calibration.sensitivity_mv_per_g))
    };

    Region {
        index,
        drive_frequency: coerce_number(&row.drive_frequency),
        frequency,
        df: calibration.df,
        frequency_min: bin.map(|(lo, _)| lo),
        frequency_max: bin.map(|(_, hi)| hi),
        gamma_lower: to_gamma(&row.gamma_lower),
        gamma_upper: to_gamma(&row.gamma_upper),
        picture_id: coerce_picture(&row.picture_id),
    }
}
