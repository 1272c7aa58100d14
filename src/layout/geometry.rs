use serde::{Deserialize, Serialize};

use crate::data::model::{ImageRef, Region};

/// Relative headroom added above the largest Γ on the amplitude axis.
pub const GAMMA_MARGIN_RATIO: f64 = 0.1;
/// Minimum absolute headroom above the largest Γ.
pub const GAMMA_MARGIN_MIN: f64 = 0.05;

// ---------------------------------------------------------------------------
// Region rectangles (domain space)
// ---------------------------------------------------------------------------

/// A region's footprint in (frequency, Γ) space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRect {
    pub index: usize,
    pub frequency_min: f64,
    pub frequency_max: f64,
    pub gamma_min: f64,
    pub gamma_max: f64,
    /// The upper threshold was not measured; `gamma_max` is the fallback.
    pub open_top: bool,
    #[serde(with = "crate::data::model::picture_id_serde")]
    pub picture_id: Option<ImageRef>,
}

/// Rectangle `[f - half_width, f + half_width] × [Γ_lower, Γ_upper]`, with
/// `gamma_fallback` standing in for an unmeasured upper threshold.
///
/// `None` when the region has no frequency or no lower threshold.
pub fn region_rect(region: &Region, half_width: f64, gamma_fallback: f64) -> Option<RegionRect> {
    let frequency = region.frequency?;
    let gamma_lower = region.gamma_lower?;
    Some(RegionRect {
        index: region.index,
        frequency_min: frequency - half_width,
        frequency_max: frequency + half_width,
        gamma_min: gamma_lower,
        gamma_max: region.gamma_upper.unwrap_or(gamma_fallback),
        open_top: region.gamma_upper.is_none(),
        picture_id: region.picture_id.clone(),
    })
}

// ---------------------------------------------------------------------------
// Axis bounds
// ---------------------------------------------------------------------------

/// Domain extent of a phase diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub frequency_min: f64,
    pub frequency_max: f64,
    pub gamma_min: f64,
    pub gamma_max: f64,
}

/// Bounds covering every region: frequency extremes widened by `df / 2`,
/// Γ from 0 to the largest present threshold plus headroom.
///
/// Missing extremes count as 0, so an empty input still yields a usable box.
pub fn axis_bounds<'a, I>(regions: I, df: f64) -> AxisBounds
where
    I: IntoIterator<Item = &'a Region>,
{
    let mut f_lo = f64::INFINITY;
    let mut f_hi = f64::NEG_INFINITY;
    let mut g_hi = f64::NEG_INFINITY;

    for region in regions {
        if let Some(f) = region.frequency {
            f_lo = f_lo.min(f);
            f_hi = f_hi.max(f);
        }
        for g in [region.gamma_lower, region.gamma_upper].into_iter().flatten() {
            g_hi = g_hi.max(g);
        }
    }

    if !f_lo.is_finite() {
        f_lo = 0.0;
        f_hi = 0.0;
    }
    if !g_hi.is_finite() {
        g_hi = 0.0;
    }

    let half = df / 2.0;
    AxisBounds {
        frequency_min: f_lo - half,
        frequency_max: f_hi + half,
        gamma_min: 0.0,
        gamma_max: g_hi + gamma_margin(g_hi),
    }
}

fn gamma_margin(gamma_max: f64) -> f64 {
    (gamma_max.abs() * GAMMA_MARGIN_RATIO).max(GAMMA_MARGIN_MIN)
}
