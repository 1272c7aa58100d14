use std::collections::{BTreeMap, BTreeSet};

use palette::{Hsl, IntoColor, Srgb};

use crate::data::catalog::Sweep;
use crate::data::model::ImageRef;

/// An 8-bit sRGB colour.
pub type Rgb = Srgb<u8>;

const BASE_STATE_GREY: Rgb = Srgb::new(160, 160, 160);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_rgb(hue, 0.75, 0.55)
        })
        .collect()
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    rgb.into_format()
}

/// `#rrggbb`
pub fn hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

// ---------------------------------------------------------------------------
// Pattern colours: picture_id → colour
// ---------------------------------------------------------------------------

/// Maps the distinct captured patterns of a view to distinct colours.
/// Base-state regions (no pattern) are grey.
#[derive(Debug, Clone)]
pub struct PatternColors {
    mapping: BTreeMap<ImageRef, Rgb>,
    base_color: Rgb,
}

impl PatternColors {
    pub fn new<'a>(pictures: impl IntoIterator<Item = &'a ImageRef>) -> Self {
        let unique: BTreeSet<&ImageRef> = pictures.into_iter().collect();
        let palette = generate_palette(unique.len());
        let mapping = unique
            .into_iter()
            .cloned()
            .zip(palette)
            .collect();

        PatternColors {
            mapping,
            base_color: BASE_STATE_GREY,
        }
    }

    /// Look up the colour for a region's picture.
    pub fn color_for(&self, picture: Option<&ImageRef>) -> Rgb {
        picture
            .and_then(|p| self.mapping.get(p).copied())
            .unwrap_or(self.base_color)
    }

    /// Legend entries (picture label → colour).
    pub fn legend_entries(&self) -> Vec<(String, Rgb)> {
        self.mapping
            .iter()
            .map(|(p, c)| (p.to_string(), *c))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Sweep colours
// ---------------------------------------------------------------------------

/// Fixed colours for the two sweep directions' boundary curves.
pub fn sweep_color(sweep: Sweep) -> Rgb {
    match sweep {
        Sweep::Up => hsl_to_rgb(0.0, 0.75, 0.45),
        Sweep::Down => hsl_to_rgb(215.0, 0.75, 0.45),
    }
}
