use serde::{Deserialize, Serialize};

use crate::config::{LayoutConfig, Margins};
use crate::data::model::BoundaryPoint;

use super::geometry::{AxisBounds, RegionRect};
use super::scale::{ticks, LinearScale};

/// Axis-aligned rectangle in pixel space, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A tick in both domain and pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub position: f64,
}

/// Shared coordinate system of one phase diagram: domain bounds placed on
/// a pixel canvas inside its margins. Larger Γ is drawn higher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotFrame {
    pub bounds: AxisBounds,
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    x: LinearScale,
    y: LinearScale,
}

impl PlotFrame {
    pub fn new(bounds: AxisBounds, layout: &LayoutConfig) -> Self {
        let m = layout.margins;
        let x = LinearScale::new(
            (bounds.frequency_min, bounds.frequency_max),
            (m.left, layout.width - m.right),
        );
        let y = LinearScale::new(
            (bounds.gamma_min, bounds.gamma_max),
            (layout.height - m.bottom, m.top),
        );
        PlotFrame {
            bounds,
            width: layout.width,
            height: layout.height,
            margins: m,
            x,
            y,
        }
    }

    pub fn x(&self, frequency: f64) -> f64 {
        self.x.apply(frequency)
    }

    pub fn y(&self, gamma: f64) -> f64 {
        self.y.apply(gamma)
    }

    /// Pixel point for a `(frequency, Γ)` pair.
    pub fn point(&self, frequency: f64, gamma: f64) -> [f64; 2] {
        [self.x(frequency), self.y(gamma)]
    }

    /// Pixel rectangle of a region, normalized to non-negative size.
    pub fn rect(&self, rect: &RegionRect) -> PixelRect {
        let x0 = self.x(rect.frequency_min);
        let x1 = self.x(rect.frequency_max);
        let y0 = self.y(rect.gamma_min);
        let y1 = self.y(rect.gamma_max);
        PixelRect {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// Boundary curve as a pixel polyline, same order as `curve`.
    pub fn polyline(&self, curve: &[BoundaryPoint]) -> Vec<[f64; 2]> {
        curve
            .iter()
            .map(|p| self.point(p.frequency, p.threshold))
            .collect()
    }

    pub fn frequency_ticks(&self, step: f64) -> Vec<Tick> {
        ticks(self.bounds.frequency_min, self.bounds.frequency_max, step)
            .into_iter()
            .map(|value| Tick {
                value,
                position: self.x(value),
            })
            .collect()
    }

    pub fn gamma_ticks(&self, step: f64) -> Vec<Tick> {
        ticks(self.bounds.gamma_min, self.bounds.gamma_max, step)
            .into_iter()
            .map(|value| Tick {
                value,
                position: self.y(value),
            })
            .collect()
    }
}
