//! Coordinate mapping for phase diagrams: affine scales, ticks, region
//! rectangles, axis bounds and the pixel frame tying them together.

pub mod frame;
pub mod geometry;
pub mod scale;

pub use frame::{PixelRect, PlotFrame, Tick};
pub use geometry::{axis_bounds, region_rect, AxisBounds, RegionRect};
pub use scale::{linear_scale, ticks, LinearScale};
