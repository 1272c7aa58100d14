use serde::Serialize;

use crate::color::{hex, sweep_color, PatternColors};
use crate::config::Config;
use crate::data::boundary::{extract_boundary, hysteresis, HysteresisPoint};
use crate::data::catalog::{Sweep, SweepPair};
use crate::data::model::{BoundaryPoint, Dataset, ImageRef};
use crate::layout::{axis_bounds, region_rect, AxisBounds, PixelRect, PlotFrame, Tick};

// ---------------------------------------------------------------------------
// Phase view – everything a renderer needs for one fluid
// ---------------------------------------------------------------------------

/// One region ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionShape {
    pub index: usize,
    #[serde(with = "crate::data::model::picture_id_serde")]
    pub picture_id: Option<ImageRef>,
    pub open_top: bool,
    pub rect: PixelRect,
    pub fill: String,
}

/// One sweep's regions and boundary curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepLayer {
    pub sweep: Sweep,
    pub dataset_id: String,
    pub color: String,
    pub regions: Vec<RegionShape>,
    pub boundary: Vec<BoundaryPoint>,
    pub boundary_px: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

/// The full presentation model for a fluid: shared axes, both sweeps and
/// their hysteresis table. Rebuilt from the datasets on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseView {
    pub fluid: String,
    pub canvas: Canvas,
    pub bounds: AxisBounds,
    pub frequency_ticks: Vec<Tick>,
    pub gamma_ticks: Vec<Tick>,
    pub layers: Vec<SweepLayer>,
    pub hysteresis: Vec<HysteresisPoint>,
}

impl PhaseView {
    pub fn build(fluid: &str, pair: SweepPair<'_>, config: &Config) -> Self {
        let sweeps: Vec<(Sweep, &Dataset)> = [Sweep::Up, Sweep::Down]
            .into_iter()
            .filter_map(|s| pair.get(s).map(|ds| (s, ds)))
            .collect();

        // Widest bin of either sweep, so no layer's rects are clipped.
        let df = sweeps
            .iter()
            .map(|(_, ds)| ds.meta.df)
            .reduce(f64::max)
            .unwrap_or(config.calibration.df);
        let bounds = axis_bounds(sweeps.iter().flat_map(|(_, ds)| &ds.regions), df);
        let frame = PlotFrame::new(bounds, &config.layout);

        let colors = PatternColors::new(
            sweeps
                .iter()
                .flat_map(|(_, ds)| &ds.regions)
                .filter_map(|r| r.picture_id.as_ref()),
        );

        let layers: Vec<SweepLayer> = sweeps
            .iter()
            .map(|(sweep, ds)| build_layer(*sweep, ds, &frame, &colors, config))
            .collect();

        let hysteresis = hysteresis(
            layer_curve(&layers, Sweep::Up),
            layer_curve(&layers, Sweep::Down),
        );

        PhaseView {
            fluid: fluid.to_string(),
            canvas: Canvas {
                width: frame.width,
                height: frame.height,
            },
            bounds,
            frequency_ticks: frame.frequency_ticks(config.layout.frequency_tick_step),
            gamma_ticks: frame.gamma_ticks(config.layout.gamma_tick_step),
            hysteresis,
            layers,
        }
    }

    pub fn layer(&self, sweep: Sweep) -> Option<&SweepLayer> {
        self.layers.iter().find(|l| l.sweep == sweep)
    }
}

fn layer_curve(layers: &[SweepLayer], sweep: Sweep) -> &[BoundaryPoint] {
    layers
        .iter()
        .find(|l| l.sweep == sweep)
        .map(|l| l.boundary.as_slice())
        .unwrap_or(&[])
}

fn build_layer(
    sweep: Sweep,
    dataset: &Dataset,
    frame: &PlotFrame,
    colors: &PatternColors,
    config: &Config,
) -> SweepLayer {
    let half_width = dataset.meta.df / 2.0;
    let regions = dataset
        .regions
        .iter()
        .filter_map(|r| region_rect(r, half_width, frame.bounds.gamma_max))
        .map(|rect| RegionShape {
            index: rect.index,
            fill: hex(colors.color_for(rect.picture_id.as_ref())),
            open_top: rect.open_top,
            rect: frame.rect(&rect),
            picture_id: rect.picture_id,
        })
        .collect();

    let boundary = extract_boundary(&dataset.regions, &config.boundary);
    log::debug!(
        "{} ({sweep}): {} boundary points",
        dataset.id,
        boundary.len()
    );

    SweepLayer {
        sweep,
        dataset_id: dataset.id.clone(),
        color: hex(sweep_color(sweep)),
        regions,
        boundary_px: frame.polyline(&boundary),
        boundary,
    }
}
