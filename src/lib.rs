//! Phase diagrams from driven-fluid frequency sweeps.
//!
//! Raw sweep tables (frequency, lower/upper threshold in mV, pattern
//! reference) are normalized into canonical [`data::model::Dataset`]
//! documents. Per-sweep onset curves come from [`data::boundary`], and
//! [`layout`] maps regions and curves onto a shared coordinate system.
//! Everything in `data::{normalize, builder, boundary}` and `layout` is pure.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod images;
pub mod layout;
pub mod view;

pub use config::{Calibration, Config};
pub use data::boundary::{extract_boundary, BoundaryPolicy};
pub use data::builder::build_dataset;
pub use data::model::{BoundaryPoint, Dataset, ImageRef, RawRow, RawValue, Region};
pub use data::normalize::normalize_row;
pub use error::IngestError;
