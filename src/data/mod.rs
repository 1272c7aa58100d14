//! Data layer: raw tables, canonical datasets, boundary curves.
//!
//! Architecture:
//! ```text
//!  .csv / .tsv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  header → Vec<RawRow>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  RawRow → Region (mV → Γ, frequency bin)
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ builder   │  Vec<Region> + meta → Dataset  ──►  store (<id>.json)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐      ┌──────────┐
//!   │ catalog   │ ──► │ boundary  │  up / down onset curves
//!   └──────────┘      └──────────┘
//! ```

pub mod boundary;
pub mod builder;
pub mod catalog;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod store;
