use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Sweep direction and dataset keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sweep {
    Up,
    Down,
}

impl Sweep {
    pub fn parse(token: &str) -> Option<Sweep> {
        match token.to_ascii_lowercase().as_str() {
            "up" | "increase" => Some(Sweep::Up),
            "down" | "decrease" => Some(Sweep::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Sweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sweep::Up => write!(f, "up"),
            Sweep::Down => write!(f, "down"),
        }
    }
}

/// `(fluid, sweep)` decoded from a dataset id such as `silicone-oil-up`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetKey {
    pub fluid: String,
    pub sweep: Sweep,
}

impl DatasetKey {
    /// The sweep is the last `-` token; everything before it names the fluid.
    pub fn parse(id: &str) -> Option<DatasetKey> {
        let (fluid, token) = id.rsplit_once('-')?;
        let sweep = Sweep::parse(token)?;
        if fluid.is_empty() {
            return None;
        }
        Some(DatasetKey {
            fluid: fluid.to_string(),
            sweep,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog – datasets indexed by fluid and sweep
// ---------------------------------------------------------------------------

/// Both sweeps of one fluid; either may be missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepPair<'a> {
    pub up: Option<&'a Dataset>,
    pub down: Option<&'a Dataset>,
}

impl<'a> SweepPair<'a> {
    pub fn get(&self, sweep: Sweep) -> Option<&'a Dataset> {
        match sweep {
            Sweep::Up => self.up,
            Sweep::Down => self.down,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    datasets: BTreeMap<DatasetKey, Dataset>,
}

impl Catalog {
    /// Index datasets by the key encoded in their id. Ids that do not name a
    /// sweep are skipped; a later duplicate key replaces the earlier one.
    pub fn from_datasets(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        let mut indexed = BTreeMap::new();
        for dataset in datasets {
            match DatasetKey::parse(&dataset.id) {
                Some(key) => {
                    if indexed.contains_key(&key) {
                        log::warn!("duplicate dataset for {}-{}, keeping {}", key.fluid, key.sweep, dataset.id);
                    }
                    indexed.insert(key, dataset);
                }
                None => log::info!("skipping dataset '{}': id names no sweep", dataset.id),
            }
        }
        Catalog { datasets: indexed }
    }

    /// Distinct fluids, sorted.
    pub fn fluids(&self) -> Vec<&str> {
        let mut fluids: Vec<&str> = self.datasets.keys().map(|k| k.fluid.as_str()).collect();
        fluids.dedup();
        fluids
    }

    pub fn get(&self, fluid: &str, sweep: Sweep) -> Option<&Dataset> {
        self.datasets.get(&DatasetKey {
            fluid: fluid.to_string(),
            sweep,
        })
    }

    pub fn pair(&self, fluid: &str) -> SweepPair<'_> {
        SweepPair {
            up: self.get(fluid, Sweep::Up),
            down: self.get(fluid, Sweep::Down),
        }
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Calibration;
    use crate::data::builder::build_dataset;

    fn empty(source: &str) -> Dataset {
        build_dataset(source, &[], &Calibration::default())
    }

    #[test]
    fn test_key_parse() {
        let key = DatasetKey::parse("silicone-oil-up").unwrap();
        assert_eq!(key.fluid, "silicone-oil");
        assert_eq!(key.sweep, Sweep::Up);
        assert_eq!(DatasetKey::parse("water-decrease").unwrap().sweep, Sweep::Down);
        assert!(DatasetKey::parse("water").is_none());
        assert!(DatasetKey::parse("water-sideways").is_none());
        assert!(DatasetKey::parse("-up").is_none());
    }

    #[test]
    fn test_catalog_pairs() {
        let catalog = Catalog::from_datasets(vec![
            empty("water_up.csv"),
            empty("water_down.csv"),
            empty("glycerol_up.csv"),
            empty("calibration.csv"),
        ]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.fluids(), vec!["glycerol", "water"]);

        let water = catalog.pair("water");
        assert_eq!(water.up.unwrap().id, "water-up");
        assert_eq!(water.get(Sweep::Down).unwrap().id, "water-down");

        let glycerol = catalog.pair("glycerol");
        assert!(glycerol.up.is_some());
        assert!(glycerol.down.is_none());

        assert!(catalog.pair("mercury").up.is_none());
    }

    #[test]
    fn test_sweep_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Sweep::Down).unwrap(), "down");
        assert_eq!(Sweep::Up.to_string(), "up");
    }
}
