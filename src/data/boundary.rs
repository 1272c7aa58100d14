use serde::{Deserialize, Serialize};

use super::model::{BoundaryPoint, Region};

// ---------------------------------------------------------------------------
// Filtering policy
// ---------------------------------------------------------------------------

/// Which regions may contribute to an observed threshold.
///
/// The default is the one fixed policy used for this experiment: pattern
/// required, threshold strictly above zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryPolicy {
    /// Skip regions whose `picture_id` is the dash (base state).
    pub require_picture: bool,
    /// Skip regions with `gamma_lower <= min_threshold`.
    pub min_threshold: f64,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        Self {
            require_picture: true,
            min_threshold: 0.0,
        }
    }
}

impl BoundaryPolicy {
    /// `(frequency, gamma_lower)` if the region qualifies.
    fn admit(&self, region: &Region) -> Option<(f64, f64)> {
        let frequency = region.frequency?;
        let threshold = region.gamma_lower?;
        if self.require_picture && !region.has_picture() {
            return None;
        }
        if threshold <= self.min_threshold {
            return None;
        }
        Some((frequency, threshold))
    }
}

// ---------------------------------------------------------------------------
// Boundary extraction
// ---------------------------------------------------------------------------

/// Reduce one sweep's regions to its onset curve: the minimum qualifying
/// `gamma_lower` at each distinct frequency, ascending by frequency.
///
/// Frequencies are grouped by exact value. The result does not depend on the
/// order of `regions`.
pub fn extract_boundary<'a, I>(regions: I, policy: &BoundaryPolicy) -> Vec<BoundaryPoint>
where
    I: IntoIterator<Item = &'a Region>,
{
    let mut admitted: Vec<(f64, f64)> = regions
        .into_iter()
        .filter_map(|r| policy.admit(r))
        .collect();

    admitted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut curve: Vec<BoundaryPoint> = Vec::new();
    for (frequency, threshold) in admitted {
        match curve.last_mut() {
            // -0.0 and 0.0 sort adjacently and compare equal.
            Some(last) if last.frequency == frequency => {
                last.threshold = last.threshold.min(threshold);
            }
            _ => curve.push(BoundaryPoint {
                frequency,
                threshold,
            }),
        }
    }

    log::trace!("boundary curve with {} points", curve.len());
    curve
}

// ---------------------------------------------------------------------------
// Hysteresis: up vs down sweep
// ---------------------------------------------------------------------------

/// Thresholds of both sweeps at one frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HysteresisPoint {
    pub frequency: f64,
    pub up: Option<f64>,
    pub down: Option<f64>,
}

impl HysteresisPoint {
    /// `up - down`, when both sweeps observed a threshold here.
    pub fn gap(&self) -> Option<f64> {
        Some(self.up? - self.down?)
    }
}

/// Outer join of two boundary curves on exact frequency, ascending.
pub fn hysteresis(up: &[BoundaryPoint], down: &[BoundaryPoint]) -> Vec<HysteresisPoint> {
    let mut up: Vec<BoundaryPoint> = up.to_vec();
    let mut down: Vec<BoundaryPoint> = down.to_vec();
    up.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
    down.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));

    let mut joined = Vec::with_capacity(up.len().max(down.len()));
    let (mut i, mut j) = (0, 0);
    while i < up.len() || j < down.len() {
        let point = match (up.get(i), down.get(j)) {
            (Some(u), Some(d)) if u.frequency == d.frequency => {
                i += 1;
                j += 1;
                HysteresisPoint {
                    frequency: u.frequency,
                    up: Some(u.threshold),
                    down: Some(d.threshold),
                }
            }
            (Some(u), Some(d)) if u.frequency < d.frequency => {
                i += 1;
                HysteresisPoint {
                    frequency: u.frequency,
                    up: Some(u.threshold),
                    down: None,
                }
            }
            (Some(u), None) => {
                i += 1;
                HysteresisPoint {
                    frequency: u.frequency,
                    up: Some(u.threshold),
                    down: None,
                }
            }
            (_, Some(d)) => {
                j += 1;
                HysteresisPoint {
                    frequency: d.frequency,
                    up: None,
                    down: Some(d.threshold),
                }
            }
            (None, None) => break,
        };
        joined.push(point);
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ImageRef;

    fn region(index: usize, frequency: Option<f64>, lower: Option<f64>, picture: &str) -> Region {
        Region {
            index,
            drive_frequency: None,
            frequency,
            df: 1.0,
            frequency_min: frequency.map(|f| f - 0.5),
            frequency_max: frequency.map(|f| f + 0.5),
            gamma_lower: lower,
            gamma_upper: None,
            picture_id: ImageRef::parse(picture),
        }
    }

    fn point(frequency: f64, threshold: f64) -> BoundaryPoint {
        BoundaryPoint {
            frequency,
            threshold,
        }
    }

    #[test]
    fn test_dash_filtered_minimum() {
        let regions = vec![
            region(0, Some(6.5), Some(0.8), "-"),
            region(1, Some(6.5), Some(0.5), "p1"),
            region(2, Some(6.5), Some(0.6), "p2"),
        ];
        let curve = extract_boundary(&regions, &BoundaryPolicy::default());
        assert_eq!(curve, vec![point(6.5, 0.5)]);
    }

    #[test]
    fn test_dash_row_never_contributes() {
        // Lower than everything else, but no pattern.
        let regions = vec![
            region(0, Some(7.0), Some(0.1), "-"),
            region(1, Some(7.0), Some(0.9), "p1"),
        ];
        let curve = extract_boundary(&regions, &BoundaryPolicy::default());
        assert_eq!(curve, vec![point(7.0, 0.9)]);
    }

    #[test]
    fn test_absent_and_non_positive_are_dropped() {
        let regions = vec![
            region(0, None, Some(0.4), "p"),
            region(1, Some(8.0), None, "p"),
            region(2, Some(9.0), Some(0.0), "p"),
            region(3, Some(10.0), Some(-0.2), "p"),
        ];
        assert!(extract_boundary(&regions, &BoundaryPolicy::default()).is_empty());
    }

    #[test]
    fn test_sorted_by_frequency() {
        let regions = vec![
            region(0, Some(12.0), Some(1.1), "a"),
            region(1, Some(6.0), Some(0.4), "b"),
            region(2, Some(9.0), Some(0.7), "c"),
            region(3, Some(6.0), Some(0.3), "d"),
        ];
        let curve = extract_boundary(&regions, &BoundaryPolicy::default());
        assert_eq!(curve, vec![point(6.0, 0.3), point(9.0, 0.7), point(12.0, 1.1)]);
    }

    #[test]
    fn test_idempotent_and_order_invariant() {
        let regions = vec![
            region(0, Some(6.5), Some(0.8), "a"),
            region(1, Some(7.5), Some(0.9), "b"),
            region(2, Some(6.5), Some(0.7), "c"),
            region(3, Some(8.5), Some(1.2), "-"),
            region(4, Some(7.5), Some(1.0), "d"),
        ];
        let policy = BoundaryPolicy::default();
        let first = extract_boundary(&regions, &policy);
        assert_eq!(first, extract_boundary(&regions, &policy));

        let mut reversed = regions.clone();
        reversed.reverse();
        assert_eq!(first, extract_boundary(&reversed, &policy));

        let rotated: Vec<Region> = regions[2..].iter().chain(&regions[..2]).cloned().collect();
        assert_eq!(first, extract_boundary(&rotated, &policy));
    }

    #[test]
    fn test_exact_frequency_grouping() {
        let regions = vec![
            region(0, Some(6.5), Some(0.8), "a"),
            region(1, Some(6.5000001), Some(0.7), "b"),
        ];
        let curve = extract_boundary(&regions, &BoundaryPolicy::default());
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn test_policy_without_picture_requirement() {
        let regions = vec![region(0, Some(6.5), Some(0.8), "-")];
        let policy = BoundaryPolicy {
            require_picture: false,
            ..BoundaryPolicy::default()
        };
        assert_eq!(extract_boundary(&regions, &policy), vec![point(6.5, 0.8)]);
    }

    #[test]
    fn test_empty_input() {
        let none: Vec<Region> = Vec::new();
        assert!(extract_boundary(&none, &BoundaryPolicy::default()).is_empty());
    }

    #[test]
    fn test_hysteresis_outer_join() {
        let up = vec![point(6.0, 0.5), point(7.0, 0.6), point(9.0, 1.0)];
        let down = vec![point(7.0, 0.4), point(8.0, 0.5), point(9.0, 0.75)];
        let joined = hysteresis(&up, &down);

        let freqs: Vec<f64> = joined.iter().map(|p| p.frequency).collect();
        assert_eq!(freqs, vec![6.0, 7.0, 8.0, 9.0]);
        assert_eq!(joined[0].down, None);
        assert_eq!(joined[2].up, None);
        assert!((joined[1].gap().unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(joined[3].gap(), Some(0.25));
        assert_eq!(joined[0].gap(), None);
    }

    #[test]
    fn test_hysteresis_of_empty_curves() {
        assert!(hysteresis(&[], &[]).is_empty());
        let only_down = hysteresis(&[], &[point(5.0, 0.3)]);
        assert_eq!(only_down.len(), 1);
        assert_eq!(only_down[0].up, None);
    }
}
