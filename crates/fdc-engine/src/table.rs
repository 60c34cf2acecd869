//! Immutable ballistic table snapshot.
//!
//! Built once from externally loaded data points and shared read-only for
//! the engine's lifetime. A table refresh replaces the whole snapshot via
//! `Arc` swap; nothing here is ever edited in place.

use std::collections::HashMap;

use fdc_core::reference::BallisticPoint;

/// An indexed, read-only collection of measured ballistic data points.
///
/// Points are grouped by (weapon system, ammunition) pair, each group sorted
/// by (charge, range) so charge grouping and range bracketing are a linear
/// scan.
#[derive(Debug, Default)]
pub struct BallisticTable {
    by_pair: HashMap<(String, String), Vec<BallisticPoint>>,
}

impl BallisticTable {
    pub fn new(points: Vec<BallisticPoint>) -> Self {
        let mut by_pair: HashMap<(String, String), Vec<BallisticPoint>> = HashMap::new();
        for point in points {
            by_pair
                .entry((point.system_id.clone(), point.round_id.clone()))
                .or_default()
                .push(point);
        }
        for group in by_pair.values_mut() {
            group.sort_by(|a, b| {
                a.charge
                    .cmp(&b.charge)
                    .then(a.range_m.total_cmp(&b.range_m))
            });
        }
        Self { by_pair }
    }

    /// All points charted for a (system, round) pair, sorted by (charge, range).
    pub fn points_for(&self, system_id: &str, round_id: &str) -> Option<&[BallisticPoint]> {
        self.by_pair
            .get(&(system_id.to_string(), round_id.to_string()))
            .map(Vec::as_slice)
    }

    /// Overall (min, max) charted range for a pair, across all charges.
    pub fn range_bounds(&self, system_id: &str, round_id: &str) -> Option<(f64, f64)> {
        let points = self.points_for(system_id, round_id)?;
        let min = points.iter().map(|p| p.range_m).fold(f64::INFINITY, f64::min);
        let max = points
            .iter()
            .map(|p| p.range_m)
            .fold(f64::NEG_INFINITY, f64::max);
        (min.is_finite() && max.is_finite()).then_some((min, max))
    }

    /// Number of (system, round) pairs charted.
    pub fn pair_count(&self) -> usize {
        self.by_pair.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }
}
