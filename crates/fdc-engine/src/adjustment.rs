//! Observer-relative target adjustment.
//!
//! An observer watching the fall of shot sends a signed range correction
//! (positive = add range) and a signed direction correction in mils
//! (positive = right). The target is moved along the observer-target line
//! and the firing solution recomputed from the unchanged firing position.

use serde::{Deserialize, Serialize};

use fdc_core::errors::{FdcError, FdcResult};
use fdc_core::grid::{normalize_mils, GridCoordinate};

use crate::engine::FiringSolution;

/// A signed observer correction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObserverCorrection {
    /// Range correction in meters; positive adds range.
    pub range_m: f64,
    /// Direction correction in mils; positive shifts right.
    pub deflection_mils: f64,
}

/// An adjusted solution, with the audit trail a fire-direction center logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustedFiringSolution {
    /// The recomputed solution against the adjusted target.
    pub solution: FiringSolution,
    pub adjusted_target: GridCoordinate,
    pub original_target: GridCoordinate,
    pub correction: ObserverCorrection,
    /// Bearing from the observer to the original target, mils.
    pub observer_target_bearing_mils: f64,
}

/// Apply an observer correction, producing the adjusted target coordinate
/// and the original observer-target bearing.
pub fn adjust_target(
    observer: &GridCoordinate,
    target: &GridCoordinate,
    correction: &ObserverCorrection,
) -> FdcResult<(GridCoordinate, f64)> {
    let observer_bearing = observer.bearing_to(target);
    let adjusted_bearing = normalize_mils(observer_bearing + correction.deflection_mils);

    let distance = observer.distance_to(target);
    let new_distance = distance + correction.range_m;
    if new_distance < 0.0 {
        return Err(FdcError::InvalidAdjustment {
            distance_m: distance,
            correction_m: correction.range_m,
        });
    }

    let adjusted = observer.project(adjusted_bearing, new_distance);
    Ok((adjusted, observer_bearing))
}
