//! Multi-emitter synchronization onto a single target.
//!
//! Each emitter computes its own bearing and range to the target directly;
//! the master's solution supplies the ballistic baseline. The per-emitter
//! elevation correction is a linear function of the range delta and the
//! per-emitter time of flight scales the master's by the range ratio —
//! both stand-ins for a full per-emitter table lookup.

use serde::{Deserialize, Serialize};

use fdc_core::constants::{DERIVATIVE_STEP_M, SYNC_ELEVATION_MILS_PER_100M};
use fdc_core::errors::{FdcError, FdcResult};
use fdc_core::grid::{signed_delta_mils, GridCoordinate};

use crate::engine::FiringSolution;
use crate::formation::EmitterFormation;

/// One emitter's synchronized firing data, expressed as corrections to the
/// master solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterSolution {
    pub emitter_id: u32,
    /// This emitter's own bearing to the target, mils.
    pub bearing_mils: f64,
    /// This emitter's own range to the target, meters.
    pub range_m: f64,
    /// Signed bearing delta from the master's azimuth, mils.
    pub bearing_correction_mils: f64,
    /// Signed elevation delta from the master's elevation, mils.
    pub elevation_correction_mils: f64,
    /// Estimated time of flight, seconds.
    pub time_of_flight: f64,
    /// Hold time before firing, relative to the slowest emitter, seconds.
    pub delay_secs: f64,
}

/// Coarse estimate of the combined impact pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactPattern {
    /// Cross-range extent, meters.
    pub width_m: f64,
    /// Down-range extent, meters.
    pub depth_m: f64,
    pub center: GridCoordinate,
}

/// A formation-wide solution synchronized for simultaneous or immediate fire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynchronizedSolution {
    pub master: FiringSolution,
    pub emitters: Vec<EmitterSolution>,
    pub pattern: ImpactPattern,
}

/// Synchronize every emitter of `formation` onto `target`.
///
/// With `simultaneous` set, each emitter holds fire for the difference
/// between the slowest time of flight and its own, so all rounds land
/// together; otherwise every delay is zero.
pub fn synchronize(
    formation: &EmitterFormation,
    target: &GridCoordinate,
    master: &FiringSolution,
    simultaneous: bool,
) -> FdcResult<SynchronizedSolution> {
    if formation.emitters.is_empty() {
        return Err(FdcError::InvalidFormation {
            violations: vec!["formation has no emitters".to_string()],
        });
    }

    let mut emitters: Vec<EmitterSolution> = formation
        .emitters
        .iter()
        .map(|emitter| {
            let bearing_mils = emitter.position.bearing_to(target);
            let range_m = emitter.position.distance_to(target);
            let range_delta = range_m - master.range_m;

            // Longer range flattens the trajectory at a fixed charge.
            let elevation_correction_mils =
                -(range_delta / DERIVATIVE_STEP_M) * SYNC_ELEVATION_MILS_PER_100M;
            let time_of_flight = if master.range_m > 0.0 {
                master.time_of_flight * range_m / master.range_m
            } else {
                master.time_of_flight
            };

            EmitterSolution {
                emitter_id: emitter.id,
                bearing_mils,
                range_m,
                bearing_correction_mils: signed_delta_mils(master.bearing_mils, bearing_mils),
                elevation_correction_mils,
                time_of_flight,
                delay_secs: 0.0,
            }
        })
        .collect();

    let max_tof = emitters
        .iter()
        .map(|e| e.time_of_flight)
        .fold(f64::NEG_INFINITY, f64::max);
    if simultaneous {
        for emitter in &mut emitters {
            emitter.delay_secs = max_tof - emitter.time_of_flight;
        }
    }

    let pattern = impact_pattern(&emitters, target);
    tracing::debug!(
        emitters = emitters.len(),
        simultaneous,
        max_tof,
        "synchronized formation onto target"
    );

    Ok(SynchronizedSolution {
        master: master.clone(),
        emitters,
        pattern,
    })
}

/// Derive the coarse impact spread from the per-emitter geometry: depth from
/// the min/max ranges, width from the bearing fan at the mean range.
fn impact_pattern(emitters: &[EmitterSolution], target: &GridCoordinate) -> ImpactPattern {
    let min_range = emitters.iter().map(|e| e.range_m).fold(f64::INFINITY, f64::min);
    let max_range = emitters
        .iter()
        .map(|e| e.range_m)
        .fold(f64::NEG_INFINITY, f64::max);

    let min_corr = emitters
        .iter()
        .map(|e| e.bearing_correction_mils)
        .fold(f64::INFINITY, f64::min);
    let max_corr = emitters
        .iter()
        .map(|e| e.bearing_correction_mils)
        .fold(f64::NEG_INFINITY, f64::max);
    let mean_range = (min_range + max_range) / 2.0;

    ImpactPattern {
        width_m: fdc_core::grid::mils_to_radians(max_corr - min_corr) * mean_range,
        depth_m: max_range - min_range,
        center: target.clone(),
    }
}
