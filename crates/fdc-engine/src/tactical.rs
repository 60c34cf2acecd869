//! Tactical charge and data-point selection.
//!
//! Given the charted subset for one (system, round) pair and a target range,
//! pick which point (or interpolated charge group) to fire, according to the
//! requested tactical method. Every selection carries a human-readable
//! justification for operator transparency.

use fdc_core::constants::{DEFAULT_MAX_DISPERSION_M, RANGE_TOLERANCE_M};
use fdc_core::enums::TacticalMethod;
use fdc_core::errors::{FdcError, FdcResult};
use fdc_core::reference::BallisticPoint;

use crate::interpolate::{self, ChargeGroup, RangeData};

/// The outcome of tactical selection: resolved firing data plus the reason
/// this rule fired.
#[derive(Debug, Clone)]
pub struct Selection {
    pub data: RangeData,
    pub justification: String,
}

/// Select firing data for `range_m` from a (system, round) subset.
///
/// Points within the ±tolerance window of the target range are candidates
/// for direct (uninterpolated) selection per the method's rule; when the
/// window is empty the full interpolation path runs against the viable
/// charge group the method prefers.
pub fn select(
    points: &[BallisticPoint],
    range_m: f64,
    method: TacticalMethod,
    max_dispersion_m: Option<f64>,
) -> FdcResult<Selection> {
    if let Some(point) = interpolate::exact_match(points, range_m) {
        return Ok(Selection {
            data: RangeData::exact(point),
            justification: format!(
                "charted point at exactly {range_m:.0} m, charge {}",
                point.charge
            ),
        });
    }

    let window: Vec<&BallisticPoint> = points
        .iter()
        .filter(|p| (p.range_m - range_m).abs() <= RANGE_TOLERANCE_M)
        .collect();

    if !window.is_empty() {
        if let Some(selection) = select_direct(&window, range_m, method, max_dispersion_m) {
            return Ok(selection);
        }
    }

    interpolated_fallback(points, range_m, method, max_dispersion_m)
}

/// Direct selection among in-window points. Returns None only for
/// `AreaTarget` when every window point also fails the efficiency fallback,
/// which cannot happen with a non-empty window.
fn select_direct(
    window: &[&BallisticPoint],
    range_m: f64,
    method: TacticalMethod,
    max_dispersion_m: Option<f64>,
) -> Option<Selection> {
    let picked: (&BallisticPoint, String) = match method {
        TacticalMethod::Standard => {
            let p = window
                .iter()
                .min_by(|a, b| {
                    (a.range_m - range_m)
                        .abs()
                        .total_cmp(&(b.range_m - range_m).abs())
                })
                .copied()?;
            (
                p,
                format!(
                    "standard: nearest charted point, {:.0} m off target range",
                    (p.range_m - range_m).abs()
                ),
            )
        }
        TacticalMethod::Efficiency => {
            let p = pick_efficient(window, range_m)?;
            (
                p,
                format!(
                    "efficiency: lowest charge ({}) able to cover the window",
                    p.charge
                ),
            )
        }
        TacticalMethod::Speed => {
            let p = window
                .iter()
                .min_by(|a, b| a.time_of_flight.total_cmp(&b.time_of_flight))
                .copied()?;
            (
                p,
                format!(
                    "speed: minimum time of flight {:.1} s, charge {}",
                    p.time_of_flight, p.charge
                ),
            )
        }
        TacticalMethod::HighAngle => {
            let p = window
                .iter()
                .max_by(|a, b| a.elevation_mils.total_cmp(&b.elevation_mils))
                .copied()?;
            (
                p,
                format!(
                    "high angle: maximum elevation {:.0} mils, charge {}",
                    p.elevation_mils, p.charge
                ),
            )
        }
        TacticalMethod::AreaTarget => {
            let ceiling = max_dispersion_m.unwrap_or(DEFAULT_MAX_DISPERSION_M);
            match window
                .iter()
                .filter(|p| p.dispersion_m <= ceiling)
                .max_by(|a, b| a.dispersion_m.total_cmp(&b.dispersion_m))
                .copied()
            {
                Some(p) => (
                    p,
                    format!(
                        "area target: widest dispersion {:.1} m under {:.0} m ceiling",
                        p.dispersion_m, ceiling
                    ),
                ),
                None => {
                    let p = pick_efficient(window, range_m)?;
                    (
                        p,
                        format!(
                            "area target: no point under {:.0} m dispersion ceiling; \
                             fell back to efficiency, charge {}",
                            ceiling, p.charge
                        ),
                    )
                }
            }
        }
    };

    let (point, justification) = picked;
    Some(Selection {
        data: RangeData::exact(point),
        justification,
    })
}

/// Efficiency rule: lowest charge represented in the window, then nearest
/// range within that charge.
fn pick_efficient<'a>(window: &[&'a BallisticPoint], range_m: f64) -> Option<&'a BallisticPoint> {
    let lowest_charge = window.iter().map(|p| p.charge).min()?;
    window
        .iter()
        .filter(|p| p.charge == lowest_charge)
        .min_by(|a, b| {
            (a.range_m - range_m)
                .abs()
                .total_cmp(&(b.range_m - range_m).abs())
        })
        .copied()
}

/// No direct match in the window: interpolate within the viable charge group
/// the method prefers.
fn interpolated_fallback(
    points: &[BallisticPoint],
    range_m: f64,
    method: TacticalMethod,
    max_dispersion_m: Option<f64>,
) -> FdcResult<Selection> {
    let groups = interpolate::charge_groups(points);
    let viable: Vec<&ChargeGroup<'_>> = groups.iter().filter(|g| g.covers(range_m)).collect();

    if viable.is_empty() {
        let (min_m, max_m) = interpolate::subset_bounds(points);
        return Err(FdcError::OutOfRange {
            range_m,
            min_m,
            max_m,
        });
    }

    // Interpolate every viable group once, then rank by the method's metric.
    let mut resolved: Vec<(u8, RangeData)> = Vec::with_capacity(viable.len());
    for &group in &viable {
        resolved.push((group.charge, interpolate::interpolate_in_group(group, range_m)?));
    }

    let (charge, data) = match method {
        TacticalMethod::Standard | TacticalMethod::Efficiency => {
            // Lowest viable charge; for Standard there is no charted point to
            // be "nearest" to, so minimum propellant is the sensible default.
            resolved
                .into_iter()
                .min_by_key(|(charge, _)| *charge)
                .ok_or_else(|| out_of_range(points, range_m))?
        }
        TacticalMethod::Speed => resolved
            .into_iter()
            .min_by(|a, b| a.1.time_of_flight.total_cmp(&b.1.time_of_flight))
            .ok_or_else(|| out_of_range(points, range_m))?,
        TacticalMethod::HighAngle => resolved
            .into_iter()
            .max_by(|a, b| a.1.elevation_mils.total_cmp(&b.1.elevation_mils))
            .ok_or_else(|| out_of_range(points, range_m))?,
        TacticalMethod::AreaTarget => {
            let ceiling = max_dispersion_m.unwrap_or(DEFAULT_MAX_DISPERSION_M);
            let under: Vec<(u8, RangeData)> = resolved
                .iter()
                .filter(|(_, d)| d.dispersion_m <= ceiling)
                .cloned()
                .collect();
            if under.is_empty() {
                // Efficiency fallback.
                resolved
                    .into_iter()
                    .min_by_key(|(charge, _)| *charge)
                    .ok_or_else(|| out_of_range(points, range_m))?
            } else {
                under
                    .into_iter()
                    .max_by(|a, b| a.1.dispersion_m.total_cmp(&b.1.dispersion_m))
                    .ok_or_else(|| out_of_range(points, range_m))?
            }
        }
    };

    Ok(Selection {
        justification: format!(
            "interpolated, no direct match within {RANGE_TOLERANCE_M:.0} m: charge {charge}, {}",
            match data.source {
                fdc_core::enums::SolutionSource::Derivative => "derivative extrapolation",
                _ => "linear interpolation",
            }
        ),
        data,
    })
}

fn out_of_range(points: &[BallisticPoint], range_m: f64) -> FdcError {
    let (min_m, max_m) = interpolate::subset_bounds(points);
    FdcError::OutOfRange {
        range_m,
        min_m,
        max_m,
    }
}
