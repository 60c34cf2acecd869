//! Range interpolation over charted ballistic points.
//!
//! Preference order: exact charted match, derivative-based extrapolation
//! from the nearest lower point, straight linear interpolation between the
//! bracketing points. Dispersion has no charted derivative and is always
//! interpolated linearly.

use fdc_core::constants::DERIVATIVE_STEP_M;
use fdc_core::enums::SolutionSource;
use fdc_core::errors::{FdcError, FdcResult};
use fdc_core::reference::BallisticPoint;

/// Firing data resolved at one range, before tactical packaging.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeData {
    pub charge: u8,
    /// Elevation angle, rounded to the nearest whole mil.
    pub elevation_mils: f64,
    /// Time of flight, rounded to one decimal.
    pub time_of_flight: f64,
    /// Mean dispersion, rounded to one decimal.
    pub dispersion_m: f64,
    pub source: SolutionSource,
}

impl RangeData {
    /// Read a charted point verbatim.
    pub fn exact(point: &BallisticPoint) -> Self {
        Self {
            charge: point.charge,
            elevation_mils: point.elevation_mils.round(),
            time_of_flight: round1(point.time_of_flight),
            dispersion_m: round1(point.dispersion_m),
            source: SolutionSource::Exact,
        }
    }
}

/// The points of one propellant charge level, sorted by range.
#[derive(Debug)]
pub struct ChargeGroup<'a> {
    pub charge: u8,
    pub points: Vec<&'a BallisticPoint>,
}

impl<'a> ChargeGroup<'a> {
    pub fn min_range(&self) -> f64 {
        self.points.first().map_or(f64::INFINITY, |p| p.range_m)
    }

    pub fn max_range(&self) -> f64 {
        self.points.last().map_or(f64::NEG_INFINITY, |p| p.range_m)
    }

    /// A charge is viable for a range that lies within its charted span.
    pub fn covers(&self, range_m: f64) -> bool {
        range_m >= self.min_range() && range_m <= self.max_range()
    }

    /// Nearest charted points below/at and above/at the given range.
    /// Only meaningful when `covers(range_m)`.
    fn bracket(&self, range_m: f64) -> Option<(&'a BallisticPoint, &'a BallisticPoint)> {
        let lower = self
            .points
            .iter()
            .rev()
            .find(|p| p.range_m <= range_m)
            .copied()?;
        let upper = self
            .points
            .iter()
            .find(|p| p.range_m >= range_m)
            .copied()?;
        Some((lower, upper))
    }
}

/// Group a (system, round) subset by charge level, preserving range order.
/// The input is expected sorted by (charge, range), as the table stores it.
pub fn charge_groups(points: &[BallisticPoint]) -> Vec<ChargeGroup<'_>> {
    let mut groups: Vec<ChargeGroup<'_>> = Vec::new();
    for point in points {
        match groups.last_mut() {
            Some(group) if group.charge == point.charge => group.points.push(point),
            _ => groups.push(ChargeGroup {
                charge: point.charge,
                points: vec![point],
            }),
        }
    }
    groups
}

/// Find a charted point at exactly the target range, any charge.
pub fn exact_match(points: &[BallisticPoint], range_m: f64) -> Option<&BallisticPoint> {
    points.iter().find(|p| p.range_m == range_m)
}

/// Resolve firing data at `range_m` within one viable charge group.
///
/// Elevation and time of flight each use the lower point's derivative field
/// when charted, falling back to linear interpolation between the brackets.
pub fn interpolate_in_group(group: &ChargeGroup<'_>, range_m: f64) -> FdcResult<RangeData> {
    let (lower, upper) = group.bracket(range_m).ok_or(FdcError::OutOfRange {
        range_m,
        min_m: group.min_range(),
        max_m: group.max_range(),
    })?;

    if lower.range_m == range_m {
        return Ok(RangeData::exact(lower));
    }

    let step = (range_m - lower.range_m) / DERIVATIVE_STEP_M;
    let mut used_derivative = false;

    let elevation = match lower.d_elevation_per_100m {
        Some(d) => {
            used_derivative = true;
            lower.elevation_mils + d * step
        }
        None => lerp(
            lower.range_m,
            lower.elevation_mils,
            upper.range_m,
            upper.elevation_mils,
            range_m,
        ),
    };

    let time_of_flight = match lower.d_time_per_100m {
        Some(d) => {
            used_derivative = true;
            lower.time_of_flight + d * step
        }
        None => lerp(
            lower.range_m,
            lower.time_of_flight,
            upper.range_m,
            upper.time_of_flight,
            range_m,
        ),
    };

    // No derivative data is charted for dispersion.
    let dispersion = lerp(
        lower.range_m,
        lower.dispersion_m,
        upper.range_m,
        upper.dispersion_m,
        range_m,
    );

    Ok(RangeData {
        charge: group.charge,
        elevation_mils: elevation.round(),
        time_of_flight: round1(time_of_flight),
        dispersion_m: round1(dispersion),
        source: if used_derivative {
            SolutionSource::Derivative
        } else {
            SolutionSource::Linear
        },
    })
}

/// Overall charted bounds across a subset, for out-of-range reporting.
pub fn subset_bounds(points: &[BallisticPoint]) -> (f64, f64) {
    let min = points.iter().map(|p| p.range_m).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|p| p.range_m)
        .fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

fn lerp(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
