//! Military grid coordinates and planar geodesy.
//!
//! All spatial math here is planar Euclidean over the grid's native meters;
//! no ellipsoidal earth or true UTM projection is modeled. Bearings are in
//! mils (6400 per circle), measured clockwise from grid north.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::{GRID_SQUARE_SIZE_M, MILS_HALF_CIRCLE, MILS_PER_CIRCLE};
use crate::errors::{FdcError, FdcResult};

/// Latitude-band letters reserved for ambiguity with digits.
const RESERVED_BAND_LETTERS: [char; 2] = ['I', 'O'];

/// The alphanumeric prefix of a full grid reference:
/// zone number, latitude-band letter, and two-letter square designator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDesignator {
    pub zone: u8,
    pub band: char,
    pub square: String,
}

/// A normalized grid coordinate.
///
/// The numeric portion always holds a full 5+5-digit easting/northing pair
/// regardless of the precision of the input (6, 8, or 10 digits); lower
/// precision is left-aligned, i.e. a coarser position, not a scaled one.
/// Constructed on demand from a raw string and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoordinate {
    /// Zone/band/square prefix, when the input carried one.
    pub designator: Option<GridDesignator>,
    /// Easting within the grid square, meters, 0..100_000.
    pub easting: u32,
    /// Northing within the grid square, meters, 0..100_000.
    pub northing: u32,
}

impl GridCoordinate {
    /// Parse and normalize a raw grid string.
    ///
    /// Accepts a bare numeric pair (6, 8, or 10 digits) or a full designator
    /// (zone + band + two-letter square + digits). Whitespace is stripped and
    /// letters are uppercased before parsing.
    pub fn parse(raw: &str) -> FdcResult<Self> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let fail = |reason: &str| FdcError::Format {
            raw: raw.to_string(),
            reason: reason.to_string(),
        };

        if cleaned.is_empty() {
            return Err(fail("empty coordinate"));
        }
        if !cleaned.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(fail("contains characters other than digits and letters"));
        }

        let letters: Vec<(usize, char)> = cleaned
            .char_indices()
            .filter(|(_, c)| c.is_ascii_alphabetic())
            .collect();

        let (designator, digits) = if letters.is_empty() {
            (None, cleaned.as_str())
        } else {
            // Full reference: 1-2 zone digits, band letter, two square letters,
            // then the numeric position.
            if letters.len() != 3 {
                return Err(fail("expected exactly three letters (band + square)"));
            }
            let first = letters[0].0;
            if letters[1].0 != first + 1 || letters[2].0 != first + 2 {
                return Err(fail("band and square letters must be adjacent"));
            }
            let zone_str = &cleaned[..first];
            if zone_str.is_empty() || zone_str.len() > 2 {
                return Err(fail("zone number must be one or two digits"));
            }
            let zone: u8 = zone_str
                .parse()
                .map_err(|_| fail("zone number is not numeric"))?;
            if zone == 0 || zone > 60 {
                return Err(fail("zone number must be 1-60"));
            }
            let band = letters[0].1;
            if RESERVED_BAND_LETTERS.contains(&band) {
                return Err(fail("band letter is reserved"));
            }
            let designator = GridDesignator {
                zone,
                band,
                square: cleaned[first + 1..first + 3].to_string(),
            };
            (Some(designator), &cleaned[first + 3..])
        };

        if digits.is_empty() || digits.chars().any(|c| !c.is_ascii_digit()) {
            return Err(fail("position digits must follow the designator"));
        }
        if digits.len() % 2 != 0 {
            return Err(fail("odd number of position digits"));
        }
        if !matches!(digits.len(), 6 | 8 | 10) {
            return Err(fail("expected 6, 8, or 10 position digits"));
        }

        let half = digits.len() / 2;
        // Right-pad with zeros: lower precision is a coarser position.
        let scale = 10u32.pow(5 - half as u32);
        let easting: u32 = digits[..half].parse().unwrap_or(0) * scale;
        let northing: u32 = digits[half..].parse().unwrap_or(0) * scale;

        Ok(Self {
            designator,
            easting,
            northing,
        })
    }

    /// Planar offset from `self` to `other` as (Δeasting, Δnorthing) meters.
    pub fn offset_to(&self, other: &GridCoordinate) -> DVec2 {
        DVec2::new(
            other.easting as f64 - self.easting as f64,
            other.northing as f64 - self.northing as f64,
        )
    }

    /// Planar Euclidean distance to another coordinate, meters.
    ///
    /// Coordinates declaring different zones still compute: the raw planar
    /// difference is used, with a precision warning logged.
    pub fn distance_to(&self, other: &GridCoordinate) -> f64 {
        if let (Some(a), Some(b)) = (&self.designator, &other.designator) {
            if a.zone != b.zone {
                tracing::warn!(
                    from = %self,
                    to = %other,
                    "coordinates lie in different grid zones; planar distance is degraded"
                );
            }
        }
        self.offset_to(other).length()
    }

    /// Bearing to another coordinate in mils, clockwise from grid north,
    /// normalized to `[0, 6400)`. The bearing of a coordinate to itself is 0.
    pub fn bearing_to(&self, other: &GridCoordinate) -> f64 {
        let d = self.offset_to(other);
        radians_to_mils(d.x.atan2(d.y)).rem_euclid(MILS_PER_CIRCLE)
    }

    /// Coordinate offset from `self` by a polar vector (bearing in mils,
    /// distance in meters). The result keeps this coordinate's designator;
    /// easting/northing wrap within the 100 km square.
    pub fn project(&self, bearing_mils: f64, distance_m: f64) -> GridCoordinate {
        let rad = mils_to_radians(bearing_mils);
        let easting = (self.easting as f64 + distance_m * rad.sin())
            .round()
            .rem_euclid(GRID_SQUARE_SIZE_M) as u32;
        let northing = (self.northing as f64 + distance_m * rad.cos())
            .round()
            .rem_euclid(GRID_SQUARE_SIZE_M) as u32;
        GridCoordinate {
            designator: self.designator.clone(),
            easting,
            northing,
        }
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(d) = &self.designator {
            write!(f, "{}{}{}", d.zone, d.band, d.square)?;
        }
        write!(f, "{:05}{:05}", self.easting, self.northing)
    }
}

/// Back azimuth: the bearing 3200 mils opposite the given one.
pub fn reciprocal(bearing_mils: f64) -> f64 {
    (bearing_mils + MILS_HALF_CIRCLE).rem_euclid(MILS_PER_CIRCLE)
}

/// Signed angular difference `to - from` in mils, in `(-3200, 3200]`.
pub fn signed_delta_mils(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(MILS_PER_CIRCLE);
    if d > MILS_HALF_CIRCLE {
        d - MILS_PER_CIRCLE
    } else {
        d
    }
}

/// Normalize an angle into `[0, 6400)` mils.
pub fn normalize_mils(mils: f64) -> f64 {
    mils.rem_euclid(MILS_PER_CIRCLE)
}

/// Convert degrees to mils (6400 mils = 360 degrees).
pub fn degrees_to_mils(degrees: f64) -> f64 {
    degrees * MILS_PER_CIRCLE / 360.0
}

/// Convert mils to degrees.
pub fn mils_to_degrees(mils: f64) -> f64 {
    mils * 360.0 / MILS_PER_CIRCLE
}

/// Convert mils to radians.
pub fn mils_to_radians(mils: f64) -> f64 {
    mils * std::f64::consts::TAU / MILS_PER_CIRCLE
}

/// Convert radians to mils.
pub fn radians_to_mils(radians: f64) -> f64 {
    radians * MILS_PER_CIRCLE / std::f64::consts::TAU
}
