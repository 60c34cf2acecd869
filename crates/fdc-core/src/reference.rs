//! Reference data records supplied by the surrounding data-loading layer.
//!
//! The engine never parses source files; it consumes these fully formed,
//! treats them as immutable, and holds them for the lifetime of a table
//! snapshot.

use serde::{Deserialize, Serialize};

use crate::enums::AmmunitionCategory;

/// A weapon system (howitzer, mortar, gun) the table carries data for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSystem {
    pub id: String,
    pub name: String,
    pub caliber_mm: f64,
    pub nation: Option<String>,
}

/// An ammunition nature fired by one or more weapon systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ammunition {
    pub id: String,
    pub name: String,
    pub category: AmmunitionCategory,
    pub caliber_mm: f64,
}

/// One empirically measured ballistic data point.
///
/// Within a single (system, round, charge) group, points are distinct by
/// range and assumed monotonic in elevation vs. range; neither property is
/// enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallisticPoint {
    pub system_id: String,
    pub round_id: String,
    /// Propellant charge level (discrete setting, higher reaches farther).
    pub charge: u8,
    /// Charted range, meters.
    pub range_m: f64,
    /// Elevation angle, mils.
    pub elevation_mils: f64,
    /// Time of flight, seconds.
    pub time_of_flight: f64,
    /// Mean radial dispersion at this range, meters.
    pub dispersion_m: f64,
    /// Change in elevation per 100 m of range, mils, when charted.
    pub d_elevation_per_100m: Option<f64>,
    /// Change in time of flight per 100 m of range, seconds, when charted.
    pub d_time_per_100m: Option<f64>,
}
