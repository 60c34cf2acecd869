//! Engine constants and tuning parameters.

/// Mils in a full circle (NATO angular mil).
pub const MILS_PER_CIRCLE: f64 = 6400.0;

/// Mils in a half circle (back-azimuth offset).
pub const MILS_HALF_CIRCLE: f64 = 3200.0;

// --- Grid ---

/// Size of one grid square along each axis, in meters.
/// Normalized coordinates carry 5 digits per axis.
pub const GRID_SQUARE_SIZE_M: f64 = 100_000.0;

// --- Tactical selection ---

/// Tolerance window for direct (non-interpolated) point selection, in meters.
/// A charted point within this distance of the target range may be fired as-is.
pub const RANGE_TOLERANCE_M: f64 = 50.0;

/// Default dispersion ceiling for area-target selection when the caller
/// does not supply one, in meters.
pub const DEFAULT_MAX_DISPERSION_M: f64 = 100.0;

/// Distance step over which ballistic derivative fields are expressed.
/// `d_elevation_per_100m` means mils of elevation per this many meters.
pub const DERIVATIVE_STEP_M: f64 = 100.0;

// --- Formations ---

/// Minimum spacing between emitters, in meters (safety floor).
pub const MIN_EMITTER_SPACING_M: f64 = 20.0;

/// Maximum spacing between emitters, in meters (span of control ceiling).
pub const MAX_EMITTER_SPACING_M: f64 = 500.0;

/// Width of the arc covered by an arc formation, in mils.
pub const ARC_FORMATION_WIDTH_MILS: f64 = 800.0;

// --- Synchronization ---

/// Elevation correction applied per 100 m of range delta between an emitter
/// and the master, in mils. A linear stand-in for a per-emitter table lookup.
pub const SYNC_ELEVATION_MILS_PER_100M: f64 = 5.0;

// --- Round allocation ---

/// Interval between firing phases in a derived firing sequence, in seconds.
pub const PHASE_INTERVAL_SECS: f64 = 5.0;
