//! Enumeration types used throughout the calculator.

use serde::{Deserialize, Serialize};

/// Ammunition nature category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmunitionCategory {
    /// High-explosive effect rounds.
    #[default]
    HighExplosive,
    /// Smoke / obscurant rounds.
    Smoke,
    /// Illumination rounds.
    Illumination,
    /// Inert practice rounds.
    Practice,
    /// Anything not covered by the other categories.
    Other,
}

/// Method used to select the charge and data point for a solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TacticalMethod {
    /// Nearest charted point within the tolerance window.
    #[default]
    Standard,
    /// Lowest charge able to reach the target (minimum propellant, best accuracy).
    Efficiency,
    /// Minimum time of flight.
    Speed,
    /// Maximum elevation angle (clears intervening crests).
    HighAngle,
    /// Maximum dispersion under a ceiling, for area targets.
    AreaTarget,
}

/// How the values of a firing solution were obtained from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionSource {
    /// A charted point exists at exactly the target range.
    Exact,
    /// Extrapolated from the nearest lower point using its derivative fields.
    Derivative,
    /// Linear interpolation between the bracketing points.
    Linear,
}

impl SolutionSource {
    /// Whether the solution was derived rather than read off the table.
    pub fn is_interpolated(&self) -> bool {
        !matches!(self, SolutionSource::Exact)
    }
}

/// Geometric arrangement of a multi-emitter formation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationKind {
    /// Emitters on a line perpendicular to the orientation bearing.
    #[default]
    Line,
    /// Emitters fanned across an arc centered on the orientation bearing.
    Arc,
    /// Emitters staggered along the four cardinal offsets from orientation.
    Dispersed,
    /// Caller-defined layout. Not implemented; falls back to `Line`.
    Custom,
}

/// How a round budget is split across emitters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionMethod {
    /// Floor division, remainder to the first emitters.
    #[default]
    Equal,
    /// Priority-weighted proportional share, minimum one round each.
    Weighted,
    /// Rank-ordered greedy assignment exhausting the total.
    Priority,
    /// Caller-defined split. Not implemented; falls back to `Equal`.
    Custom,
}

/// Operational status of one emitter in a formation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmitterStatus {
    /// In position and able to fire.
    #[default]
    Ready,
    /// Able to fire with reduced capability.
    Degraded,
    /// Unable to fire.
    OutOfAction,
}
