//! Multi-emitter formation generation and validation.

use serde::{Deserialize, Serialize};

use fdc_core::constants::{
    ARC_FORMATION_WIDTH_MILS, MAX_EMITTER_SPACING_M, MIN_EMITTER_SPACING_M,
};
use fdc_core::enums::{EmitterStatus, FormationKind};
use fdc_core::errors::{FdcError, FdcResult};
use fdc_core::grid::{normalize_mils, GridCoordinate};

/// One emitter placed within a formation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterPosition {
    pub id: u32,
    pub name: String,
    pub position: GridCoordinate,
    /// Bearing from the master emitter to this one, mils (0 for the master).
    pub bearing_offset_mils: f64,
    /// Elevation offset from the master, mils. Flat-grid model: always 0
    /// until a synchronized solution computes per-emitter corrections.
    pub elevation_offset_mils: f64,
    pub status: EmitterStatus,
}

/// A generated formation. Regenerated whenever its parameters change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterFormation {
    pub kind: FormationKind,
    pub spacing_m: f64,
    pub orientation_mils: f64,
    /// Ordered emitters; index 0 is the master at the base position.
    pub emitters: Vec<EmitterPosition>,
    /// Maximum pairwise distance across all emitters, meters.
    pub total_spread_m: f64,
    /// Set when generation degraded (e.g. `Custom` falling back to `Line`).
    pub note: Option<String>,
}

impl EmitterFormation {
    /// The master emitter (index 0).
    pub fn master(&self) -> Option<&EmitterPosition> {
        self.emitters.first()
    }
}

/// Result of formation validation; all violated rules are listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationCheck {
    pub valid: bool,
    pub violations: Vec<String>,
}

/// Generate a formation of `count` emitters around `base`.
///
/// Emitter 1 always sits at the base position; the remaining emitters are
/// placed by the formation kind's geometry.
pub fn build(
    base: &GridCoordinate,
    count: usize,
    kind: FormationKind,
    spacing_m: f64,
    orientation_mils: f64,
) -> FdcResult<EmitterFormation> {
    if count == 0 {
        return Err(FdcError::InvalidFormation {
            violations: vec!["formation has no emitters".to_string()],
        });
    }

    let mut note = None;
    let effective_kind = match kind {
        FormationKind::Custom => {
            tracing::warn!("custom formation layout not implemented, using line");
            note = Some("custom layout not implemented, using line".to_string());
            FormationKind::Line
        }
        other => other,
    };

    let mut emitters = Vec::with_capacity(count);
    emitters.push(emitter(0, base.clone(), 0.0));

    for k in 1..count {
        let (bearing, distance) = match effective_kind {
            FormationKind::Line | FormationKind::Custom => {
                // Along the bearing perpendicular to the orientation.
                (normalize_mils(orientation_mils + 1600.0), spacing_m * k as f64)
            }
            FormationKind::Arc => {
                // Fan across an arc centered on the orientation.
                let others = (count - 1) as f64;
                let offset = -ARC_FORMATION_WIDTH_MILS / 2.0
                    + ARC_FORMATION_WIDTH_MILS * k as f64 / (others + 1.0);
                (normalize_mils(orientation_mils + offset), spacing_m * k as f64)
            }
            FormationKind::Dispersed => {
                // Cycle the four cardinal offsets at increasing multiples.
                let cardinal = 1600.0 * ((k - 1) % 4) as f64;
                let ring = ((k - 1) / 4 + 1) as f64;
                (normalize_mils(orientation_mils + cardinal), spacing_m * ring)
            }
        };
        emitters.push(emitter(k as u32, base.project(bearing, distance), bearing));
    }

    let total_spread_m = total_spread(&emitters);
    Ok(EmitterFormation {
        kind,
        spacing_m,
        orientation_mils,
        emitters,
        total_spread_m,
        note,
    })
}

/// Check a formation against the safety floor, control-span ceiling, and
/// position rules. Returns every violated rule, not just the first.
pub fn validate(formation: &EmitterFormation) -> FormationCheck {
    let mut violations = Vec::new();

    if formation.emitters.is_empty() {
        violations.push("formation has no emitters".to_string());
    }
    if formation.spacing_m < MIN_EMITTER_SPACING_M {
        violations.push(format!(
            "spacing {:.0} m below safety floor {MIN_EMITTER_SPACING_M:.0} m",
            formation.spacing_m
        ));
    }
    if formation.spacing_m > MAX_EMITTER_SPACING_M {
        violations.push(format!(
            "spacing {:.0} m above control-span ceiling {MAX_EMITTER_SPACING_M:.0} m",
            formation.spacing_m
        ));
    }
    for (i, a) in formation.emitters.iter().enumerate() {
        for b in formation.emitters.iter().skip(i + 1) {
            if a.position == b.position {
                violations.push(format!(
                    "duplicate position: {} and {} both at {}",
                    a.name, b.name, a.position
                ));
            }
        }
    }

    FormationCheck {
        valid: violations.is_empty(),
        violations,
    }
}

fn emitter(index: u32, position: GridCoordinate, bearing_offset_mils: f64) -> EmitterPosition {
    EmitterPosition {
        id: index + 1,
        name: format!("Gun {}", index + 1),
        position,
        bearing_offset_mils,
        elevation_offset_mils: 0.0,
        status: EmitterStatus::Ready,
    }
}

fn total_spread(emitters: &[EmitterPosition]) -> f64 {
    let mut max = 0.0f64;
    for (i, a) in emitters.iter().enumerate() {
        for b in emitters.iter().skip(i + 1) {
            max = max.max(a.position.distance_to(&b.position));
        }
    }
    max
}
