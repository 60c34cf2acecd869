//! The caller-owned fire-direction engine facade.
//!
//! Holds immutable reference data and a shared ballistic table snapshot,
//! injected at construction — no process-wide singletons. Every query is
//! stateless; callers may share one engine across threads as long as the
//! table snapshot is replaced wholesale, never edited.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use fdc_core::enums::{DistributionMethod, FormationKind, SolutionSource, TacticalMethod};
use fdc_core::errors::{FdcError, FdcResult};
use fdc_core::grid::GridCoordinate;
use fdc_core::reference::{Ammunition, BallisticPoint, WeaponSystem};

use crate::adjustment::{self, AdjustedFiringSolution, ObserverCorrection};
use crate::allocation::{self, RoundAllocation};
use crate::formation::{self, EmitterFormation, FormationCheck};
use crate::sync::{self, SynchronizedSolution};
use crate::table::BallisticTable;
use crate::tactical;

/// Caller-tunable options for a solve.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Dispersion ceiling for area-target selection, meters.
    pub max_dispersion_m: Option<f64>,
}

/// A complete firing solution for one weapon against one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiringSolution {
    /// Azimuth to the target, mils.
    pub bearing_mils: f64,
    /// Elevation angle, whole mils.
    pub elevation_mils: f64,
    /// Propellant charge level to set.
    pub charge: u8,
    /// Expected time of flight, seconds.
    pub time_of_flight: f64,
    /// Target range, meters.
    pub range_m: f64,
    /// Expected mean dispersion at the target, meters.
    pub dispersion_m: f64,
    /// Whether the values were read exactly or derived.
    pub source: SolutionSource,
    /// Which selection rule fired and why.
    pub justification: String,
}

/// The fire-direction calculation engine.
pub struct FireDirectionEngine {
    systems: HashMap<String, WeaponSystem>,
    rounds: HashMap<String, Ammunition>,
    table: Arc<BallisticTable>,
}

impl FireDirectionEngine {
    pub fn new(
        systems: Vec<WeaponSystem>,
        rounds: Vec<Ammunition>,
        table: Arc<BallisticTable>,
    ) -> Self {
        Self {
            systems: systems.into_iter().map(|s| (s.id.clone(), s)).collect(),
            rounds: rounds.into_iter().map(|r| (r.id.clone(), r)).collect(),
            table,
        }
    }

    /// The current table snapshot.
    pub fn table(&self) -> &Arc<BallisticTable> {
        &self.table
    }

    /// Swap in a freshly loaded table snapshot. In-flight queries on other
    /// threads keep the old snapshot alive through their own `Arc`.
    pub fn replace_table(&mut self, table: Arc<BallisticTable>) {
        self.table = table;
    }

    /// Compute a firing solution from `observer` (the firing position) to
    /// `target`.
    pub fn solve(
        &self,
        observer: &GridCoordinate,
        target: &GridCoordinate,
        system_id: &str,
        round_id: &str,
        method: TacticalMethod,
        options: SolveOptions,
    ) -> FdcResult<FiringSolution> {
        let points = self.subset(system_id, round_id)?;
        let range_m = observer.distance_to(target);
        let bearing_mils = observer.bearing_to(target);

        let selection = tactical::select(points, range_m, method, options.max_dispersion_m)?;
        tracing::debug!(
            system = system_id,
            round = round_id,
            ?method,
            range_m,
            bearing_mils,
            source = ?selection.data.source,
            "solved fire mission"
        );

        Ok(FiringSolution {
            bearing_mils,
            elevation_mils: selection.data.elevation_mils,
            charge: selection.data.charge,
            time_of_flight: selection.data.time_of_flight,
            range_m,
            dispersion_m: selection.data.dispersion_m,
            source: selection.data.source,
            justification: selection.justification,
        })
    }

    /// Recompute a solution after an observer-relative correction.
    ///
    /// The observer shifts the target; the firing position stays put and the
    /// solution is re-solved against the adjusted target.
    #[allow(clippy::too_many_arguments)]
    pub fn solve_with_adjustment(
        &self,
        observer: &GridCoordinate,
        firing_position: &GridCoordinate,
        target: &GridCoordinate,
        system_id: &str,
        round_id: &str,
        correction: ObserverCorrection,
        method: TacticalMethod,
        options: SolveOptions,
    ) -> FdcResult<AdjustedFiringSolution> {
        let (adjusted_target, observer_target_bearing_mils) =
            adjustment::adjust_target(observer, target, &correction)?;
        let solution = self.solve(
            firing_position,
            &adjusted_target,
            system_id,
            round_id,
            method,
            options,
        )?;
        Ok(AdjustedFiringSolution {
            solution,
            adjusted_target,
            original_target: target.clone(),
            correction,
            observer_target_bearing_mils,
        })
    }

    /// Overall (min, max) charted range for a pairing, meters.
    pub fn range_capability(&self, system_id: &str, round_id: &str) -> FdcResult<(f64, f64)> {
        self.check_ids(system_id, round_id)?;
        self.table
            .range_bounds(system_id, round_id)
            .ok_or(FdcError::UnknownReference {
                kind: "table pairing",
                id: format!("{system_id}/{round_id}"),
            })
    }

    /// Whether some charge covers the given range for this pairing.
    pub fn is_range_supported(
        &self,
        system_id: &str,
        round_id: &str,
        range_m: f64,
    ) -> FdcResult<bool> {
        let points = self.subset(system_id, round_id)?;
        Ok(crate::interpolate::charge_groups(points)
            .iter()
            .any(|g| g.covers(range_m)))
    }

    /// Derive a formation of emitter positions from a base position.
    pub fn build_formation(
        &self,
        base: &GridCoordinate,
        count: usize,
        kind: FormationKind,
        spacing_m: f64,
        orientation_mils: f64,
    ) -> FdcResult<EmitterFormation> {
        formation::build(base, count, kind, spacing_m, orientation_mils)
    }

    /// Check a formation against the safety and control-span rules.
    pub fn validate_formation(&self, formation: &EmitterFormation) -> FormationCheck {
        formation::validate(formation)
    }

    /// Synchronize a formation onto one target around a master solution.
    pub fn synchronize(
        &self,
        formation: &EmitterFormation,
        target: &GridCoordinate,
        master: &FiringSolution,
        simultaneous: bool,
    ) -> FdcResult<SynchronizedSolution> {
        sync::synchronize(formation, target, master, simultaneous)
    }

    /// Distribute a round budget across emitters and derive a firing sequence.
    pub fn allocate_rounds(
        &self,
        emitter_count: usize,
        total_rounds: u32,
        method: DistributionMethod,
        priorities: Option<&[u32]>,
    ) -> FdcResult<RoundAllocation> {
        allocation::allocate(emitter_count, total_rounds, method, priorities)
    }

    fn subset(&self, system_id: &str, round_id: &str) -> FdcResult<&[BallisticPoint]> {
        self.check_ids(system_id, round_id)?;
        self.table
            .points_for(system_id, round_id)
            .ok_or(FdcError::UnknownReference {
                kind: "table pairing",
                id: format!("{system_id}/{round_id}"),
            })
    }

    fn check_ids(&self, system_id: &str, round_id: &str) -> FdcResult<()> {
        if !self.systems.contains_key(system_id) {
            return Err(FdcError::UnknownReference {
                kind: "weapon system",
                id: system_id.to_string(),
            });
        }
        if !self.rounds.contains_key(round_id) {
            return Err(FdcError::UnknownReference {
                kind: "ammunition",
                id: round_id.to_string(),
            });
        }
        Ok(())
    }
}
