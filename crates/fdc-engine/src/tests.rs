//! Tests for the table, interpolation, tactical selection, adjustment,
//! and multi-emitter pipeline.

use std::sync::Arc;

use fdc_core::enums::*;
use fdc_core::errors::FdcError;
use fdc_core::grid::GridCoordinate;
use fdc_core::reference::{Ammunition, BallisticPoint, WeaponSystem};

use crate::adjustment::ObserverCorrection;
use crate::engine::{FireDirectionEngine, SolveOptions};
use crate::interpolate;
use crate::table::BallisticTable;
use crate::{allocation, formation, sync, tactical};

// ---- Fixtures ----

fn point(charge: u8, range_m: f64, elevation: f64, tof: f64, dispersion: f64) -> BallisticPoint {
    BallisticPoint {
        system_id: "m119".to_string(),
        round_id: "he".to_string(),
        charge,
        range_m,
        elevation_mils: elevation,
        time_of_flight: tof,
        dispersion_m: dispersion,
        d_elevation_per_100m: None,
        d_time_per_100m: None,
    }
}

fn point_with_derivatives(
    charge: u8,
    range_m: f64,
    elevation: f64,
    tof: f64,
    dispersion: f64,
    d_elevation: f64,
    d_tof: f64,
) -> BallisticPoint {
    BallisticPoint {
        d_elevation_per_100m: Some(d_elevation),
        d_time_per_100m: Some(d_tof),
        ..point(charge, range_m, elevation, tof, dispersion)
    }
}

fn fixture_points() -> Vec<BallisticPoint> {
    vec![
        // Charge 1: the short bracket from the linear-midpoint scenario.
        point(1, 100.0, 1500.0, 10.0, 20.0),
        point(1, 300.0, 1400.0, 12.0, 25.0),
        // Charge 2: mid-range, no derivatives.
        point(2, 4000.0, 1100.0, 14.0, 30.0),
        point(2, 4500.0, 1050.0, 15.0, 32.0),
        point(2, 5000.0, 1000.0, 16.0, 35.0),
        // Charge 3: overlaps charge 2, derivative data on the 4000 m point.
        point_with_derivatives(3, 4000.0, 1150.0, 13.0, 40.0, -10.0, 0.5),
        point(3, 5000.0, 1030.0, 15.5, 45.0),
        point(3, 6000.0, 950.0, 17.0, 50.0),
        // Charge 5: long range.
        point(5, 9000.0, 700.0, 24.0, 60.0),
        point(5, 10000.0, 650.0, 26.0, 70.0),
        point(5, 11000.0, 600.0, 28.0, 80.0),
    ]
}

fn engine() -> FireDirectionEngine {
    let systems = vec![WeaponSystem {
        id: "m119".to_string(),
        name: "M119 105mm".to_string(),
        caliber_mm: 105.0,
        nation: Some("US".to_string()),
    }];
    let rounds = vec![Ammunition {
        id: "he".to_string(),
        name: "HE M1".to_string(),
        category: AmmunitionCategory::HighExplosive,
        caliber_mm: 105.0,
    }];
    FireDirectionEngine::new(systems, rounds, Arc::new(BallisticTable::new(fixture_points())))
}

fn grid(raw: &str) -> GridCoordinate {
    GridCoordinate::parse(raw).unwrap()
}

/// Observer/firing position used across solve tests: easting 10000, northing 10000.
fn base() -> GridCoordinate {
    grid("1000010000")
}

/// A target due north of `base` at the given range.
fn target_north(range_m: u32) -> GridCoordinate {
    GridCoordinate {
        designator: None,
        easting: 10_000,
        northing: 10_000 + range_m,
    }
}

// ---- Table ----

#[test]
fn test_table_indexes_and_sorts_pairs() {
    let table = BallisticTable::new(fixture_points());
    assert_eq!(table.pair_count(), 1);
    let points = table.points_for("m119", "he").unwrap();
    assert_eq!(points.len(), 11);
    // Sorted by (charge, range).
    for pair in points.windows(2) {
        assert!(
            pair[0].charge < pair[1].charge
                || (pair[0].charge == pair[1].charge && pair[0].range_m < pair[1].range_m)
        );
    }
    assert_eq!(table.range_bounds("m119", "he"), Some((100.0, 11_000.0)));
    assert!(table.points_for("m109", "he").is_none());
}

// ---- Interpolation ----

#[test]
fn test_exact_match_returns_point_verbatim() {
    let solution = engine()
        .solve(
            &base(),
            &target_north(6000),
            "m119",
            "he",
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap();
    assert_eq!(solution.source, SolutionSource::Exact);
    assert_eq!(solution.elevation_mils, 950.0);
    assert_eq!(solution.time_of_flight, 17.0);
    assert_eq!(solution.dispersion_m, 50.0);
    assert_eq!(solution.charge, 3);
    assert_eq!(solution.bearing_mils, 0.0);
    assert!((solution.range_m - 6000.0).abs() < 1e-9);
}

#[test]
fn test_linear_midpoint() {
    // Points at 100 m (1500 mils) and 300 m (1400 mils), no derivatives:
    // 200 m must resolve to the linear midpoint.
    let solution = engine()
        .solve(
            &base(),
            &target_north(200),
            "m119",
            "he",
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap();
    assert_eq!(solution.source, SolutionSource::Linear);
    assert_eq!(solution.elevation_mils, 1450.0);
    assert_eq!(solution.time_of_flight, 11.0);
    assert_eq!(solution.dispersion_m, 22.5);
    assert_eq!(solution.charge, 1);
}

#[test]
fn test_derivative_extrapolation() {
    // 4200 m, charge 3's lower point carries derivatives:
    // elevation 1150 - 10*2, TOF 13 + 0.5*2.
    let points = fixture_points();
    let groups = interpolate::charge_groups(&points);
    let charge3 = groups.iter().find(|g| g.charge == 3).unwrap();
    let data = interpolate::interpolate_in_group(charge3, 4200.0).unwrap();
    assert_eq!(data.source, SolutionSource::Derivative);
    assert_eq!(data.elevation_mils, 1130.0);
    assert_eq!(data.time_of_flight, 14.0);
    // Dispersion always interpolates linearly: 40 + (45-40)*0.2.
    assert_eq!(data.dispersion_m, 41.0);
}

#[test]
fn test_out_of_range_reports_bounds() {
    let err = engine()
        .solve(
            &base(),
            &target_north(1000),
            "m119",
            "he",
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap_err();
    match err {
        FdcError::OutOfRange {
            range_m,
            min_m,
            max_m,
        } => {
            assert!((range_m - 1000.0).abs() < 1e-9);
            assert_eq!(min_m, 100.0);
            assert_eq!(max_m, 11_000.0);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}

// ---- Tactical selection ----

#[test]
fn test_standard_picks_nearest_in_window() {
    let points = fixture_points();
    let selection =
        tactical::select(&points, 4030.0, TacticalMethod::Standard, None).unwrap();
    assert_eq!(selection.data.source, SolutionSource::Exact);
    assert_eq!(selection.data.elevation_mils, 1100.0);
    assert!(selection.justification.contains("standard"));
}

#[test]
fn test_efficiency_never_exceeds_lowest_viable_charge() {
    // Charges 2 and 3 both have a point 30 m from the target range.
    let points = fixture_points();
    let selection =
        tactical::select(&points, 4030.0, TacticalMethod::Efficiency, None).unwrap();
    assert_eq!(selection.data.charge, 2);
    assert!(selection.justification.contains("efficiency"));
}

#[test]
fn test_speed_picks_minimum_time_of_flight() {
    let points = fixture_points();
    let selection = tactical::select(&points, 4030.0, TacticalMethod::Speed, None).unwrap();
    // Charge 3 at 4000 m flies 13.0 s vs charge 2's 14.0 s.
    assert_eq!(selection.data.charge, 3);
    assert_eq!(selection.data.time_of_flight, 13.0);
}

#[test]
fn test_high_angle_picks_maximum_elevation() {
    let points = fixture_points();
    let selection =
        tactical::select(&points, 4030.0, TacticalMethod::HighAngle, None).unwrap();
    assert_eq!(selection.data.charge, 3);
    assert_eq!(selection.data.elevation_mils, 1150.0);
}

#[test]
fn test_area_target_respects_ceiling() {
    let points = fixture_points();
    // Ceiling 45: both 30 m and 40 m qualify, widest wins.
    let wide = tactical::select(&points, 4030.0, TacticalMethod::AreaTarget, Some(45.0)).unwrap();
    assert_eq!(wide.data.dispersion_m, 40.0);

    // Ceiling 35: only charge 2's 30 m qualifies.
    let narrow =
        tactical::select(&points, 4030.0, TacticalMethod::AreaTarget, Some(35.0)).unwrap();
    assert_eq!(narrow.data.dispersion_m, 30.0);
}

#[test]
fn test_area_target_falls_back_to_efficiency() {
    let points = fixture_points();
    let selection =
        tactical::select(&points, 4030.0, TacticalMethod::AreaTarget, Some(10.0)).unwrap();
    assert_eq!(selection.data.charge, 2);
    assert!(selection.justification.contains("fell back to efficiency"));
}

#[test]
fn test_no_window_match_interpolates_with_justification() {
    let points = fixture_points();
    // 4200 m is 200 m from the nearest charted point.
    let selection =
        tactical::select(&points, 4200.0, TacticalMethod::Efficiency, None).unwrap();
    assert_eq!(selection.data.charge, 2);
    assert_eq!(selection.data.source, SolutionSource::Linear);
    assert!(selection.justification.contains("no direct match"));
}

#[test]
fn test_speed_interpolated_prefers_derivative_group() {
    let points = fixture_points();
    // Charge 2 interpolates to 14.4 s, charge 3 extrapolates to 14.0 s.
    let selection = tactical::select(&points, 4200.0, TacticalMethod::Speed, None).unwrap();
    assert_eq!(selection.data.charge, 3);
    assert_eq!(selection.data.source, SolutionSource::Derivative);
    assert_eq!(selection.data.time_of_flight, 14.0);
}

// ---- Engine facade ----

#[test]
fn test_unknown_ids_rejected() {
    let engine = engine();
    let err = engine
        .solve(
            &base(),
            &target_north(6000),
            "m109",
            "he",
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        FdcError::UnknownReference {
            kind: "weapon system",
            ..
        }
    ));

    let err = engine
        .solve(
            &base(),
            &target_north(6000),
            "m119",
            "illum",
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        FdcError::UnknownReference {
            kind: "ammunition",
            ..
        }
    ));
}

#[test]
fn test_range_capability_and_support() {
    let engine = engine();
    assert_eq!(engine.range_capability("m119", "he").unwrap(), (100.0, 11_000.0));
    assert!(engine.is_range_supported("m119", "he", 200.0).unwrap());
    assert!(engine.is_range_supported("m119", "he", 4500.0).unwrap());
    // In the gap between charge 1 and charge 2.
    assert!(!engine.is_range_supported("m119", "he", 2000.0).unwrap());
    assert!(!engine.is_range_supported("m119", "he", 12_000.0).unwrap());
}

#[test]
fn test_replace_table_swaps_snapshot() {
    let mut engine = engine();
    let refreshed = vec![point(1, 500.0, 1300.0, 9.0, 15.0)];
    engine.replace_table(Arc::new(BallisticTable::new(refreshed)));
    assert_eq!(engine.range_capability("m119", "he").unwrap(), (500.0, 500.0));
}

#[test]
fn test_solution_serde_round_trip() {
    let solution = engine()
        .solve(
            &base(),
            &target_north(6000),
            "m119",
            "he",
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap();
    let json = serde_json::to_string(&solution).unwrap();
    let back: crate::engine::FiringSolution = serde_json::from_str(&json).unwrap();
    assert_eq!(back.elevation_mils, solution.elevation_mils);
    assert_eq!(back.source, solution.source);
}

// ---- Observer adjustment ----

#[test]
fn test_adjustment_rotates_bearing_at_unchanged_distance() {
    // Observer at 1000010000, target 1000020000: 10 000 m due north.
    // +1600 mils deflection at +0 range must swing the target due east.
    let engine = engine();
    let observer = grid("1000010000");
    let target = grid("1000020000");

    let adjusted = engine
        .solve_with_adjustment(
            &observer,
            &observer,
            &target,
            "m119",
            "he",
            ObserverCorrection {
                range_m: 0.0,
                deflection_mils: 1600.0,
            },
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap();

    assert_eq!(adjusted.observer_target_bearing_mils, 0.0);
    assert_eq!(adjusted.adjusted_target.easting, 20_000);
    assert_eq!(adjusted.adjusted_target.northing, 10_000);
    assert!((observer.bearing_to(&adjusted.adjusted_target) - 1600.0).abs() < 1e-9);
    assert!((observer.distance_to(&adjusted.adjusted_target) - 10_000.0).abs() < 1e-9);

    // Solved from the unchanged firing position against the new target:
    // exactly the 10 000 m charted point.
    assert_eq!(adjusted.solution.source, SolutionSource::Exact);
    assert_eq!(adjusted.solution.elevation_mils, 650.0);
    assert_eq!(adjusted.solution.charge, 5);
    assert_eq!(adjusted.original_target, target);
}

#[test]
fn test_adjustment_rejects_negative_distance() {
    let engine = engine();
    let observer = grid("1000010000");
    let target = grid("1000020000");
    let err = engine
        .solve_with_adjustment(
            &observer,
            &observer,
            &target,
            "m119",
            "he",
            ObserverCorrection {
                range_m: -20_000.0,
                deflection_mils: 0.0,
            },
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, FdcError::InvalidAdjustment { .. }));
}

// ---- Formations ----

#[test]
fn test_line_formation_geometry() {
    let base = base();
    let f = formation::build(&base, 3, FormationKind::Line, 50.0, 0.0).unwrap();
    assert_eq!(f.emitters.len(), 3);
    assert_eq!(f.emitters[0].position, base);
    // Perpendicular to orientation 0: due east at 50 and 100 m.
    assert_eq!(f.emitters[1].position.easting, 10_050);
    assert_eq!(f.emitters[1].position.northing, 10_000);
    assert_eq!(f.emitters[2].position.easting, 10_100);
    assert_eq!(f.emitters[2].position.northing, 10_000);
    // Spread equals the distance between the two outermost emitters.
    assert!((f.total_spread_m - 100.0).abs() < 1e-9);
    assert!(f.note.is_none());
}

#[test]
fn test_arc_formation_stays_within_arc() {
    let base = base();
    let f = formation::build(&base, 4, FormationKind::Arc, 100.0, 0.0).unwrap();
    assert_eq!(f.emitters.len(), 4);
    assert_eq!(f.emitters[0].position, base);
    for emitter in &f.emitters[1..] {
        // Offsets stay inside the 800 mil arc: bearings in (5 600, 6 400)
        // or [0, 400) around orientation 0.
        let bearing = emitter.bearing_offset_mils;
        assert!(
            bearing < 400.0 || bearing > 6000.0,
            "bearing {bearing} outside the arc"
        );
    }
    assert!(f.total_spread_m > 0.0);
}

#[test]
fn test_dispersed_formation_cycles_cardinals() {
    let base = base();
    let f = formation::build(&base, 5, FormationKind::Dispersed, 100.0, 0.0).unwrap();
    assert_eq!(f.emitters.len(), 5);
    // First ring: N, E, S, W of the base at one spacing.
    assert_eq!(f.emitters[1].position.northing, 10_100);
    assert_eq!(f.emitters[2].position.easting, 10_100);
    assert_eq!(f.emitters[3].position.northing, 9_900);
    assert_eq!(f.emitters[4].position.easting, 9_900);
}

#[test]
fn test_custom_formation_falls_back_to_line_with_note() {
    let base = base();
    let f = formation::build(&base, 2, FormationKind::Custom, 50.0, 0.0).unwrap();
    assert_eq!(f.kind, FormationKind::Custom);
    assert_eq!(f.emitters[1].position.easting, 10_050);
    assert!(f.note.as_deref().unwrap().contains("not implemented"));
}

#[test]
fn test_zero_emitters_rejected() {
    let err = formation::build(&base(), 0, FormationKind::Line, 50.0, 0.0).unwrap_err();
    assert!(matches!(err, FdcError::InvalidFormation { .. }));
}

#[test]
fn test_validation_reports_all_violations() {
    // Spacing 0 places every emitter on the base: below the safety floor
    // and duplicated positions, in one report.
    let f = formation::build(&base(), 2, FormationKind::Line, 0.0, 0.0).unwrap();
    let check = formation::validate(&f);
    assert!(!check.valid);
    assert!(check.violations.iter().any(|v| v.contains("safety floor")));
    assert!(check.violations.iter().any(|v| v.contains("duplicate position")));
}

#[test]
fn test_validation_control_span_ceiling() {
    let f = formation::build(&base(), 2, FormationKind::Line, 800.0, 0.0).unwrap();
    let check = formation::validate(&f);
    assert!(!check.valid);
    assert!(check.violations.iter().any(|v| v.contains("control-span")));
    assert_eq!(check.violations.len(), 1);
}

#[test]
fn test_valid_formation_passes() {
    let f = formation::build(&base(), 3, FormationKind::Line, 50.0, 0.0).unwrap();
    let check = formation::validate(&f);
    assert!(check.valid);
    assert!(check.violations.is_empty());
}

// ---- Synchronization ----

#[test]
fn test_synchronize_simultaneous_impact() {
    let engine = engine();
    let base = base();
    let target = target_north(10_000);
    let f = formation::build(&base, 2, FormationKind::Line, 100.0, 0.0).unwrap();
    let master = engine
        .solve(
            &base,
            &target,
            "m119",
            "he",
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap();

    let synced = engine.synchronize(&f, &target, &master, true).unwrap();
    assert_eq!(synced.emitters.len(), 2);

    let master_e = &synced.emitters[0];
    let gun2 = &synced.emitters[1];
    assert_eq!(master_e.bearing_correction_mils, 0.0);
    assert_eq!(master_e.elevation_correction_mils, 0.0);

    // Gun 2 sits 100 m east: slightly longer range, aimed slightly left.
    assert!(gun2.range_m > master_e.range_m);
    assert!(gun2.bearing_correction_mils < 0.0);
    assert!(gun2.elevation_correction_mils < 0.0);

    // Simultaneous impact: the slowest emitter fires immediately, the
    // faster one holds for the TOF difference.
    assert_eq!(gun2.delay_secs, 0.0);
    assert!(master_e.delay_secs > 0.0);
    let expected_hold = gun2.time_of_flight - master_e.time_of_flight;
    assert!((master_e.delay_secs - expected_hold).abs() < 1e-9);

    // Coarse pattern: depth from the range fan, centered on the target.
    assert!((synced.pattern.depth_m - (gun2.range_m - master_e.range_m)).abs() < 1e-9);
    assert!(synced.pattern.width_m > 0.0);
    assert_eq!(synced.pattern.center, target);
}

#[test]
fn test_synchronize_staggered_has_no_delays() {
    let engine = engine();
    let base = base();
    let target = target_north(10_000);
    let f = formation::build(&base, 3, FormationKind::Line, 100.0, 0.0).unwrap();
    let master = engine
        .solve(
            &base,
            &target,
            "m119",
            "he",
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap();

    let synced = engine.synchronize(&f, &target, &master, false).unwrap();
    assert!(synced.emitters.iter().all(|e| e.delay_secs == 0.0));
}

#[test]
fn test_synchronize_empty_formation_rejected() {
    let engine = engine();
    let target = target_north(10_000);
    let master = engine
        .solve(
            &base(),
            &target,
            "m119",
            "he",
            TacticalMethod::Standard,
            SolveOptions::default(),
        )
        .unwrap();
    let empty = formation::EmitterFormation {
        kind: FormationKind::Line,
        spacing_m: 50.0,
        orientation_mils: 0.0,
        emitters: Vec::new(),
        total_spread_m: 0.0,
        note: None,
    };
    assert!(matches!(
        sync::synchronize(&empty, &target, &master, true),
        Err(FdcError::InvalidFormation { .. })
    ));
}

// ---- Round allocation ----

#[test]
fn test_equal_allocation_sums_exactly_and_balances() {
    let alloc = allocation::allocate(3, 10, DistributionMethod::Equal, None).unwrap();
    let shares: Vec<u32> = alloc.assignments.iter().map(|a| a.rounds).collect();
    assert_eq!(shares.iter().sum::<u32>(), 10);
    assert_eq!(shares, vec![4, 3, 3]);
    let max = shares.iter().max().unwrap();
    let min = shares.iter().min().unwrap();
    assert!(max - min <= 1);
}

#[test]
fn test_weighted_allocation_follows_priorities() {
    let alloc =
        allocation::allocate(2, 8, DistributionMethod::Weighted, Some(&[3, 1])).unwrap();
    let shares: Vec<u32> = alloc.assignments.iter().map(|a| a.rounds).collect();
    assert_eq!(shares.iter().sum::<u32>(), 8);
    assert_eq!(shares, vec![6, 2]);
    assert!(shares.iter().all(|&s| s >= 1));
}

#[test]
fn test_weighted_allocation_small_budget() {
    // Fewer rounds than emitters: one each down the weight order.
    let alloc =
        allocation::allocate(3, 2, DistributionMethod::Weighted, Some(&[1, 5, 3])).unwrap();
    let shares: Vec<u32> = alloc.assignments.iter().map(|a| a.rounds).collect();
    assert_eq!(shares, vec![0, 1, 1]);
}

#[test]
fn test_priority_allocation_front_loads() {
    let alloc =
        allocation::allocate(3, 10, DistributionMethod::Priority, Some(&[5, 3, 1])).unwrap();
    let shares: Vec<u32> = alloc.assignments.iter().map(|a| a.rounds).collect();
    assert_eq!(shares.iter().sum::<u32>(), 10);
    // Halving greedy: 5, 3, then the remainder.
    assert_eq!(shares, vec![5, 3, 2]);
    assert!(shares[0] >= shares[1] && shares[1] >= shares[2]);
}

#[test]
fn test_custom_allocation_falls_back_to_equal() {
    let alloc = allocation::allocate(2, 5, DistributionMethod::Custom, None).unwrap();
    let shares: Vec<u32> = alloc.assignments.iter().map(|a| a.rounds).collect();
    assert_eq!(shares, vec![3, 2]);
    assert!(alloc.assignments[0].rationale.contains("not implemented"));
}

#[test]
fn test_firing_sequence_phases() {
    let alloc = allocation::allocate(2, 3, DistributionMethod::Equal, None).unwrap();
    // Shares 2 and 1: phase 1 fires both guns, phase 2 only the first.
    assert_eq!(alloc.sequence.len(), 2);
    assert_eq!(alloc.sequence[0].emitter_indices, vec![0, 1]);
    assert_eq!(alloc.sequence[1].emitter_indices, vec![0]);
    assert!(alloc
        .sequence
        .iter()
        .all(|p| p.rounds_per_emitter == 1 && p.interval_secs > 0.0));
}

#[test]
fn test_allocation_rejects_zero_emitters_and_bad_priorities() {
    assert!(allocation::allocate(0, 10, DistributionMethod::Equal, None).is_err());
    assert!(
        allocation::allocate(3, 10, DistributionMethod::Weighted, Some(&[1, 2])).is_err()
    );
}
