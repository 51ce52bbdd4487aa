//! Integration tests for the ecojar simulation engine.
//!
//! These tests exercise end-to-end behavior across the full pipeline:
//! setup editing, sealing, stepping, transition events, determinism, and
//! the documented default-jar trajectory.

use ecojar_core::commands::CommandError;
use ecojar_core::event::EventKind;
use ecojar_core::fixed::Fixed64;
use ecojar_core::pool::Pool;
use ecojar_core::test_utils::*;
use ecojar_core::validation::{validate_determinism, validate_skip_ahead_equivalence};

// ===========================================================================
// Test 1: The documented first step
// ===========================================================================
//
// From the default state, one step of duration 1.0 must raise oxygen (algae
// net photosynthesis exceeds combined respiration), lower CO2, and leave
// toxic waste near zero with no toxicity mortality.

#[test]
fn default_jar_first_step_breathes() {
    let mut jar = sealed_jar();
    let oxygen_before = jar.pool(Pool::Oxygen);
    let co2_before = jar.pool(Pool::Co2);

    jar.advance_simulation(Fixed64::ONE);

    assert!(
        jar.pool(Pool::Oxygen) > oxygen_before,
        "oxygen should rise: {} -> {}",
        oxygen_before,
        jar.pool(Pool::Oxygen)
    );
    assert!(
        jar.pool(Pool::Co2) < co2_before,
        "co2 should fall: {} -> {}",
        co2_before,
        jar.pool(Pool::Co2)
    );
    assert!(jar.pool(Pool::ToxicWaste) < fixed(1.0));
    assert!(jar.toxicity_level() < Fixed64::ONE);
    assert!(
        jar.event_bus
            .events(EventKind::ToxicityThresholdCrossed)
            .is_empty()
    );
}

// ===========================================================================
// Test 2: Setup editing round trip
// ===========================================================================

#[test]
fn setup_editing_then_seal() {
    let mut jar = default_jar();

    jar.add_organism(DAPHNIA).unwrap();
    jar.add_organism(DAPHNIA).unwrap();
    jar.remove_organism(SNAIL).unwrap();
    jar.add_resource("co2", fixed(100.0)).unwrap();

    assert_eq!(jar.biomass(DAPHNIA), fixed(24.0)); // 20 + 2 units of 2
    assert_eq!(jar.biomass(SNAIL), fixed(5.0)); // 10 - 1 unit of 5
    assert_eq!(jar.pool(Pool::Co2), fixed(500.0));

    jar.seal_jar().unwrap();

    // Sealed: every mutator refuses, nothing changes.
    assert_eq!(jar.add_organism(DAPHNIA), Err(CommandError::PhaseLocked));
    assert_eq!(
        jar.add_resource("co2", fixed(1.0)),
        Err(CommandError::PhaseLocked)
    );
    assert_eq!(jar.biomass(DAPHNIA), fixed(24.0));
    assert_eq!(jar.pool(Pool::Co2), fixed(500.0));
}

// ===========================================================================
// Test 3: Non-negativity over a long run
// ===========================================================================

#[test]
fn long_run_stays_non_negative() {
    let mut jar = sealed_jar();
    for step in 0..5_000 {
        jar.advance_simulation(Fixed64::ONE);
        if step % 500 == 0 {
            assert_non_negative(&jar);
        }
    }
    assert_non_negative(&jar);
}

// ===========================================================================
// Test 4: Duration invariance within tolerance
// ===========================================================================
//
// One step of 2d lands near two steps of d. Exact equality is not expected
// (the caps and the step boundary are nonlinear); gross divergence would
// mean a rate is scaled per tick instead of per unit time.

#[test]
fn duration_invariance_within_tolerance() {
    let mut coarse = sealed_jar();
    coarse.advance_simulation(fixed(2.0));

    let mut fine = sealed_jar();
    fine.advance_simulation(Fixed64::ONE);
    fine.advance_simulation(Fixed64::ONE);

    for pool in Pool::ALL {
        let a = coarse.pool(pool);
        let b = fine.pool(pool);
        let diff = (a - b).abs();
        // Tolerance: 1% of the larger value, or a small absolute floor for
        // near-empty pools.
        let scale = a.max(b).max(fixed(1.0));
        assert!(
            diff <= scale * fixed(0.01),
            "pool {pool} diverged: {a} vs {b}"
        );
    }
    for name in ALL_SPECIES {
        let a = coarse.biomass(name);
        let b = fine.biomass(name);
        let diff = (a - b).abs();
        let scale = a.max(b).max(fixed(1.0));
        assert!(
            diff <= scale * fixed(0.01),
            "species {name} diverged: {a} vs {b}"
        );
    }
}

// ===========================================================================
// Test 5: Determinism and skip-ahead equivalence
// ===========================================================================

#[test]
fn identical_sessions_produce_identical_hash_streams() {
    let result = validate_determinism(editable_default_jar, 200, Fixed64::ONE);
    assert!(
        result.is_deterministic,
        "diverged at tick {:?}",
        result.divergence_tick
    );
}

#[test]
fn skip_ahead_is_bit_identical_to_live_play() {
    let result = validate_skip_ahead_equivalence(editable_default_jar, 500, Fixed64::ONE);
    assert!(
        result.is_equivalent,
        "live {:#x} != skip {:#x}",
        result.live_hash,
        result.skip_hash
    );
}

/// Validation seals for itself; hand it the editable default jar.
fn editable_default_jar() -> ecojar_core::engine::JarEngine {
    default_jar()
}

// ===========================================================================
// Test 6: Extinction monotonicity
// ===========================================================================
//
// A species at exactly zero contributes nothing and is never resurrected
// by the debiting stages -- not even one with a positive baseline growth
// rate, since growth is multiplicative in its own biomass.

#[test]
fn zero_biomass_is_terminal_in_simulation() {
    let mut jar = default_jar();

    // Edit daphnia down to zero before sealing: 20 biomass is 10 units.
    for _ in 0..10 {
        jar.remove_organism(DAPHNIA).unwrap();
    }
    assert_eq!(jar.biomass(DAPHNIA), Fixed64::ZERO);

    jar.seal_jar().unwrap();
    run_steps(&mut jar, 1_000);

    // Still extinct, despite a positive growth_rate parameter and a live
    // food web around it.
    assert_eq!(jar.biomass(DAPHNIA), Fixed64::ZERO);
    assert_non_negative(&jar);

    // Only a Setup-phase edit revives a dead population.
    jar.reset();
    assert_eq!(jar.biomass(DAPHNIA), fixed(20.0));
}

// ===========================================================================
// Test 7: Reset restores the documented defaults
// ===========================================================================

#[test]
fn reset_is_a_full_rewind() {
    let mut jar = default_jar();
    jar.add_resource("toxic_waste", fixed(500.0)).unwrap();
    jar.seal_jar().unwrap();
    run_steps(&mut jar, 100);
    assert!(jar.current_tick() > 0);

    jar.reset();

    assert!(jar.is_setup_phase());
    assert_eq!(jar.current_tick(), 0);
    assert_eq!(jar.elapsed_seconds(), Fixed64::ZERO);
    assert_eq!(jar.pool(Pool::ToxicWaste), Fixed64::ZERO);
    assert_eq!(jar.pool(Pool::Oxygen), fixed(21_000.0));
    for name in ALL_SPECIES {
        assert!(jar.biomass(name) > Fixed64::ZERO, "{name} missing after reset");
    }

    // The rewound jar replays the same trajectory.
    jar.seal_jar().unwrap();
    jar.advance_simulation(Fixed64::ONE);
    let mut fresh = sealed_jar();
    fresh.advance_simulation(Fixed64::ONE);
    assert_eq!(jar.state_hash(), fresh.state_hash());
}

// ===========================================================================
// Test 8: Snapshot is presentation-complete
// ===========================================================================

#[test]
fn snapshot_carries_everything_the_hud_needs() {
    let mut jar = sealed_jar();
    run_steps(&mut jar, 10);

    let snap = jar.snapshot();
    assert_eq!(snap.tick, 10);
    assert_eq!(snap.elapsed_seconds, fixed(10.0));
    assert_eq!(snap.pools.len(), 6);
    assert_eq!(snap.populations.len(), 5);
    assert_eq!(snap.pool(Pool::Oxygen), jar.pool(Pool::Oxygen));
    assert_eq!(snap.biomass(ALGAE), jar.biomass(ALGAE));
}
