//! Property-based tests for the ecojar core engine.
//!
//! Uses proptest to generate random setup sessions and step sequences,
//! then verify the structural invariants hold: non-negativity, replay
//! determinism, extinction monotonicity, phase gating, and predation-order
//! independence.

use ecojar_core::engine::JarEngine;
use ecojar_core::fixed::Fixed64;
use ecojar_core::pool::Pool;
use ecojar_core::registry::RegistryBuilder;
use ecojar_core::species::{PreyTarget, SpeciesDef};
use ecojar_core::state::InitialConditions;
use ecojar_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// One setup-phase action against the default jar. Indices deliberately
/// overshoot the tables so unknown-name refusals are exercised too.
#[derive(Debug, Clone)]
enum SetupOp {
    Add(usize),
    Remove(usize),
    Resource(usize, u16),
}

const SPECIES_NAMES: [&str; 6] = [ALGAE, DAPHNIA, SNAIL, HYDRA, BACTERIA, "kraken"];
const POOL_NAMES: [&str; 7] = [
    "oxygen",
    "co2",
    "nutrients",
    "soft_detritus",
    "hard_detritus",
    "toxic_waste",
    "plutonium",
];

fn arb_setup_ops(max_ops: usize) -> impl Strategy<Value = Vec<SetupOp>> {
    proptest::collection::vec(
        prop_oneof![
            (0..SPECIES_NAMES.len()).prop_map(SetupOp::Add),
            (0..SPECIES_NAMES.len()).prop_map(SetupOp::Remove),
            ((0..POOL_NAMES.len()), 0..500u16).prop_map(|(p, amt)| SetupOp::Resource(p, amt)),
        ],
        0..=max_ops,
    )
}

/// Build a session: apply the setup ops (refusals ignored), seal, return.
fn build_session(ops: &[SetupOp]) -> JarEngine {
    let mut jar = default_jar();
    for op in ops {
        let _ = match *op {
            SetupOp::Add(s) => jar.add_organism(SPECIES_NAMES[s]),
            SetupOp::Remove(s) => jar.remove_organism(SPECIES_NAMES[s]),
            SetupOp::Resource(p, amount) => {
                jar.add_resource(POOL_NAMES[p], fixed(amount as f64))
            }
        };
    }
    jar.seal_jar().expect("fresh jar seals");
    jar
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Every pool and population stays non-negative through arbitrary
    /// setup sessions and step counts.
    #[test]
    fn non_negativity_holds(ops in arb_setup_ops(20), steps in 0..300u64) {
        let mut jar = build_session(&ops);
        for _ in 0..steps {
            jar.advance_simulation(Fixed64::ONE);
        }
        assert_non_negative(&jar);
    }

    /// Replaying the same session twice produces identical hash streams.
    #[test]
    fn replay_is_deterministic(ops in arb_setup_ops(20), steps in 1..200u64) {
        let mut jar_a = build_session(&ops);
        let mut jar_b = build_session(&ops);
        for _ in 0..steps {
            jar_a.advance_simulation(Fixed64::ONE);
            jar_b.advance_simulation(Fixed64::ONE);
            prop_assert_eq!(jar_a.state_hash(), jar_b.state_hash());
        }
    }

    /// A population that reaches exactly zero stays at zero for the rest
    /// of the simulation (no resurrection from the debiting stages).
    #[test]
    fn extinction_is_monotonic(ops in arb_setup_ops(20), steps in 1..300u64) {
        let mut jar = build_session(&ops);
        let mut extinct: Vec<&str> = Vec::new();
        for _ in 0..steps {
            jar.advance_simulation(Fixed64::ONE);
            for name in ALL_SPECIES {
                if jar.biomass(name) == Fixed64::ZERO && !extinct.contains(&name) {
                    extinct.push(name);
                }
            }
            for name in &extinct {
                prop_assert_eq!(jar.biomass(name), Fixed64::ZERO, "{} resurrected", name);
            }
        }
    }

    /// Mutators never change state after sealing, whatever they are fed.
    #[test]
    fn sealed_jar_ignores_mutators(ops in arb_setup_ops(10), late_ops in arb_setup_ops(10)) {
        let mut jar = build_session(&ops);
        jar.advance_simulation(Fixed64::ONE);
        let hash_before = jar.state_hash();
        let snapshot_before = jar.snapshot();

        for op in &late_ops {
            let result = match *op {
                SetupOp::Add(s) => jar.add_organism(SPECIES_NAMES[s]),
                SetupOp::Remove(s) => jar.remove_organism(SPECIES_NAMES[s]),
                SetupOp::Resource(p, amount) => {
                    jar.add_resource(POOL_NAMES[p], fixed(amount as f64))
                }
            };
            prop_assert!(result.is_err());
        }

        prop_assert_eq!(jar.state_hash(), hash_before);
        prop_assert_eq!(jar.snapshot(), snapshot_before);
    }
}

// ===========================================================================
// Predation order independence
// ===========================================================================

/// Stage 5 reads the start-of-step snapshot for every edge, so permuting
/// the food-web table must not change the committed step (fixed-point
/// addition is exact, so even the accumulation order is immaterial).
#[test]
fn predation_edge_order_is_immaterial() {
    fn grazers() -> Vec<SpeciesDef> {
        ["algae", "daphnia", "snail", "hydra"]
            .into_iter()
            .map(|name| SpeciesDef {
                name: name.to_string(),
                unit_biomass: fixed(1.0),
                soft_biomass: fixed(0.5),
                hard_biomass: fixed(0.2),
                respiration_rate: fixed(0.01),
                death_rate: fixed(0.005),
                waste_rate: fixed(0.001),
                toxicity_sensitivity: fixed(1.0),
                growth_rate: None,
                photosynthesis: None,
                decomposition: None,
            })
            .collect()
    }

    let edges = |b: &RegistryBuilder| {
        let algae = b.species_id("algae").unwrap();
        let daphnia = b.species_id("daphnia").unwrap();
        let snail = b.species_id("snail").unwrap();
        let hydra = b.species_id("hydra").unwrap();
        vec![
            (daphnia, PreyTarget::Species(algae), fixed(0.002)),
            (snail, PreyTarget::Species(algae), fixed(0.001)),
            (hydra, PreyTarget::Species(daphnia), fixed(0.003)),
            (snail, PreyTarget::Pool(Pool::SoftDetritus), fixed(0.001)),
            (hydra, PreyTarget::Pool(Pool::ToxicWaste), fixed(0.0005)),
        ]
    };

    let build = |reverse: bool| {
        let mut b = RegistryBuilder::new();
        for def in grazers() {
            b.register_species(def);
        }
        let mut table = edges(&b);
        if reverse {
            table.reverse();
        }
        for (predator, prey, rate) in table {
            b.add_edge(predator, prey, rate);
        }
        let registry = b.build().unwrap();

        let mut initial = InitialConditions::default();
        initial.pools.set(Pool::SoftDetritus, fixed(40.0));
        initial.pools.set(Pool::ToxicWaste, fixed(10.0));
        initial.populations = (0..4)
            .map(|i| {
                (
                    ecojar_core::species::SpeciesId(i),
                    fixed(10.0 * (i + 1) as f64),
                )
            })
            .collect();
        let mut engine = JarEngine::new(registry, initial);
        engine.seal_jar().unwrap();
        engine
    };

    let mut forward = build(false);
    let mut backward = build(true);
    for _ in 0..50 {
        forward.advance_simulation(Fixed64::ONE);
        backward.advance_simulation(Fixed64::ONE);
    }
    assert_eq!(forward.state_hash(), backward.state_hash());
}
