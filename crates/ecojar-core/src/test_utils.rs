//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these
//! helpers are available in unit tests, integration tests, and benchmarks
//! (via the `test-utils` feature).

use crate::defaults;
use crate::engine::JarEngine;
use crate::fixed::Fixed64;
use crate::scheduler::Scheduler;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Species names of the default jar
// ===========================================================================

pub const ALGAE: &str = "algae";
pub const DAPHNIA: &str = "daphnia";
pub const SNAIL: &str = "snail";
pub const HYDRA: &str = "hydra";
pub const BACTERIA: &str = "bacteria";

/// All default species names, in registration order.
pub const ALL_SPECIES: [&str; 5] = [ALGAE, DAPHNIA, SNAIL, HYDRA, BACTERIA];

// ===========================================================================
// Jar builders
// ===========================================================================

/// The default jar, still in the Setup phase.
pub fn default_jar() -> JarEngine {
    defaults::default_jar()
}

/// The default jar, sealed and ready to step.
pub fn sealed_jar() -> JarEngine {
    let mut engine = defaults::default_jar();
    engine
        .seal_jar()
        .expect("a fresh jar is in the setup phase");
    engine
}

/// A scheduler on the default one-second tick.
pub fn second_scheduler() -> Scheduler {
    Scheduler::new(Fixed64::ONE)
}

/// Step a sealed engine `n` times at the one-second tick.
pub fn run_steps(engine: &mut JarEngine, n: u64) {
    for _ in 0..n {
        engine.advance_simulation(Fixed64::ONE);
    }
}

/// Assert that every pool and every population is non-negative.
pub fn assert_non_negative(engine: &JarEngine) {
    for (pool, level) in engine.state().pools().iter() {
        assert!(level >= Fixed64::ZERO, "pool {pool} went negative: {level}");
    }
    for (id, def) in engine.registry().iter() {
        let biomass = engine.biomass_by_id(id);
        assert!(
            biomass >= Fixed64::ZERO,
            "species {} went negative: {biomass}",
            def.name
        );
    }
}
