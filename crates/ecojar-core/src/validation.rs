//! State comparison and determinism checking.
//!
//! Provides utilities for comparing two engine states to find divergences,
//! and for validating that a session definition produces deterministic,
//! play-style-independent trajectories. Because there is no persistence
//! layer, validation replays from a constructor closure instead of a
//! deserialized snapshot.

use crate::engine::JarEngine;
use crate::fixed::Fixed64;
use crate::pool::Pool;
use crate::scheduler::Scheduler;

// ---------------------------------------------------------------------------
// State diff types
// ---------------------------------------------------------------------------

/// A pool whose level differs between two engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolDiff {
    pub pool: Pool,
    pub a: Fixed64,
    pub b: Fixed64,
}

/// A species whose biomass differs between two engines.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationDiff {
    pub species: String,
    pub a: Fixed64,
    pub b: Fixed64,
}

/// Full state diff between two engines.
#[derive(Debug, Clone, PartialEq)]
pub struct JarDiff {
    pub is_identical: bool,
    pub hash_matches: bool,
    pub tick_matches: bool,
    pub elapsed_matches: bool,
    pub pool_diffs: Vec<PoolDiff>,
    pub population_diffs: Vec<PopulationDiff>,
}

/// Compute a detailed diff between two engine states. Species are compared
/// by engine A's registry; the engines are expected to share a session
/// definition.
pub fn diff_engines(a: &JarEngine, b: &JarEngine) -> JarDiff {
    let mut pool_diffs = Vec::new();
    for pool in Pool::ALL {
        let (va, vb) = (a.pool(pool), b.pool(pool));
        if va != vb {
            pool_diffs.push(PoolDiff {
                pool,
                a: va,
                b: vb,
            });
        }
    }

    let mut population_diffs = Vec::new();
    for (id, def) in a.registry().iter() {
        let (va, vb) = (a.biomass_by_id(id), b.biomass_by_id(id));
        if va != vb {
            population_diffs.push(PopulationDiff {
                species: def.name.clone(),
                a: va,
                b: vb,
            });
        }
    }

    let hash_matches = a.state_hash() == b.state_hash();
    let tick_matches = a.current_tick() == b.current_tick();
    let elapsed_matches = a.elapsed_seconds() == b.elapsed_seconds();

    JarDiff {
        is_identical: hash_matches
            && tick_matches
            && elapsed_matches
            && pool_diffs.is_empty()
            && population_diffs.is_empty(),
        hash_matches,
        tick_matches,
        elapsed_matches,
        pool_diffs,
        population_diffs,
    }
}

// ---------------------------------------------------------------------------
// Determinism validation
// ---------------------------------------------------------------------------

/// Result of a determinism validation run.
#[derive(Debug)]
pub struct DeterminismResult {
    /// Whether the two runs produced identical results.
    pub is_deterministic: bool,
    /// Tick at which divergence was first detected (if any).
    pub divergence_tick: Option<u64>,
    /// Hash log: (tick, hash_run1, hash_run2) for each tick.
    pub hash_log: Vec<(u64, u64, u64)>,
}

/// Validate that two engines built from the same session definition and
/// stepped identically produce identical hash streams.
pub fn validate_determinism(
    build: impl Fn() -> JarEngine,
    ticks: u64,
    tick_duration: Fixed64,
) -> DeterminismResult {
    let mut engine_a = sealed(build());
    let mut engine_b = sealed(build());

    let mut hash_log = Vec::new();
    let mut divergence_tick = None;

    for _ in 0..ticks {
        engine_a.advance_simulation(tick_duration);
        engine_b.advance_simulation(tick_duration);

        let hash_a = engine_a.state_hash();
        let hash_b = engine_b.state_hash();
        let tick = engine_a.current_tick();

        hash_log.push((tick, hash_a, hash_b));

        if hash_a != hash_b && divergence_tick.is_none() {
            divergence_tick = Some(tick);
        }
    }

    DeterminismResult {
        is_deterministic: divergence_tick.is_none(),
        divergence_tick,
        hash_log,
    }
}

// ---------------------------------------------------------------------------
// Skip-ahead equivalence
// ---------------------------------------------------------------------------

/// Result of a skip-ahead equivalence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipAheadResult {
    pub is_equivalent: bool,
    pub live_hash: u64,
    pub skip_hash: u64,
}

/// Validate that N live-cadence ticks and one skip-ahead of the same span
/// land on exactly the same state (no hidden real-time-only behavior).
pub fn validate_skip_ahead_equivalence(
    build: impl Fn() -> JarEngine,
    ticks: u64,
    tick_duration: Fixed64,
) -> SkipAheadResult {
    let mut live_engine = sealed(build());
    let mut live = Scheduler::new(tick_duration);
    for _ in 0..ticks {
        live.on_frame(&mut live_engine, tick_duration);
    }

    let mut skip_engine = sealed(build());
    let mut skip = Scheduler::new(tick_duration);
    let span = tick_duration * Fixed64::from_num(ticks);
    skip.skip_ahead(&mut skip_engine, span);

    SkipAheadResult {
        is_equivalent: live_engine.state_hash() == skip_engine.state_hash(),
        live_hash: live_engine.state_hash(),
        skip_hash: skip_engine.state_hash(),
    }
}

fn sealed(mut engine: JarEngine) -> JarEngine {
    // Freshly built engines are in Setup; validation runs sealed jars.
    let _ = engine.seal_jar();
    engine
}

// ===========================================================================
// Tests
// ===========================================================================
