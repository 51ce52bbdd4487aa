//! The mutable state store: pools, populations, elapsed time, environment.
//!
//! The step engine never writes here directly. It computes a [`StepDeltas`]
//! batch against a read snapshot of this state; [`JarState::commit`] then
//! applies the whole batch atomically, clamping every pool and population
//! to a minimum of zero and advancing the elapsed-time accumulator. Setup
//! phase mutators bypass delta batching and mutate directly (the engine
//! gates them on the phase controller).

use crate::fixed::Fixed64;
use crate::pool::{POOL_COUNT, Pool, PoolLevels};
use crate::species::SpeciesId;

/// Populations committed below this are extinct and snap to exactly zero.
/// Without the floor, fixed-point decay truncates to ever-smaller positive
/// residues and a dying species would never reach the zero that the
/// no-resurrection invariant keys on.
const BIOMASS_EXTINCTION_FLOOR: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Initial conditions
// ---------------------------------------------------------------------------

/// Session defaults: what the jar holds before any setup edits, and what
/// `reset()` restores.
#[derive(Debug, Clone)]
pub struct InitialConditions {
    pub pools: PoolLevels,
    /// Starting biomass per species. Species not listed start at zero.
    pub populations: Vec<(SpeciesId, Fixed64)>,
    pub light_intensity: Fixed64,
    pub tank_volume: Fixed64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            pools: PoolLevels::new(),
            populations: Vec::new(),
            light_intensity: Fixed64::ONE,
            tank_volume: Fixed64::ONE,
        }
    }
}

// ---------------------------------------------------------------------------
// JarState
// ---------------------------------------------------------------------------

/// All mutable simulation-relevant data for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct JarState {
    pools: PoolLevels,
    /// Dense biomass storage, indexed by `SpeciesId`.
    biomass: Vec<Fixed64>,
    /// Simulated seconds elapsed since sealing. Advanced only by commits.
    elapsed: Fixed64,
    /// Light reaching the producers, 0..=1 nominal (dial, not mass).
    light_intensity: Fixed64,
    /// Scaling divisor for concentration-dependent effects. Fixed per
    /// session; never a hard cap on pool contents.
    tank_volume: Fixed64,
}

impl JarState {
    /// Build a state from initial conditions for a registry of
    /// `species_count` species.
    pub fn from_initial(initial: &InitialConditions, species_count: usize) -> Self {
        let mut biomass = vec![Fixed64::ZERO; species_count];
        for &(id, mass) in &initial.populations {
            if let Some(slot) = biomass.get_mut(id.index()) {
                *slot = mass.max(Fixed64::ZERO);
            }
        }
        Self {
            pools: initial.pools,
            biomass,
            elapsed: Fixed64::ZERO,
            light_intensity: initial.light_intensity.max(Fixed64::ZERO),
            tank_volume: initial.tank_volume.max(Fixed64::ZERO),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[inline]
    pub fn pool(&self, pool: Pool) -> Fixed64 {
        self.pools.get(pool)
    }

    pub fn pools(&self) -> &PoolLevels {
        &self.pools
    }

    /// Biomass for a species id. Out-of-range ids read as zero, matching
    /// the "unknown species are not an error at read time" policy.
    #[inline]
    pub fn biomass(&self, id: SpeciesId) -> Fixed64 {
        self.biomass
            .get(id.index())
            .copied()
            .unwrap_or(Fixed64::ZERO)
    }

    pub fn species_count(&self) -> usize {
        self.biomass.len()
    }

    pub fn elapsed(&self) -> Fixed64 {
        self.elapsed
    }

    pub fn light_intensity(&self) -> Fixed64 {
        self.light_intensity
    }

    pub fn tank_volume(&self) -> Fixed64 {
        self.tank_volume
    }

    // -----------------------------------------------------------------------
    // Direct mutation (setup phase and presentation dials only)
    // -----------------------------------------------------------------------

    pub fn set_pool(&mut self, pool: Pool, value: Fixed64) {
        self.pools.set(pool, value);
    }

    pub fn add_to_pool(&mut self, pool: Pool, amount: Fixed64) {
        self.pools.add_clamped(pool, amount);
    }

    pub fn set_biomass(&mut self, id: SpeciesId, value: Fixed64) {
        if let Some(slot) = self.biomass.get_mut(id.index()) {
            *slot = value.max(Fixed64::ZERO);
        }
    }

    pub fn add_biomass(&mut self, id: SpeciesId, delta: Fixed64) {
        if let Some(slot) = self.biomass.get_mut(id.index()) {
            *slot = (*slot + delta).max(Fixed64::ZERO);
        }
    }

    pub fn set_light_intensity(&mut self, value: Fixed64) {
        self.light_intensity = value.max(Fixed64::ZERO);
    }

    // -----------------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------------

    /// Atomically apply one step's delta batch: every pool and every
    /// population receives its delta and is clamped to zero, then the
    /// elapsed-time accumulator advances by `duration`. There is no
    /// partial application; callers hand over a fully-computed batch.
    ///
    /// Populations that land below the extinction floor snap to exactly
    /// zero; pools keep arbitrarily small residues.
    pub fn commit(&mut self, deltas: &StepDeltas, duration: Fixed64) {
        for pool in Pool::ALL {
            self.pools.add_clamped(pool, deltas.pool(pool));
        }
        let floor = Fixed64::from_num(BIOMASS_EXTINCTION_FLOOR);
        for (i, slot) in self.biomass.iter_mut().enumerate() {
            let next = (*slot + deltas.biomass[i]).max(Fixed64::ZERO);
            *slot = if next < floor { Fixed64::ZERO } else { next };
        }
        self.elapsed += duration;
    }
}

// ---------------------------------------------------------------------------
// StepDeltas
// ---------------------------------------------------------------------------

/// Accumulators for one step: one signed delta per pool, one per species.
/// Zeroed at stage 1 of every step, filled by stages 2..=8, applied by
/// [`JarState::commit`] at stage 9.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDeltas {
    pools: [Fixed64; POOL_COUNT],
    biomass: Vec<Fixed64>,
}

impl StepDeltas {
    pub fn new(species_count: usize) -> Self {
        Self {
            pools: [Fixed64::ZERO; POOL_COUNT],
            biomass: vec![Fixed64::ZERO; species_count],
        }
    }

    #[inline]
    pub fn pool(&self, pool: Pool) -> Fixed64 {
        self.pools[pool.index()]
    }

    #[inline]
    pub fn biomass_for(&self, id: SpeciesId) -> Fixed64 {
        self.biomass[id.index()]
    }

    #[inline]
    pub fn credit_pool(&mut self, pool: Pool, amount: Fixed64) {
        self.pools[pool.index()] += amount;
    }

    #[inline]
    pub fn debit_pool(&mut self, pool: Pool, amount: Fixed64) {
        self.pools[pool.index()] -= amount;
    }

    #[inline]
    pub fn credit_biomass(&mut self, id: SpeciesId, amount: Fixed64) {
        self.biomass[id.index()] += amount;
    }

    #[inline]
    pub fn debit_biomass(&mut self, id: SpeciesId, amount: Fixed64) {
        self.biomass[id.index()] -= amount;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
