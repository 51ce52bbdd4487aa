//! The jar engine: owns configuration, state, phase, and bookkeeping, and
//! orchestrates the step pipeline.
//!
//! # Architecture
//!
//! The `JarEngine` owns:
//! - A [`SpeciesRegistry`] (parameter tables + food web, frozen at start)
//! - A [`JarState`] (pools, populations, elapsed time, environment dials)
//! - A [`PhaseController`] (Setup / Simulation gate)
//! - A [`SimState`] (tick counter) and the last FNV state hash
//! - An [`EventBus`] for refusals and model transitions
//!
//! Setup-phase mutators apply directly but only while the phase controller
//! reports Setup; in Simulation they refuse with a [`CommandError`] and a
//! `CommandRefused` event, leaving state untouched. `advance_simulation`
//! is the single stepping entry point for both the live scheduler and the
//! skip-ahead scheduler; it refuses outside Simulation.

use crate::commands::{CommandError, SetupCommand};
use crate::event::{Event, EventBus, EventKind, PassiveListener};
use crate::fixed::Fixed64;
use crate::phase::PhaseController;
use crate::pool::Pool;
use crate::query::{JarSnapshot, PoolSnapshot, PopulationSnapshot};
use crate::registry::SpeciesRegistry;
use crate::sim::{AdvanceResult, SimState, StateHash};
use crate::species::SpeciesId;
use crate::state::{InitialConditions, JarState};
use crate::step;

/// Simulated seconds per display day. The jar runs a condensed day so the
/// HUD counter moves at sandbox pace rather than wall-calendar pace.
const SECONDS_PER_DAY: u64 = 600;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The core simulation engine for one jar session.
#[derive(Debug)]
pub struct JarEngine {
    registry: SpeciesRegistry,
    /// Session defaults, restored by `reset()`.
    initial: InitialConditions,
    state: JarState,
    phase: PhaseController,
    sim: SimState,
    /// The most recently computed state hash.
    last_state_hash: u64,
    /// Typed event bus for refusals and model transitions.
    pub event_bus: EventBus,
}

impl JarEngine {
    /// Create an engine in the Setup phase from a validated registry and
    /// session initial conditions.
    pub fn new(registry: SpeciesRegistry, initial: InitialConditions) -> Self {
        let state = JarState::from_initial(&initial, registry.species_count());
        let mut engine = Self {
            registry,
            initial,
            state,
            phase: PhaseController::new(),
            sim: SimState::new(),
            last_state_hash: 0,
            event_bus: EventBus::default(),
        };
        engine.last_state_hash = engine.compute_state_hash();
        engine
    }

    // -----------------------------------------------------------------------
    // Phase
    // -----------------------------------------------------------------------

    pub fn is_setup_phase(&self) -> bool {
        self.phase.is_setup()
    }

    pub fn is_simulation_phase(&self) -> bool {
        self.phase.is_simulation()
    }

    /// Seal the jar: Setup -> Simulation. Refused once sealed.
    pub fn seal_jar(&mut self) -> Result<(), CommandError> {
        if !self.phase.is_setup() {
            return Err(self.refuse(CommandError::PhaseLocked));
        }
        self.phase.seal();
        self.event_bus.emit(Event::JarSealed {
            tick: self.sim.tick,
        });
        Ok(())
    }

    /// Return all pools and populations to the session defaults, rewind
    /// elapsed time and the tick counter, and revert to the Setup phase.
    pub fn reset(&mut self) {
        self.state = JarState::from_initial(&self.initial, self.registry.species_count());
        self.phase.reset();
        self.sim = SimState::new();
        self.last_state_hash = self.compute_state_hash();
        self.event_bus.emit(Event::JarReset { tick: 0 });
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    pub fn state(&self) -> &JarState {
        &self.state
    }

    /// Current level of a resource pool.
    pub fn pool(&self, pool: Pool) -> Fixed64 {
        self.state.pool(pool)
    }

    /// Current biomass for a species name. Unknown names read as zero
    /// biomass; they are not an error at read time.
    pub fn biomass(&self, species: &str) -> Fixed64 {
        match self.registry.species_id(species) {
            Some(id) => self.state.biomass(id),
            None => Fixed64::ZERO,
        }
    }

    /// Current biomass by species id (out-of-range ids read as zero).
    pub fn biomass_by_id(&self, id: SpeciesId) -> Fixed64 {
        self.state.biomass(id)
    }

    /// Simulated seconds elapsed since sealing. Display only.
    pub fn elapsed_seconds(&self) -> Fixed64 {
        self.state.elapsed()
    }

    /// Whole simulated days elapsed. Display only.
    pub fn elapsed_days(&self) -> u64 {
        self.state.elapsed().to_num::<u64>() / SECONDS_PER_DAY
    }

    /// Dimensionless toxicity level (1.0 = cascade threshold).
    pub fn toxicity_level(&self) -> Fixed64 {
        step::toxicity_level(&self.state)
    }

    pub fn light_intensity(&self) -> Fixed64 {
        self.state.light_intensity()
    }

    /// Light is a presentation dial, adjustable in any phase; it scales
    /// future producer steps and stores no mass itself.
    pub fn set_light_intensity(&mut self, value: Fixed64) {
        self.state.set_light_intensity(value);
    }

    pub fn tank_volume(&self) -> Fixed64 {
        self.state.tank_volume()
    }

    pub fn current_tick(&self) -> u64 {
        self.sim.tick
    }

    /// The most recently computed state hash, for desync detection.
    pub fn state_hash(&self) -> u64 {
        self.last_state_hash
    }

    // -----------------------------------------------------------------------
    // Setup mutators
    // -----------------------------------------------------------------------

    /// Apply a setup command. Dispatch helper for editor/UI layers.
    pub fn apply_setup(&mut self, command: SetupCommand) -> Result<(), CommandError> {
        match command {
            SetupCommand::AddOrganism { species } => self.add_organism(&species),
            SetupCommand::RemoveOrganism { species } => self.remove_organism(&species),
            SetupCommand::AddResource { pool, amount } => self.add_resource(&pool, amount),
        }
    }

    /// Add one configured unit of biomass for a species.
    pub fn add_organism(&mut self, species: &str) -> Result<(), CommandError> {
        if !self.phase.is_setup() {
            return Err(self.refuse(CommandError::PhaseLocked));
        }
        let Some(id) = self.registry.species_id(species) else {
            return Err(self.refuse(CommandError::UnknownSpecies(species.to_string())));
        };
        let unit = self.registry.get(id).map(|d| d.unit_biomass).unwrap_or(Fixed64::ZERO);
        self.state.add_biomass(id, unit);
        self.event_bus.emit(Event::OrganismAdded {
            species: id,
            biomass: unit,
            tick: self.sim.tick,
        });
        Ok(())
    }

    /// Remove one unit of biomass, refusing if less than a unit remains.
    pub fn remove_organism(&mut self, species: &str) -> Result<(), CommandError> {
        if !self.phase.is_setup() {
            return Err(self.refuse(CommandError::PhaseLocked));
        }
        let Some(id) = self.registry.species_id(species) else {
            return Err(self.refuse(CommandError::UnknownSpecies(species.to_string())));
        };
        let unit = self.registry.get(id).map(|d| d.unit_biomass).unwrap_or(Fixed64::ZERO);
        let available = self.state.biomass(id);
        if available < unit {
            return Err(self.refuse(CommandError::InsufficientBiomass {
                species: species.to_string(),
                available,
                required: unit,
            }));
        }
        self.state.add_biomass(id, -unit);
        self.event_bus.emit(Event::OrganismRemoved {
            species: id,
            biomass: unit,
            tick: self.sim.tick,
        });
        Ok(())
    }

    /// Add a quantity to a named resource pool.
    pub fn add_resource(&mut self, pool: &str, amount: Fixed64) -> Result<(), CommandError> {
        if !self.phase.is_setup() {
            return Err(self.refuse(CommandError::PhaseLocked));
        }
        let Some(pool) = Pool::parse(pool) else {
            return Err(self.refuse(CommandError::UnknownPool(pool.to_string())));
        };
        if amount < Fixed64::ZERO {
            return Err(self.refuse(CommandError::NegativeAmount));
        }
        self.state.add_to_pool(pool, amount);
        self.event_bus.emit(Event::ResourceAdded {
            pool,
            amount,
            tick: self.sim.tick,
        });
        Ok(())
    }

    fn refuse(&mut self, error: CommandError) -> CommandError {
        self.event_bus.emit(Event::CommandRefused {
            reason: error.refusal(),
            tick: self.sim.tick,
        });
        error
    }

    // -----------------------------------------------------------------------
    // Advance
    // -----------------------------------------------------------------------

    /// Run one simulation step of the given fixed duration.
    ///
    /// This is the single stepping entry point for live play and skip-ahead
    /// alike. Refuses (zero steps plus a `CommandRefused` event) while the
    /// jar is unsealed; non-positive durations are a silent no-op.
    pub fn advance_simulation(&mut self, duration: Fixed64) -> AdvanceResult {
        if !self.phase.is_simulation() {
            self.refuse(CommandError::PhaseLocked);
            return AdvanceResult::default();
        }
        if duration <= Fixed64::ZERO {
            return AdvanceResult::default();
        }

        // Snapshot quantities whose crossings emit transition events.
        let pre_biomass: Vec<Fixed64> = (0..self.registry.species_count())
            .map(|i| self.state.biomass(SpeciesId(i as u32)))
            .collect();
        let pre_toxicity = step::toxicity_level(&self.state);

        // Stages 1-8 against the read snapshot, stage 9 commit.
        let deltas = step::run_step(&self.state, &self.registry, duration);
        self.state.commit(&deltas, duration);
        self.sim.tick += 1;

        self.emit_transitions(&pre_biomass, pre_toxicity);
        self.last_state_hash = self.compute_state_hash();

        AdvanceResult { steps_run: 1 }
    }

    /// Emit crossing events: extinction on positive -> zero, toxicity on
    /// level crossings of 1.0 in either direction.
    fn emit_transitions(&mut self, pre_biomass: &[Fixed64], pre_toxicity: Fixed64) {
        let tick = self.sim.tick;

        for (i, &before) in pre_biomass.iter().enumerate() {
            let id = SpeciesId(i as u32);
            if before > Fixed64::ZERO && self.state.biomass(id) == Fixed64::ZERO {
                self.event_bus.emit(Event::SpeciesWentExtinct { species: id, tick });
            }
        }

        let toxicity = step::toxicity_level(&self.state);
        if pre_toxicity <= Fixed64::ONE && toxicity > Fixed64::ONE {
            self.event_bus.emit(Event::ToxicityThresholdCrossed {
                level: toxicity,
                tick,
            });
        } else if pre_toxicity > Fixed64::ONE && toxicity <= Fixed64::ONE {
            self.event_bus.emit(Event::ToxicityCleared { tick });
        }
    }

    // -----------------------------------------------------------------------
    // State hash
    // -----------------------------------------------------------------------

    /// Deterministic hash of everything step-relevant: tick, elapsed time,
    /// environment dials, pools, populations.
    fn compute_state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_u64(self.sim.tick);
        hasher.write_fixed64(self.state.elapsed());
        hasher.write_fixed64(self.state.light_intensity());
        hasher.write_fixed64(self.state.tank_volume());
        for (_, level) in self.state.pools().iter() {
            hasher.write_fixed64(level);
        }
        for i in 0..self.registry.species_count() {
            hasher.write_fixed64(self.state.biomass(SpeciesId(i as u32)));
        }
        hasher.finish()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Suppress an event kind. Suppressed events are never buffered.
    pub fn suppress_event(&mut self, kind: EventKind) {
        self.event_bus.suppress(kind);
    }

    /// Register a passive listener for an event kind.
    pub fn on_event(&mut self, kind: EventKind, listener: PassiveListener) {
        self.event_bus.on_passive(kind, listener);
    }

    /// Drain buffered events of a kind, oldest first.
    pub fn drain_events(&mut self, kind: EventKind) -> Vec<Event> {
        self.event_bus.drain(kind)
    }

    // -----------------------------------------------------------------------
    // Query API (read-only)
    // -----------------------------------------------------------------------

    /// Capture a presentation-ready snapshot of the whole jar.
    pub fn snapshot(&self) -> JarSnapshot {
        JarSnapshot {
            tick: self.sim.tick,
            elapsed_seconds: self.elapsed_seconds(),
            elapsed_days: self.elapsed_days(),
            toxicity_level: self.toxicity_level(),
            light_intensity: self.light_intensity(),
            pools: Pool::ALL
                .into_iter()
                .map(|pool| PoolSnapshot {
                    pool,
                    level: self.pool(pool),
                })
                .collect(),
            populations: self
                .registry
                .iter()
                .map(|(id, def)| PopulationSnapshot {
                    name: def.name.clone(),
                    biomass: self.state.biomass(id),
                })
                .collect(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
