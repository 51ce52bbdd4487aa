//! Ecojar Core -- the deterministic simulation engine for closed-jar
//! ecosystem sandboxes.
//!
//! This crate provides the biogeochemical/population model at the heart of
//! the jar: resource pools, continuous biomass densities, per-species
//! metabolic parameters, a predator/prey food web, and the fixed-step
//! engine that advances them reproducibly.
//!
//! # Nine-Stage Step Pipeline
//!
//! Each call to [`engine::JarEngine::advance_simulation`] advances the
//! simulation by one fixed tick through the following stages:
//!
//! 1. **Init** -- Zero the per-pool / per-species delta accumulators.
//! 2. **Producers** -- Photosynthesis, Liebig-limited by CO2 and nutrients.
//! 3. **Decomposers** -- Capped soft-detritus breakdown and waste detox.
//! 4. **Hard decay** -- Abiotic weathering of hard detritus.
//! 5. **Predation** -- Food-web edges in table order, per-step bite caps.
//! 6. **Couplings** -- Auxiliary growth-rate adjustments (fewer births).
//! 7. **Metabolism** -- Respiration, excretion, death, reproduction.
//! 8. **Toxicity** -- Excess mortality once the level crosses 1.0.
//! 9. **Commit** -- Atomic clamped application, tick counter, state hash.
//!
//! # Phase Gate
//!
//! A session starts in the Setup phase, where editing commands mutate the
//! jar directly. Sealing the jar enters the Simulation phase, in which
//! only the step engine mutates state, until `reset()` restores the
//! session defaults:
//!
//! ```rust,ignore
//! let mut jar = ecojar_core::defaults::default_jar();
//! jar.add_organism("daphnia")?;
//! jar.seal_jar()?;
//! jar.advance_simulation(tick);
//! ```
//!
//! # Key Types
//!
//! - [`engine::JarEngine`] -- Owner of state, phase, and bookkeeping.
//! - [`registry::SpeciesRegistry`] -- Immutable parameter tables and food
//!   web, validated once at session start.
//! - [`state::JarState`] -- Pools, populations, elapsed time; atomic
//!   clamped delta commits.
//! - [`step`] -- The pure stage pipeline.
//! - [`scheduler::Scheduler`] -- Live cadence and cancellable skip-ahead;
//!   acceleration is always more steps, never bigger steps.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`event::EventBus`] -- Ring-buffered refusal and transition events.
//! - [`validation`] -- State diffing, determinism and skip-ahead checks.

pub mod commands;
pub mod coupling;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod defaults;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod phase;
pub mod pool;
pub mod query;
pub mod registry;
pub mod scheduler;
pub mod sim;
pub mod species;
pub mod state;
pub mod step;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
