//! The simulation step engine: ordered stages over a read snapshot.
//!
//! `run_step` is a pure function of (state, registry, duration). Every
//! stage reads the start-of-step snapshot and writes only to the
//! [`StepDeltas`] accumulators; [`crate::state::JarState::commit`] applies
//! the whole batch at the end (stage 9, driven by the engine). Stage order
//! is fixed and correctness-relevant:
//!
//! 1. **Init** -- zero the delta accumulators.
//! 2. **Producers** -- photosynthesis, Liebig-limited by CO2/nutrients.
//! 3. **Decomposers** -- capped soft-detritus breakdown and waste detox.
//! 4. **Hard decay** -- abiotic weathering of hard detritus.
//! 5. **Predation** -- food-web edges in table order, per-step bite caps.
//! 6. **Couplings** -- growth-rate adjustments (births, not deaths).
//! 7. **Metabolism** -- respiration, excretion, death, reproduction.
//! 8. **Toxicity** -- excess mortality once the level crosses 1.0.
//! 9. **Commit** -- atomic clamped application (engine bookkeeping).
//!
//! All rate constants are per unit of `duration`, never per tick, so the
//! tick length can change without changing physical behavior. The per-step
//! caps (bite ceiling, pool drain ceiling) are mandatory stability bounds:
//! they keep one step -- especially during accelerated time-warp -- from
//! draining a pool it samples as if it were instantaneously replenished.

use crate::coupling::{CouplingRule, GrowthAdjustments};
use crate::fixed::Fixed64;
use crate::pool::Pool;
use crate::registry::SpeciesRegistry;
use crate::species::PreyTarget;
use crate::state::{JarState, StepDeltas};

// ---------------------------------------------------------------------------
// Model constants (per unit duration where dimensional)
// ---------------------------------------------------------------------------

/// Floor for divisors that could approach zero (tank volume, unit biomass).
const MIN_DIVISOR: f64 = 1e-6;

/// Max fraction of a source pool one capped conversion may drain per step.
const POOL_DRAIN_CEILING: f64 = 0.5;

/// Max fraction of a prey population one predation edge may take per step.
const PREY_BITE_CEILING: f64 = 0.3;

/// Fraction of living-prey intake converted into predator biomass.
const TROPHIC_EFFICIENCY: f64 = 0.35;

/// Fraction of bulk-pool intake converted into predator biomass.
const SCAVENGE_EFFICIENCY: f64 = 0.15;

/// Abiotic hard-detritus leak rate per unit time.
const HARD_DECAY_RATE: f64 = 0.0005;

/// Share of the hard-detritus leak routed to nutrients (rest to soft).
const HARD_DECAY_NUTRIENT_SHARE: f64 = 0.4;

/// CO2 saturation constant per unit tank volume for the Liebig limiter.
const CO2_SATURATION: f64 = 200.0;

/// Nutrient saturation constant per unit tank volume for the Liebig limiter.
const NUTRIENT_SATURATION: f64 = 25.0;

/// Detritus saturation constant for growth-bonus couplings.
const DETRITUS_BONUS_SATURATION: f64 = 100.0;

/// Toxic waste per unit tank volume at which the toxicity level reads 1.0.
const TOXICITY_THRESHOLD: f64 = 75.0;

/// Excess mortality per unit biomass, sensitivity, excess level, and time.
const TOXICITY_MORTALITY_RATE: f64 = 0.05;

#[inline]
fn fx(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Scarcity ratio of `available` against a volume-scaled saturation
/// constant, capped at 1.0.
fn saturation_ratio(available: Fixed64, saturation: Fixed64, volume: Fixed64) -> Fixed64 {
    let denom = (saturation * volume).max(fx(MIN_DIVISOR));
    (available / denom).min(Fixed64::ONE)
}

/// Dimensionless toxicity level: toxic waste against the volume-scaled
/// threshold. Values above 1.0 trigger the cascade stage.
pub fn toxicity_level(state: &JarState) -> Fixed64 {
    let denom = (fx(TOXICITY_THRESHOLD) * state.tank_volume()).max(fx(MIN_DIVISOR));
    state.pool(Pool::ToxicWaste) / denom
}

// ---------------------------------------------------------------------------
// run_step
// ---------------------------------------------------------------------------

/// Compute one step's delta batch. Pure: same snapshot, registry, and
/// duration always produce the same deltas.
pub fn run_step(state: &JarState, registry: &SpeciesRegistry, duration: Fixed64) -> StepDeltas {
    // Stage 1: zeroed accumulators.
    let mut deltas = StepDeltas::new(registry.species_count());

    stage_producers(state, registry, duration, &mut deltas);
    stage_decomposers(state, registry, duration, &mut deltas);
    stage_hard_detritus_decay(state, duration, &mut deltas);
    stage_predation(state, registry, duration, &mut deltas);
    let adjustments = stage_couplings(state, registry);
    stage_metabolism(state, registry, duration, &adjustments, &mut deltas);
    stage_toxicity(state, registry, duration, &mut deltas);

    deltas
}

// ---------------------------------------------------------------------------
// Stage 2: Producers
// ---------------------------------------------------------------------------

fn stage_producers(
    state: &JarState,
    registry: &SpeciesRegistry,
    duration: Fixed64,
    deltas: &mut StepDeltas,
) {
    let light = state.light_intensity();
    if light <= Fixed64::ZERO {
        return;
    }
    let volume = state.tank_volume();

    // Liebig's law: growth is bounded by whichever input is scarcest,
    // never by their sum or product.
    let limiter = saturation_ratio(state.pool(Pool::Co2), fx(CO2_SATURATION), volume)
        .min(saturation_ratio(
            state.pool(Pool::Nutrients),
            fx(NUTRIENT_SATURATION),
            volume,
        ));

    for (id, def) in registry.iter() {
        let Some(ref p) = def.photosynthesis else {
            continue;
        };
        let biomass = state.biomass(id);
        if biomass <= Fixed64::ZERO {
            continue;
        }
        let uptake = biomass * p.rate * light * limiter * duration;
        if uptake <= Fixed64::ZERO {
            continue;
        }
        deltas.debit_pool(Pool::Co2, uptake * p.co2_per_uptake);
        deltas.debit_pool(Pool::Nutrients, uptake * p.nutrient_per_uptake);
        deltas.credit_pool(Pool::Oxygen, uptake * p.o2_per_uptake);
        deltas.credit_biomass(id, uptake * p.biomass_per_uptake);
    }
}

// ---------------------------------------------------------------------------
// Stage 3: Decomposers
// ---------------------------------------------------------------------------

fn stage_decomposers(
    state: &JarState,
    registry: &SpeciesRegistry,
    duration: Fixed64,
    deltas: &mut StepDeltas,
) {
    let ceiling = fx(POOL_DRAIN_CEILING);
    let soft_available = state.pool(Pool::SoftDetritus);
    let toxic_available = state.pool(Pool::ToxicWaste);

    for (id, def) in registry.iter() {
        let Some(ref d) = def.decomposition else {
            continue;
        };
        let biomass = state.biomass(id);
        if biomass <= Fixed64::ZERO {
            continue;
        }

        // Breakdown: soft detritus -> toxic waste + nutrients.
        let capacity = biomass * d.breakdown_rate * duration;
        let processed = capacity.min(soft_available * ceiling);
        if processed > Fixed64::ZERO {
            deltas.debit_pool(Pool::SoftDetritus, processed);
            deltas.credit_pool(Pool::Nutrients, processed * d.breakdown_nutrient_yield);
            deltas.credit_pool(Pool::ToxicWaste, processed * d.breakdown_waste_yield);
        }

        // Detox: toxic waste -> nutrients. Only this conversion grows the
        // decomposer.
        let capacity = biomass * d.detox_rate * duration;
        let neutralized = capacity.min(toxic_available * ceiling);
        if neutralized > Fixed64::ZERO {
            deltas.debit_pool(Pool::ToxicWaste, neutralized);
            deltas.credit_pool(Pool::Nutrients, neutralized * d.detox_nutrient_yield);
            deltas.credit_biomass(id, neutralized * d.detox_growth_yield);
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 4: Hard detritus decay
// ---------------------------------------------------------------------------

fn stage_hard_detritus_decay(state: &JarState, duration: Fixed64, deltas: &mut StepDeltas) {
    let hard = state.pool(Pool::HardDetritus);
    if hard <= Fixed64::ZERO {
        return;
    }
    // Abiotic weathering: no living decomposer required.
    let leak = (hard * fx(HARD_DECAY_RATE) * duration).min(hard);
    let to_nutrients = leak * fx(HARD_DECAY_NUTRIENT_SHARE);
    deltas.debit_pool(Pool::HardDetritus, leak);
    deltas.credit_pool(Pool::Nutrients, to_nutrients);
    deltas.credit_pool(Pool::SoftDetritus, leak - to_nutrients);
}

// ---------------------------------------------------------------------------
// Stage 5: Predation
// ---------------------------------------------------------------------------

fn stage_predation(
    state: &JarState,
    registry: &SpeciesRegistry,
    duration: Fixed64,
    deltas: &mut StepDeltas,
) {
    let bite = fx(PREY_BITE_CEILING);
    let drain = fx(POOL_DRAIN_CEILING);

    // Edges run in table order, but every edge reads the start-of-step
    // snapshot, so order cannot leak intra-step consumption between edges.
    // Joint overdraw of one prey is resolved by the commit clamp.
    for edge in registry.food_web() {
        let pred = state.biomass(edge.predator);
        if pred <= Fixed64::ZERO {
            continue;
        }
        match edge.prey {
            PreyTarget::Species(prey_id) => {
                let prey = state.biomass(prey_id);
                if prey <= Fixed64::ZERO {
                    continue;
                }
                let intake = (pred * prey * edge.rate * duration).min(prey * bite);
                if intake <= Fixed64::ZERO {
                    continue;
                }
                deltas.debit_biomass(prey_id, intake);
                // The remainder of the intake is metabolic transfer loss,
                // credited to no pool.
                deltas.credit_biomass(edge.predator, intake * fx(TROPHIC_EFFICIENCY));
            }
            PreyTarget::Pool(pool) => {
                let available = state.pool(pool);
                if available <= Fixed64::ZERO {
                    continue;
                }
                let intake = (pred * available * edge.rate * duration).min(available * drain);
                if intake <= Fixed64::ZERO {
                    continue;
                }
                deltas.debit_pool(pool, intake);
                deltas.credit_biomass(edge.predator, intake * fx(SCAVENGE_EFFICIENCY));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 6: Auxiliary couplings
// ---------------------------------------------------------------------------

fn stage_couplings(state: &JarState, registry: &SpeciesRegistry) -> GrowthAdjustments {
    let mut adjustments = GrowthAdjustments::new(registry.species_count());
    let volume = state.tank_volume();

    for rule in registry.couplings() {
        match *rule {
            CouplingRule::ReproductionSuppression {
                predator,
                prey,
                rate,
            } => {
                let pred = state.biomass(predator);
                if pred > Fixed64::ZERO {
                    adjustments.add(prey, -(pred * rate));
                }
            }
            CouplingRule::DetritusGrowthBonus {
                species,
                pool,
                rate,
            } => {
                let plenty =
                    saturation_ratio(state.pool(pool), fx(DETRITUS_BONUS_SATURATION), volume);
                if plenty > Fixed64::ZERO {
                    adjustments.add(species, rate * plenty);
                }
            }
        }
    }
    adjustments
}

// ---------------------------------------------------------------------------
// Stage 7: Metabolism, death, reproduction
// ---------------------------------------------------------------------------

fn stage_metabolism(
    state: &JarState,
    registry: &SpeciesRegistry,
    duration: Fixed64,
    adjustments: &GrowthAdjustments,
    deltas: &mut StepDeltas,
) {
    let floor = fx(MIN_DIVISOR);

    for (id, def) in registry.iter() {
        let biomass = state.biomass(id);
        if biomass <= Fixed64::ZERO {
            continue;
        }

        // Respiration: oxygen -> CO2.
        let respired = biomass * def.respiration_rate * duration;
        deltas.debit_pool(Pool::Oxygen, respired);
        deltas.credit_pool(Pool::Co2, respired);

        // Excretion.
        deltas.credit_pool(Pool::ToxicWaste, biomass * def.waste_rate * duration);

        // Death, routed to detritus via the per-unit soft/hard split so
        // death-rate mass and setup-unit mass use a consistent ratio.
        let died = biomass * def.death_rate * duration;
        if died > Fixed64::ZERO {
            let unit = def.unit_biomass.max(floor);
            deltas.debit_biomass(id, died);
            deltas.credit_pool(Pool::SoftDetritus, died * (def.soft_biomass / unit));
            deltas.credit_pool(Pool::HardDetritus, died * (def.hard_biomass / unit));
        }

        // Reproduction: the adjusted rate is floored at zero, so coupling
        // suppression can cancel births but never becomes a death term.
        let base = def.growth_rate.unwrap_or(Fixed64::ZERO);
        let rate = (base + adjustments.rate_for(id)).max(Fixed64::ZERO);
        if rate > Fixed64::ZERO {
            deltas.credit_biomass(id, rate * biomass * duration);
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 8: Toxicity feedback
// ---------------------------------------------------------------------------

fn stage_toxicity(
    state: &JarState,
    registry: &SpeciesRegistry,
    duration: Fixed64,
    deltas: &mut StepDeltas,
) {
    let level = toxicity_level(state);
    if level <= Fixed64::ONE {
        return;
    }
    let excess = level - Fixed64::ONE;

    for (id, def) in registry.iter() {
        let biomass = state.biomass(id);
        if biomass <= Fixed64::ZERO || def.toxicity_sensitivity <= Fixed64::ZERO {
            continue;
        }
        let loss =
            biomass * def.toxicity_sensitivity * excess * fx(TOXICITY_MORTALITY_RATE) * duration;
        deltas.debit_biomass(id, loss);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
