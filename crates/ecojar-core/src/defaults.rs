//! The documented default jar: five species, their food web, the auxiliary
//! couplings, and the session's starting pools.
//!
//! This is the content the sandbox ships with and what `reset()` restores.
//! Parameter intent, at the default state (light 1.0, volume 1.0):
//! algae photosynthesis outpaces the jar's combined respiration, so a
//! freshly sealed jar gains oxygen and sheds CO2; switching the light off
//! starves the algae while respiration keeps draining oxygen; bacteria are
//! the detox pathway and the only species indifferent to toxicity.

use crate::coupling::CouplingRule;
use crate::engine::JarEngine;
use crate::fixed::Fixed64;
use crate::pool::Pool;
use crate::registry::{RegistryBuilder, SpeciesRegistry};
use crate::species::{DecomposerParams, PhotosynthesisParams, PreyTarget, SpeciesDef};
use crate::state::InitialConditions;

#[inline]
fn fx(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Build the default species registry: parameter tables, food web, and
/// coupling rules. Infallible by construction; the tables are validated in
/// tests like any other configuration.
pub fn registry() -> SpeciesRegistry {
    let mut b = RegistryBuilder::new();

    let algae = b.register_species(SpeciesDef {
        name: "algae".to_string(),
        unit_biomass: fx(10.0),
        soft_biomass: fx(6.0),
        hard_biomass: fx(2.0),
        respiration_rate: fx(0.004),
        death_rate: fx(0.005),
        waste_rate: fx(0.0005),
        toxicity_sensitivity: fx(1.0),
        growth_rate: None,
        photosynthesis: Some(PhotosynthesisParams {
            rate: fx(0.02),
            co2_per_uptake: fx(1.2),
            o2_per_uptake: fx(1.5),
            nutrient_per_uptake: fx(0.1),
            biomass_per_uptake: fx(0.8),
        }),
        decomposition: None,
    });

    let daphnia = b.register_species(SpeciesDef {
        name: "daphnia".to_string(),
        unit_biomass: fx(2.0),
        soft_biomass: fx(1.5),
        hard_biomass: fx(0.2),
        respiration_rate: fx(0.02),
        death_rate: fx(0.01),
        waste_rate: fx(0.001),
        toxicity_sensitivity: fx(1.5),
        growth_rate: Some(fx(0.01)),
        photosynthesis: None,
        decomposition: None,
    });

    let snail = b.register_species(SpeciesDef {
        name: "snail".to_string(),
        unit_biomass: fx(5.0),
        soft_biomass: fx(2.0),
        hard_biomass: fx(2.5),
        respiration_rate: fx(0.012),
        death_rate: fx(0.004),
        waste_rate: fx(0.001),
        toxicity_sensitivity: fx(0.8),
        growth_rate: Some(fx(0.003)),
        photosynthesis: None,
        decomposition: None,
    });

    let hydra = b.register_species(SpeciesDef {
        name: "hydra".to_string(),
        unit_biomass: fx(1.0),
        soft_biomass: fx(0.8),
        hard_biomass: fx(0.1),
        respiration_rate: fx(0.015),
        death_rate: fx(0.006),
        waste_rate: fx(0.002),
        toxicity_sensitivity: fx(1.2),
        growth_rate: Some(fx(0.004)),
        photosynthesis: None,
        decomposition: None,
    });

    let bacteria = b.register_species(SpeciesDef {
        name: "bacteria".to_string(),
        unit_biomass: fx(1.0),
        soft_biomass: fx(0.5),
        hard_biomass: fx(0.1),
        respiration_rate: fx(0.008),
        death_rate: fx(0.002),
        waste_rate: fx(0.0002),
        toxicity_sensitivity: Fixed64::ZERO,
        growth_rate: None,
        photosynthesis: None,
        decomposition: Some(DecomposerParams {
            breakdown_rate: fx(0.01),
            breakdown_nutrient_yield: fx(0.5),
            breakdown_waste_yield: fx(0.2),
            detox_rate: fx(0.008),
            detox_nutrient_yield: fx(0.6),
            detox_growth_yield: fx(0.3),
        }),
    });

    // Food web, in evaluation order.
    b.add_edge(daphnia, PreyTarget::Species(algae), fx(0.0003));
    b.add_edge(snail, PreyTarget::Species(algae), fx(0.0001));
    b.add_edge(snail, PreyTarget::Pool(Pool::SoftDetritus), fx(0.0002));
    b.add_edge(hydra, PreyTarget::Species(daphnia), fx(0.0005));

    // Hydra pick daphnia eggs out of the water column: fewer births, not
    // extra deaths. Snails breed faster on a well-stocked detritus floor.
    b.add_coupling(CouplingRule::ReproductionSuppression {
        predator: hydra,
        prey: daphnia,
        rate: fx(0.0005),
    });
    b.add_coupling(CouplingRule::DetritusGrowthBonus {
        species: snail,
        pool: Pool::SoftDetritus,
        rate: fx(0.001),
    });

    b.build()
        .expect("default species tables must always validate")
}

/// The documented default starting state.
pub fn initial_conditions(registry: &SpeciesRegistry) -> InitialConditions {
    let mut initial = InitialConditions::default();
    initial.pools.set(Pool::Oxygen, fx(21_000.0));
    initial.pools.set(Pool::Co2, fx(400.0));
    initial.pools.set(Pool::Nutrients, fx(100.0));
    initial.pools.set(Pool::SoftDetritus, fx(50.0));
    initial.pools.set(Pool::HardDetritus, fx(200.0));
    initial.pools.set(Pool::ToxicWaste, Fixed64::ZERO);
    initial.light_intensity = Fixed64::ONE;
    initial.tank_volume = Fixed64::ONE;

    for (name, biomass) in [
        ("algae", 100.0),
        ("daphnia", 20.0),
        ("snail", 10.0),
        ("hydra", 5.0),
        ("bacteria", 50.0),
    ] {
        if let Some(id) = registry.species_id(name) {
            initial.populations.push((id, fx(biomass)));
        }
    }
    initial
}

/// A ready-to-edit engine holding the default jar, in the Setup phase.
pub fn default_jar() -> JarEngine {
    let registry = registry();
    let initial = initial_conditions(&registry);
    JarEngine::new(registry, initial)
}

// ===========================================================================
// Tests
// ===========================================================================
