//! The species registry: parameter tables and the food web, frozen at
//! session start.
//!
//! Configuration goes through [`RegistryBuilder`], which validates the
//! whole table set once in `build()`. Missing or out-of-range fields are
//! rejected before the simulation phase can ever be entered; the step
//! engine then assumes a valid registry and never re-validates per step.

use crate::coupling::CouplingRule;
use crate::fixed::Fixed64;
use crate::species::{FoodWebEdge, PreyTarget, SpeciesDef, SpeciesId};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration-load-time validation failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate species name: {0}")]
    DuplicateSpecies(String),
    #[error("species '{species}': {field} must be positive")]
    PositiveRequired { species: String, field: &'static str },
    #[error("species '{species}': {field} must not be negative")]
    NonNegativeRequired { species: String, field: &'static str },
    #[error("food-web edge references unknown species id {0:?}")]
    DanglingSpeciesRef(SpeciesId),
    #[error("food-web edge preys on non-grazeable pool '{0}'")]
    NonGrazeablePrey(crate::pool::Pool),
    #[error("food-web edge rate must not be negative")]
    NegativeEdgeRate,
    #[error("coupling rule references unknown species id {0:?}")]
    DanglingCouplingRef(SpeciesId),
    #[error("coupling rule rate must not be negative")]
    NegativeCouplingRate,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`SpeciesRegistry`].
/// Register species, then edges and couplings, then finalize with `build()`.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    species: Vec<SpeciesDef>,
    name_to_id: HashMap<String, SpeciesId>,
    food_web: Vec<FoodWebEdge>,
    couplings: Vec<CouplingRule>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a species. Returns its ID. Duplicate names are caught at
    /// `build()` so data loaders can report every problem in file order.
    pub fn register_species(&mut self, def: SpeciesDef) -> SpeciesId {
        let id = SpeciesId(self.species.len() as u32);
        self.name_to_id.insert(def.name.clone(), id);
        self.species.push(def);
        id
    }

    /// Add a food-web edge. Edges are evaluated in insertion order.
    pub fn add_edge(&mut self, predator: SpeciesId, prey: PreyTarget, rate: Fixed64) {
        self.food_web.push(FoodWebEdge {
            predator,
            prey,
            rate,
        });
    }

    /// Add an auxiliary coupling rule, evaluated in insertion order.
    pub fn add_coupling(&mut self, rule: CouplingRule) {
        self.couplings.push(rule);
    }

    /// Lookup a species ID by name.
    pub fn species_id(&self, name: &str) -> Option<SpeciesId> {
        self.name_to_id.get(name).copied()
    }

    /// Finalize and build the immutable registry, validating everything.
    pub fn build(self) -> Result<SpeciesRegistry, RegistryError> {
        // Duplicate names: the map collapses duplicates, so compare sizes.
        if self.name_to_id.len() != self.species.len() {
            let mut seen = HashMap::new();
            for def in &self.species {
                if seen.insert(def.name.as_str(), ()).is_some() {
                    return Err(RegistryError::DuplicateSpecies(def.name.clone()));
                }
            }
        }

        for def in &self.species {
            validate_species(def)?;
        }

        let in_range = |id: SpeciesId| (id.index()) < self.species.len();

        for edge in &self.food_web {
            if !in_range(edge.predator) {
                return Err(RegistryError::DanglingSpeciesRef(edge.predator));
            }
            match edge.prey {
                PreyTarget::Species(id) if !in_range(id) => {
                    return Err(RegistryError::DanglingSpeciesRef(id));
                }
                PreyTarget::Pool(pool) if !pool.is_grazeable() => {
                    return Err(RegistryError::NonGrazeablePrey(pool));
                }
                _ => {}
            }
            if edge.rate < Fixed64::ZERO {
                return Err(RegistryError::NegativeEdgeRate);
            }
        }

        for rule in &self.couplings {
            for id in rule.species_refs() {
                if !in_range(id) {
                    return Err(RegistryError::DanglingCouplingRef(id));
                }
            }
            if rule.rate() < Fixed64::ZERO {
                return Err(RegistryError::NegativeCouplingRate);
            }
        }

        Ok(SpeciesRegistry {
            species: self.species,
            name_to_id: self.name_to_id,
            food_web: self.food_web,
            couplings: self.couplings,
        })
    }
}

fn validate_species(def: &SpeciesDef) -> Result<(), RegistryError> {
    let positive = |field, v: Fixed64| {
        if v <= Fixed64::ZERO {
            Err(RegistryError::PositiveRequired {
                species: def.name.clone(),
                field,
            })
        } else {
            Ok(())
        }
    };
    let non_negative = |field, v: Fixed64| {
        if v < Fixed64::ZERO {
            Err(RegistryError::NonNegativeRequired {
                species: def.name.clone(),
                field,
            })
        } else {
            Ok(())
        }
    };

    positive("unit_biomass", def.unit_biomass)?;
    non_negative("soft_biomass", def.soft_biomass)?;
    non_negative("hard_biomass", def.hard_biomass)?;
    non_negative("respiration_rate", def.respiration_rate)?;
    non_negative("death_rate", def.death_rate)?;
    non_negative("waste_rate", def.waste_rate)?;
    non_negative("toxicity_sensitivity", def.toxicity_sensitivity)?;
    if let Some(growth) = def.growth_rate {
        non_negative("growth_rate", growth)?;
    }
    if let Some(ref p) = def.photosynthesis {
        non_negative("photosynthesis.rate", p.rate)?;
        non_negative("photosynthesis.co2_per_uptake", p.co2_per_uptake)?;
        non_negative("photosynthesis.o2_per_uptake", p.o2_per_uptake)?;
        non_negative("photosynthesis.nutrient_per_uptake", p.nutrient_per_uptake)?;
        non_negative("photosynthesis.biomass_per_uptake", p.biomass_per_uptake)?;
    }
    if let Some(ref d) = def.decomposition {
        non_negative("decomposition.breakdown_rate", d.breakdown_rate)?;
        non_negative(
            "decomposition.breakdown_nutrient_yield",
            d.breakdown_nutrient_yield,
        )?;
        non_negative("decomposition.breakdown_waste_yield", d.breakdown_waste_yield)?;
        non_negative("decomposition.detox_rate", d.detox_rate)?;
        non_negative("decomposition.detox_nutrient_yield", d.detox_nutrient_yield)?;
        non_negative("decomposition.detox_growth_yield", d.detox_growth_yield)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable species registry. Frozen after `build()`.
#[derive(Debug)]
pub struct SpeciesRegistry {
    species: Vec<SpeciesDef>,
    name_to_id: HashMap<String, SpeciesId>,
    food_web: Vec<FoodWebEdge>,
    couplings: Vec<CouplingRule>,
}

impl SpeciesRegistry {
    pub fn get(&self, id: SpeciesId) -> Option<&SpeciesDef> {
        self.species.get(id.index())
    }

    pub fn species_id(&self, name: &str) -> Option<SpeciesId> {
        self.name_to_id.get(name).copied()
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Iterate `(id, def)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &SpeciesDef)> {
        self.species
            .iter()
            .enumerate()
            .map(|(i, def)| (SpeciesId(i as u32), def))
    }

    /// Food-web edges in table (insertion) order.
    pub fn food_web(&self) -> &[FoodWebEdge] {
        &self.food_web
    }

    /// Auxiliary coupling rules in insertion order.
    pub fn couplings(&self) -> &[CouplingRule] {
        &self.couplings
    }
}

// ===========================================================================
// Tests
// ===========================================================================
