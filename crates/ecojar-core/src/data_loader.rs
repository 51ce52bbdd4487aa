//! Data-driven registry loading from JSON.
//!
//! Feature-gated behind `data-loader`. Provides JSON deserialization into
//! [`RegistryBuilder`] for species tables defined in data files. The full
//! multi-format pipeline (RON/TOML/JSON, file discovery, initial state)
//! lives in the `ecojar-data` crate; this loader covers embedded content
//! and tests.

use crate::coupling::CouplingRule;
use crate::fixed::Fixed64;
use crate::pool::Pool;
use crate::registry::{RegistryBuilder, RegistryError};
use crate::species::{DecomposerParams, PhotosynthesisParams, PreyTarget, SpeciesDef};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("unknown species reference: '{0}'")]
    UnknownSpeciesRef(String),
    #[error("unknown prey reference: '{0}' (species name, 'soft_detritus', or 'toxic_waste')")]
    UnknownPreyRef(String),
    #[error("unknown pool reference: '{0}'")]
    UnknownPoolRef(String),
}

// ---------------------------------------------------------------------------
// JSON data structures
// ---------------------------------------------------------------------------

/// Top-level registry data structure for JSON deserialization.
#[derive(Debug, serde::Deserialize)]
pub struct RegistryData {
    #[serde(default)]
    pub species: Vec<SpeciesData>,
    #[serde(default)]
    pub food_web: Vec<FoodWebEdgeData>,
    #[serde(default)]
    pub couplings: Vec<CouplingData>,
}

/// JSON representation of one species' parameter record.
#[derive(Debug, serde::Deserialize)]
pub struct SpeciesData {
    pub name: String,
    pub unit_biomass: f64,
    #[serde(default)]
    pub soft_biomass: f64,
    #[serde(default)]
    pub hard_biomass: f64,
    #[serde(default)]
    pub respiration_rate: f64,
    #[serde(default)]
    pub death_rate: f64,
    #[serde(default)]
    pub waste_rate: f64,
    #[serde(default)]
    pub toxicity_sensitivity: f64,
    #[serde(default)]
    pub growth_rate: Option<f64>,
    #[serde(default)]
    pub photosynthesis: Option<PhotosynthesisData>,
    #[serde(default)]
    pub decomposition: Option<DecompositionData>,
}

/// JSON representation of photosynthesis parameters.
#[derive(Debug, serde::Deserialize)]
pub struct PhotosynthesisData {
    pub rate: f64,
    pub co2_per_uptake: f64,
    pub o2_per_uptake: f64,
    pub nutrient_per_uptake: f64,
    pub biomass_per_uptake: f64,
}

/// JSON representation of decomposition parameters.
#[derive(Debug, serde::Deserialize)]
pub struct DecompositionData {
    pub breakdown_rate: f64,
    pub breakdown_nutrient_yield: f64,
    pub breakdown_waste_yield: f64,
    pub detox_rate: f64,
    pub detox_nutrient_yield: f64,
    pub detox_growth_yield: f64,
}

/// JSON representation of a food-web edge. `prey` is a species name or one
/// of the grazeable pool names.
#[derive(Debug, serde::Deserialize)]
pub struct FoodWebEdgeData {
    pub predator: String,
    pub prey: String,
    pub rate: f64,
}

/// JSON representation of a coupling rule.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CouplingData {
    ReproductionSuppression {
        predator: String,
        prey: String,
        rate: f64,
    },
    DetritusGrowthBonus {
        species: String,
        pool: String,
        rate: f64,
    },
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Load a registry builder from a JSON string.
pub fn load_registry_json(json: &str) -> Result<RegistryBuilder, DataLoadError> {
    let data: RegistryData = serde_json::from_str(json)?;
    build_registry(data)
}

/// Load a registry builder from JSON bytes.
pub fn load_registry_json_bytes(bytes: &[u8]) -> Result<RegistryBuilder, DataLoadError> {
    let data: RegistryData = serde_json::from_slice(bytes)?;
    build_registry(data)
}

fn fx(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

fn parse_species(data: &SpeciesData) -> SpeciesDef {
    SpeciesDef {
        name: data.name.clone(),
        unit_biomass: fx(data.unit_biomass),
        soft_biomass: fx(data.soft_biomass),
        hard_biomass: fx(data.hard_biomass),
        respiration_rate: fx(data.respiration_rate),
        death_rate: fx(data.death_rate),
        waste_rate: fx(data.waste_rate),
        toxicity_sensitivity: fx(data.toxicity_sensitivity),
        growth_rate: data.growth_rate.map(fx),
        photosynthesis: data.photosynthesis.as_ref().map(|p| PhotosynthesisParams {
            rate: fx(p.rate),
            co2_per_uptake: fx(p.co2_per_uptake),
            o2_per_uptake: fx(p.o2_per_uptake),
            nutrient_per_uptake: fx(p.nutrient_per_uptake),
            biomass_per_uptake: fx(p.biomass_per_uptake),
        }),
        decomposition: data.decomposition.as_ref().map(|d| DecomposerParams {
            breakdown_rate: fx(d.breakdown_rate),
            breakdown_nutrient_yield: fx(d.breakdown_nutrient_yield),
            breakdown_waste_yield: fx(d.breakdown_waste_yield),
            detox_rate: fx(d.detox_rate),
            detox_nutrient_yield: fx(d.detox_nutrient_yield),
            detox_growth_yield: fx(d.detox_growth_yield),
        }),
    }
}

fn build_registry(data: RegistryData) -> Result<RegistryBuilder, DataLoadError> {
    let mut builder = RegistryBuilder::new();

    // Phase 1: Register all species.
    for species in &data.species {
        builder.register_species(parse_species(species));
    }

    // Phase 2: Resolve food-web edges by name. Prey names fall back to the
    // grazeable pools.
    for edge in &data.food_web {
        let predator = builder
            .species_id(&edge.predator)
            .ok_or_else(|| DataLoadError::UnknownSpeciesRef(edge.predator.clone()))?;
        let prey = match builder.species_id(&edge.prey) {
            Some(id) => PreyTarget::Species(id),
            None => match Pool::parse(&edge.prey) {
                Some(pool) if pool.is_grazeable() => PreyTarget::Pool(pool),
                _ => return Err(DataLoadError::UnknownPreyRef(edge.prey.clone())),
            },
        };
        builder.add_edge(predator, prey, fx(edge.rate));
    }

    // Phase 3: Resolve coupling rules by name.
    for coupling in &data.couplings {
        let rule = match coupling {
            CouplingData::ReproductionSuppression {
                predator,
                prey,
                rate,
            } => CouplingRule::ReproductionSuppression {
                predator: builder
                    .species_id(predator)
                    .ok_or_else(|| DataLoadError::UnknownSpeciesRef(predator.clone()))?,
                prey: builder
                    .species_id(prey)
                    .ok_or_else(|| DataLoadError::UnknownSpeciesRef(prey.clone()))?,
                rate: fx(*rate),
            },
            CouplingData::DetritusGrowthBonus {
                species,
                pool,
                rate,
            } => CouplingRule::DetritusGrowthBonus {
                species: builder
                    .species_id(species)
                    .ok_or_else(|| DataLoadError::UnknownSpeciesRef(species.clone()))?,
                pool: Pool::parse(pool)
                    .ok_or_else(|| DataLoadError::UnknownPoolRef(pool.clone()))?,
                rate: fx(*rate),
            },
        };
        builder.add_coupling(rule);
    }

    Ok(builder)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_empty_json() {
        let json = r#"{"species": [], "food_web": [], "couplings": []}"#;
        let builder = load_registry_json(json).unwrap();
        let reg = builder.build().unwrap();
        assert_eq!(reg.species_count(), 0);
    }

    #[test]
    fn load_species_only() {
        let json = r#"{"species": [
            {"name": "algae", "unit_biomass": 10.0},
            {"name": "snail", "unit_biomass": 5.0}
        ]}"#;
        let builder = load_registry_json(json).unwrap();
        let reg = builder.build().unwrap();
        assert_eq!(reg.species_count(), 2);
        assert!(reg.species_id("algae").is_some());
        assert!(reg.species_id("snail").is_some());
    }

    #[test]
    fn load_full_registry() {
        let json = r#"{
            "species": [
                {"name": "algae", "unit_biomass": 10.0,
                 "photosynthesis": {"rate": 0.02, "co2_per_uptake": 1.2,
                    "o2_per_uptake": 1.5, "nutrient_per_uptake": 0.1,
                    "biomass_per_uptake": 0.8}},
                {"name": "daphnia", "unit_biomass": 2.0, "growth_rate": 0.012},
                {"name": "bacteria", "unit_biomass": 1.0,
                 "decomposition": {"breakdown_rate": 0.01,
                    "breakdown_nutrient_yield": 0.5, "breakdown_waste_yield": 0.2,
                    "detox_rate": 0.004, "detox_nutrient_yield": 0.6,
                    "detox_growth_yield": 0.3}}
            ],
            "food_web": [
                {"predator": "daphnia", "prey": "algae", "rate": 0.0005},
                {"predator": "daphnia", "prey": "soft_detritus", "rate": 0.001}
            ],
            "couplings": [
                {"kind": "reproduction_suppression", "predator": "bacteria",
                 "prey": "daphnia", "rate": 0.001},
                {"kind": "detritus_growth_bonus", "species": "daphnia",
                 "pool": "soft_detritus", "rate": 0.002}
            ]
        }"#;
        let builder = load_registry_json(json).unwrap();
        let reg = builder.build().unwrap();
        assert_eq!(reg.species_count(), 3);
        assert_eq!(reg.food_web().len(), 2);
        assert_eq!(reg.couplings().len(), 2);

        let algae = reg.get(reg.species_id("algae").unwrap()).unwrap();
        assert!(algae.photosynthesis.is_some());
        let bacteria = reg.get(reg.species_id("bacteria").unwrap()).unwrap();
        assert!(bacteria.decomposition.is_some());
    }

    #[test]
    fn load_unknown_predator_fails() {
        let json = r#"{
            "species": [{"name": "algae", "unit_biomass": 10.0}],
            "food_web": [{"predator": "kraken", "prey": "algae", "rate": 0.1}]
        }"#;
        assert!(matches!(
            load_registry_json(json),
            Err(DataLoadError::UnknownSpeciesRef(_))
        ));
    }

    #[test]
    fn load_unknown_prey_fails() {
        let json = r#"{
            "species": [{"name": "snail", "unit_biomass": 5.0}],
            "food_web": [{"predator": "snail", "prey": "oxygen", "rate": 0.1}]
        }"#;
        // A pool name that is not grazeable is not a valid prey reference.
        assert!(matches!(
            load_registry_json(json),
            Err(DataLoadError::UnknownPreyRef(_))
        ));
    }

    #[test]
    fn load_invalid_json_fails() {
        let result = load_registry_json("not valid json {{{");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), DataLoadError::JsonParse(_)));
    }

    #[test]
    fn loaded_registry_still_validates_ranges() {
        // The loader resolves names; range validation stays in build().
        let json = r#"{"species": [{"name": "ghost", "unit_biomass": 0.0}]}"#;
        let builder = load_registry_json(json).unwrap();
        assert!(builder.build().is_err());
    }

    #[test]
    fn load_bytes_round_trip() {
        let json = br#"{"species": [{"name": "algae", "unit_biomass": 10.0}]}"#;
        let builder = load_registry_json_bytes(json).unwrap();
        let reg = builder.build().unwrap();
        assert_eq!(reg.species_count(), 1);
    }
}
