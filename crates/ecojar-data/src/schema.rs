//! Serde data file structs for jar definitions.
//!
//! These structs define the on-disk format for species tables, the food
//! web, couplings, and initial conditions. They are deserialized from RON,
//! JSON, or TOML files and then resolved into engine types by the loader.

use serde::Deserialize;

// ===========================================================================
// Top level
// ===========================================================================

/// A complete jar definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct JarData {
    pub species: Vec<SpeciesData>,
    #[serde(default)]
    pub food_web: Vec<FoodWebEdgeData>,
    #[serde(default)]
    pub couplings: Vec<CouplingData>,
    #[serde(default)]
    pub initial: InitialData,
}

// ===========================================================================
// Species
// ===========================================================================

/// One species' parameter record in a data file. Rates default to zero so
/// inert placeholder species stay terse.
#[derive(Debug, Clone, Deserialize)]
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

/// Photosynthesis parameters for a producer species.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotosynthesisData {
    pub rate: f64,
    pub co2_per_uptake: f64,
    pub o2_per_uptake: f64,
    pub nutrient_per_uptake: f64,
    pub biomass_per_uptake: f64,
}

/// Decomposition parameters for a decomposer species.
#[derive(Debug, Clone, Deserialize)]
pub struct DecompositionData {
    pub breakdown_rate: f64,
    pub breakdown_nutrient_yield: f64,
    pub breakdown_waste_yield: f64,
    pub detox_rate: f64,
    pub detox_nutrient_yield: f64,
    pub detox_growth_yield: f64,
}

// ===========================================================================
// Food web
// ===========================================================================

/// A food-web edge, supporting both a short tuple form and a full form.
/// The prey is a species name, `"soft_detritus"`, or `"toxic_waste"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FoodWebEdgeData {
    /// Short form: `("predator", "prey", rate)`.
    Short(String, String, f64),
    /// Full form with named fields.
    Full {
        predator: String,
        prey: String,
        rate: f64,
    },
}

impl FoodWebEdgeData {
    pub fn parts(&self) -> (&str, &str, f64) {
        match self {
            FoodWebEdgeData::Short(predator, prey, rate) => (predator, prey, *rate),
            FoodWebEdgeData::Full {
                predator,
                prey,
                rate,
            } => (predator, prey, *rate),
        }
    }
}

// ===========================================================================
// Couplings
// ===========================================================================

/// An auxiliary coupling rule in a data file.
#[derive(Debug, Clone, Deserialize)]
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

// ===========================================================================
// Initial conditions
// ===========================================================================

/// Starting pools, populations, and environment for a session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitialData {
    #[serde(default)]
    pub pools: PoolsData,
    #[serde(default)]
    pub populations: Vec<PopulationData>,
    #[serde(default = "default_one")]
    pub light_intensity: f64,
    #[serde(default = "default_one")]
    pub tank_volume: f64,
}

fn default_one() -> f64 {
    1.0
}

/// Starting level per pool. Omitted pools start empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolsData {
    #[serde(default)]
    pub oxygen: f64,
    #[serde(default)]
    pub co2: f64,
    #[serde(default)]
    pub nutrients: f64,
    #[serde(default)]
    pub soft_detritus: f64,
    #[serde(default)]
    pub hard_detritus: f64,
    #[serde(default)]
    pub toxic_waste: f64,
}

/// Starting biomass for one species.
#[derive(Debug, Clone, Deserialize)]
pub struct PopulationData {
    pub species: String,
    pub biomass: f64,
}
