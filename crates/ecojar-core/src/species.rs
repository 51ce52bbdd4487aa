//! Species identifiers and static per-species parameter records.
//!
//! A species is the unit of population in the jar: a continuous biomass
//! density plus a fixed parameter record loaded once per session. There are
//! no individual organisms; a discrete "unit" exists only as the quantum
//! the setup-phase editor adds or removes.

use crate::fixed::Fixed64;
use crate::pool::Pool;

/// Identifies a species in the registry. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct SpeciesId(pub u32);

impl SpeciesId {
    /// Index into dense per-species arrays.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ---------------------------------------------------------------------------
// Parameter records
// ---------------------------------------------------------------------------

/// Photosynthesis parameters for producer species.
///
/// Uptake is the bottleneck quantity: per step the species fixes
/// `biomass * rate * light * limiter * duration` units of uptake, where the
/// limiter is the Liebig scarcity ratio of CO2 and nutrients. The four
/// stoichiometric coefficients convert one unit of uptake into pool and
/// biomass deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotosynthesisParams {
    /// Uptake per unit biomass per unit time at full light and no scarcity.
    pub rate: Fixed64,
    /// CO2 debited per unit of uptake.
    pub co2_per_uptake: Fixed64,
    /// Oxygen credited per unit of uptake.
    pub o2_per_uptake: Fixed64,
    /// Nutrients debited per unit of uptake.
    pub nutrient_per_uptake: Fixed64,
    /// Biomass credited per unit of uptake.
    pub biomass_per_uptake: Fixed64,
}

/// Decomposition parameters for decomposer species.
///
/// Two independent conversions, each capped per step at the smaller of the
/// species' capacity and a fixed fraction of the source pool:
/// soft detritus -> toxic waste + nutrients (breakdown), and
/// toxic waste -> nutrients (detox). Only detox grows the decomposer.
#[derive(Debug, Clone, PartialEq)]
pub struct DecomposerParams {
    /// Soft detritus processed per unit biomass per unit time.
    pub breakdown_rate: Fixed64,
    /// Nutrients credited per unit of soft detritus broken down.
    pub breakdown_nutrient_yield: Fixed64,
    /// Toxic waste credited per unit of soft detritus broken down.
    pub breakdown_waste_yield: Fixed64,
    /// Toxic waste neutralized per unit biomass per unit time.
    pub detox_rate: Fixed64,
    /// Nutrients credited per unit of toxic waste neutralized.
    pub detox_nutrient_yield: Fixed64,
    /// Biomass credited per unit of toxic waste neutralized.
    pub detox_growth_yield: Fixed64,
}

/// The full static parameter record for one species.
///
/// `soft_biomass` and `hard_biomass` are the masses of soft and hard
/// detritus one dying unit leaves behind; they need not sum to
/// `unit_biomass`. Death-rate losses route dead mass through the same
/// soft/hard split, normalized by `unit_biomass`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesDef {
    pub name: String,
    /// Biomass added or removed per discrete setup action. Must be positive.
    pub unit_biomass: Fixed64,
    /// Soft detritus left by one dying unit.
    pub soft_biomass: Fixed64,
    /// Hard detritus left by one dying unit.
    pub hard_biomass: Fixed64,
    /// Oxygen consumed (and CO2 produced) per unit biomass per unit time.
    pub respiration_rate: Fixed64,
    /// Fraction of biomass lost to death per unit time.
    pub death_rate: Fixed64,
    /// Toxic waste excreted per unit biomass per unit time.
    pub waste_rate: Fixed64,
    /// Dimensionless multiplier on toxicity-driven excess mortality.
    pub toxicity_sensitivity: Fixed64,
    /// Baseline reproduction rate per unit time, if the species reproduces
    /// outside of photosynthesis or detox growth.
    pub growth_rate: Option<Fixed64>,
    /// Present for producer species.
    pub photosynthesis: Option<PhotosynthesisParams>,
    /// Present for decomposer species.
    pub decomposition: Option<DecomposerParams>,
}

// ---------------------------------------------------------------------------
// Food web
// ---------------------------------------------------------------------------

/// What a food-web edge drains: another species' biomass, or one of the two
/// grazeable bulk pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreyTarget {
    Species(SpeciesId),
    Pool(Pool),
}

/// A directed, weighted predator/prey interaction.
///
/// The rate is a per-unit-time, per-unit-biomass coefficient: intake per
/// step is `predator biomass * prey quantity * rate * duration`, before the
/// per-step caps of the predation stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodWebEdge {
    pub predator: SpeciesId,
    pub prey: PreyTarget,
    pub rate: Fixed64,
}

// ===========================================================================
// Tests
// ===========================================================================
