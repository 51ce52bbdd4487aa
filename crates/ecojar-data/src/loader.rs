//! Resolution pipeline: reads jar definition files, resolves name
//! references, and builds a validated registry plus initial conditions.
//!
//! Provides format detection (RON/JSON/TOML), deserialization helpers, and
//! the name-resolution pass that turns [`schema`] data into engine types.
//! All validation happens here and in the registry builder -- before the
//! Simulation phase can ever be entered.

use crate::schema::{CouplingData, JarData};
use ecojar_core::coupling::CouplingRule;
use ecojar_core::engine::JarEngine;
use ecojar_core::fixed::Fixed64;
use ecojar_core::pool::Pool;
use ecojar_core::registry::{RegistryBuilder, RegistryError, SpeciesRegistry};
use ecojar_core::species::{DecomposerParams, PhotosynthesisParams, PreyTarget, SpeciesDef};
use ecojar_core::state::InitialConditions;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during jar definition loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A species name reference could not be resolved.
    #[error("unresolved species reference '{name}'")]
    UnresolvedSpecies { name: String },

    /// A prey reference is neither a species nor a grazeable pool.
    #[error("unresolved prey reference '{name}' (species, 'soft_detritus', or 'toxic_waste')")]
    UnresolvedPrey { name: String },

    /// A pool name reference could not be resolved.
    #[error("unresolved pool reference '{name}'")]
    UnresolvedPool { name: String },

    /// The resolved tables failed registry validation.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// JarDefinition
// ===========================================================================

/// A fully resolved and validated jar definition: everything the engine
/// needs for a session.
#[derive(Debug)]
pub struct JarDefinition {
    pub registry: SpeciesRegistry,
    pub initial: InitialConditions,
}

impl JarDefinition {
    /// Consume the definition into a ready-to-edit engine (Setup phase).
    pub fn into_engine(self) -> JarEngine {
        JarEngine::new(self.registry, self.initial)
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load a jar definition from a file, detecting the format by extension.
pub fn load_jar_file(path: &Path) -> Result<JarDefinition, DataLoadError> {
    let format = detect_format(path)?;
    let text = std::fs::read_to_string(path)?;
    parse_jar_str(format, &text).map_err(|err| match err {
        // Attach the file to bare parse errors from the string path.
        DataLoadError::Parse { detail, .. } => DataLoadError::Parse {
            file: path.to_path_buf(),
            detail,
        },
        other => other,
    })
}

/// Parse and resolve a jar definition from a string in the given format.
pub fn parse_jar_str(format: Format, text: &str) -> Result<JarDefinition, DataLoadError> {
    let data: JarData = match format {
        Format::Ron => ron::from_str(text).map_err(|e| DataLoadError::Parse {
            file: PathBuf::new(),
            detail: e.to_string(),
        })?,
        Format::Toml => toml::from_str(text).map_err(|e| DataLoadError::Parse {
            file: PathBuf::new(),
            detail: e.to_string(),
        })?,
        Format::Json => serde_json::from_str(text).map_err(|e| DataLoadError::Parse {
            file: PathBuf::new(),
            detail: e.to_string(),
        })?,
    };
    resolve(data)
}

// ===========================================================================
// Resolution
// ===========================================================================

fn fx(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Resolve a deserialized jar definition into validated engine types.
pub fn resolve(data: JarData) -> Result<JarDefinition, DataLoadError> {
    let mut builder = RegistryBuilder::new();

    // Phase 1: Register all species.
    for s in &data.species {
        builder.register_species(SpeciesDef {
            name: s.name.clone(),
            unit_biomass: fx(s.unit_biomass),
            soft_biomass: fx(s.soft_biomass),
            hard_biomass: fx(s.hard_biomass),
            respiration_rate: fx(s.respiration_rate),
            death_rate: fx(s.death_rate),
            waste_rate: fx(s.waste_rate),
            toxicity_sensitivity: fx(s.toxicity_sensitivity),
            growth_rate: s.growth_rate.map(fx),
            photosynthesis: s.photosynthesis.as_ref().map(|p| PhotosynthesisParams {
                rate: fx(p.rate),
                co2_per_uptake: fx(p.co2_per_uptake),
                o2_per_uptake: fx(p.o2_per_uptake),
                nutrient_per_uptake: fx(p.nutrient_per_uptake),
                biomass_per_uptake: fx(p.biomass_per_uptake),
            }),
            decomposition: s.decomposition.as_ref().map(|d| DecomposerParams {
                breakdown_rate: fx(d.breakdown_rate),
                breakdown_nutrient_yield: fx(d.breakdown_nutrient_yield),
                breakdown_waste_yield: fx(d.breakdown_waste_yield),
                detox_rate: fx(d.detox_rate),
                detox_nutrient_yield: fx(d.detox_nutrient_yield),
                detox_growth_yield: fx(d.detox_growth_yield),
            }),
        });
    }

    // Phase 2: Resolve food-web edges by name.
    for edge in &data.food_web {
        let (predator_name, prey_name, rate) = edge.parts();
        let predator =
            builder
                .species_id(predator_name)
                .ok_or_else(|| DataLoadError::UnresolvedSpecies {
                    name: predator_name.to_string(),
                })?;
        let prey = match builder.species_id(prey_name) {
            Some(id) => PreyTarget::Species(id),
            None => match Pool::parse(prey_name) {
                Some(pool) if pool.is_grazeable() => PreyTarget::Pool(pool),
                _ => {
                    return Err(DataLoadError::UnresolvedPrey {
                        name: prey_name.to_string(),
                    });
                }
            },
        };
        builder.add_edge(predator, prey, fx(rate));
    }

    // Phase 3: Resolve coupling rules by name.
    for coupling in &data.couplings {
        let rule = match coupling {
            CouplingData::ReproductionSuppression {
                predator,
                prey,
                rate,
            } => CouplingRule::ReproductionSuppression {
                predator: resolve_species(&builder, predator)?,
                prey: resolve_species(&builder, prey)?,
                rate: fx(*rate),
            },
            CouplingData::DetritusGrowthBonus {
                species,
                pool,
                rate,
            } => CouplingRule::DetritusGrowthBonus {
                species: resolve_species(&builder, species)?,
                pool: Pool::parse(pool).ok_or_else(|| DataLoadError::UnresolvedPool {
                    name: pool.clone(),
                })?,
                rate: fx(*rate),
            },
        };
        builder.add_coupling(rule);
    }

    // Phase 4: Resolve initial conditions, then run registry validation.
    let mut initial = InitialConditions::default();
    let pools = &data.initial.pools;
    initial.pools.set(Pool::Oxygen, fx(pools.oxygen));
    initial.pools.set(Pool::Co2, fx(pools.co2));
    initial.pools.set(Pool::Nutrients, fx(pools.nutrients));
    initial.pools.set(Pool::SoftDetritus, fx(pools.soft_detritus));
    initial.pools.set(Pool::HardDetritus, fx(pools.hard_detritus));
    initial.pools.set(Pool::ToxicWaste, fx(pools.toxic_waste));
    initial.light_intensity = fx(data.initial.light_intensity);
    initial.tank_volume = fx(data.initial.tank_volume);
    for population in &data.initial.populations {
        let id = resolve_species(&builder, &population.species)?;
        initial.populations.push((id, fx(population.biomass)));
    }

    let registry = builder.build()?;
    Ok(JarDefinition { registry, initial })
}

fn resolve_species(
    builder: &RegistryBuilder,
    name: &str,
) -> Result<ecojar_core::species::SpeciesId, DataLoadError> {
    builder
        .species_id(name)
        .ok_or_else(|| DataLoadError::UnresolvedSpecies {
            name: name.to_string(),
        })
}

// ===========================================================================
// Tests
// ===========================================================================
