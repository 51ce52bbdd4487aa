//! Read-only snapshot types for presentation layers (HUD, console, graphs).
//!
//! Snapshots copy current values out of the engine; they never expose
//! mutable access and hold no references into simulation state.

use crate::fixed::{Fixed64, Ticks};
use crate::pool::Pool;

/// One pool's current level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolSnapshot {
    pub pool: Pool,
    pub level: Fixed64,
}

/// One species' current biomass.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationSnapshot {
    pub name: String,
    pub biomass: Fixed64,
}

/// A presentation-ready snapshot of the whole jar.
#[derive(Debug, Clone, PartialEq)]
pub struct JarSnapshot {
    pub tick: Ticks,
    pub elapsed_seconds: Fixed64,
    pub elapsed_days: u64,
    pub toxicity_level: Fixed64,
    pub light_intensity: Fixed64,
    /// All six pools, in storage order.
    pub pools: Vec<PoolSnapshot>,
    /// All registered species, in registration order.
    pub populations: Vec<PopulationSnapshot>,
}

impl JarSnapshot {
    /// Level of a pool in this snapshot.
    pub fn pool(&self, pool: Pool) -> Fixed64 {
        self.pools
            .iter()
            .find(|p| p.pool == pool)
            .map(|p| p.level)
            .unwrap_or(Fixed64::ZERO)
    }

    /// Biomass of a species in this snapshot (zero for unknown names).
    pub fn biomass(&self, name: &str) -> Fixed64 {
        self.populations
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.biomass)
            .unwrap_or(Fixed64::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64 as fx;

    fn sample() -> JarSnapshot {
        JarSnapshot {
            tick: 3,
            elapsed_seconds: fx(3.0),
            elapsed_days: 0,
            toxicity_level: fx(0.1),
            light_intensity: Fixed64::ONE,
            pools: vec![PoolSnapshot {
                pool: Pool::Oxygen,
                level: fx(21000.0),
            }],
            populations: vec![PopulationSnapshot {
                name: "algae".to_string(),
                biomass: fx(100.0),
            }],
        }
    }

    #[test]
    fn lookups_find_present_entries() {
        let snap = sample();
        assert_eq!(snap.pool(Pool::Oxygen), fx(21000.0));
        assert_eq!(snap.biomass("algae"), fx(100.0));
    }

    #[test]
    fn lookups_default_missing_entries_to_zero() {
        let snap = sample();
        assert_eq!(snap.pool(Pool::ToxicWaste), Fixed64::ZERO);
        assert_eq!(snap.biomass("kraken"), Fixed64::ZERO);
    }
}
