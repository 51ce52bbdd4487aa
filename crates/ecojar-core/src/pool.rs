//! The six resource pools of the jar and their scalar storage.
//!
//! Each pool is a non-negative mass/concentration scalar. Pools have no
//! upper bound; the tank volume scales concentration-dependent effects
//! instead of capping the pools themselves. Every commit clamps each pool
//! independently to a minimum of zero.

use crate::fixed::Fixed64;

/// Number of resource pools in the jar. The set is fixed for a session.
pub const POOL_COUNT: usize = 6;

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// One of the jar's chemical reservoirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    Oxygen,
    Co2,
    Nutrients,
    SoftDetritus,
    HardDetritus,
    ToxicWaste,
}

impl Pool {
    /// All pools, in the fixed storage order.
    pub const ALL: [Pool; POOL_COUNT] = [
        Pool::Oxygen,
        Pool::Co2,
        Pool::Nutrients,
        Pool::SoftDetritus,
        Pool::HardDetritus,
        Pool::ToxicWaste,
    ];

    /// Index into dense per-pool arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical snake_case name, as used in data files and mutator calls.
    pub fn name(self) -> &'static str {
        match self {
            Pool::Oxygen => "oxygen",
            Pool::Co2 => "co2",
            Pool::Nutrients => "nutrients",
            Pool::SoftDetritus => "soft_detritus",
            Pool::HardDetritus => "hard_detritus",
            Pool::ToxicWaste => "toxic_waste",
        }
    }

    /// Parse a canonical pool name. Unknown names return `None`; callers
    /// turn that into a refusal, never a default pool.
    pub fn parse(name: &str) -> Option<Pool> {
        Pool::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Whether this pool may appear as prey in a food-web edge.
    /// Only soft detritus and toxic waste are grazeable bulk sources.
    pub fn is_grazeable(self) -> bool {
        matches!(self, Pool::SoftDetritus | Pool::ToxicWaste)
    }
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// PoolLevels
// ---------------------------------------------------------------------------

/// Dense storage for the current level of every pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolLevels {
    levels: [Fixed64; POOL_COUNT],
}

impl PoolLevels {
    /// All pools at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of a pool.
    #[inline]
    pub fn get(&self, pool: Pool) -> Fixed64 {
        self.levels[pool.index()]
    }

    /// Set a pool level directly, clamping to zero. Used by setup mutators
    /// and initialization; the step engine goes through delta commits.
    pub fn set(&mut self, pool: Pool, value: Fixed64) {
        self.levels[pool.index()] = value.max(Fixed64::ZERO);
    }

    /// Add a (possibly negative) delta to a pool, clamping the result to zero.
    pub fn add_clamped(&mut self, pool: Pool, delta: Fixed64) {
        let slot = &mut self.levels[pool.index()];
        *slot = (*slot + delta).max(Fixed64::ZERO);
    }

    /// Iterate `(pool, level)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Pool, Fixed64)> + '_ {
        Pool::ALL.into_iter().map(|p| (p, self.get(p)))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64 as fx;

    #[test]
    fn parse_round_trips_all_names() {
        for pool in Pool::ALL {
            assert_eq!(Pool::parse(pool.name()), Some(pool));
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(Pool::parse("plutonium"), None);
        assert_eq!(Pool::parse("Oxygen"), None); // names are case-sensitive
        assert_eq!(Pool::parse(""), None);
    }

    #[test]
    fn only_detritus_and_waste_are_grazeable() {
        let grazeable: Vec<Pool> = Pool::ALL.into_iter().filter(|p| p.is_grazeable()).collect();
        assert_eq!(grazeable, vec![Pool::SoftDetritus, Pool::ToxicWaste]);
    }

    #[test]
    fn levels_start_at_zero() {
        let levels = PoolLevels::new();
        for (_, v) in levels.iter() {
            assert_eq!(v, Fixed64::ZERO);
        }
    }

    #[test]
    fn add_clamped_floors_at_zero() {
        let mut levels = PoolLevels::new();
        levels.set(Pool::Oxygen, fx(5.0));
        levels.add_clamped(Pool::Oxygen, fx(-20.0));
        assert_eq!(levels.get(Pool::Oxygen), Fixed64::ZERO);
    }

    #[test]
    fn set_clamps_negative_values() {
        let mut levels = PoolLevels::new();
        levels.set(Pool::Co2, fx(-1.0));
        assert_eq!(levels.get(Pool::Co2), Fixed64::ZERO);
    }

    #[test]
    fn pools_are_independent() {
        let mut levels = PoolLevels::new();
        levels.set(Pool::Nutrients, fx(3.0));
        levels.add_clamped(Pool::ToxicWaste, fx(1.5));
        assert_eq!(levels.get(Pool::Nutrients), fx(3.0));
        assert_eq!(levels.get(Pool::ToxicWaste), fx(1.5));
        assert_eq!(levels.get(Pool::SoftDetritus), Fixed64::ZERO);
    }
}
