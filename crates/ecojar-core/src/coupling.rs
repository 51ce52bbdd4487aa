//! Auxiliary density-dependent couplings between species.
//!
//! These are cross-species effects that are not expressible as predation:
//! they adjust the growth *rate* a species realizes in the metabolism
//! stage ("fewer births"), never its standing biomass ("more deaths").
//! Rules live in the registry as an explicit named list and are evaluated
//! in a fixed sub-stage, so new couplings slot in without touching the
//! general species loop.

use crate::fixed::Fixed64;
use crate::pool::Pool;
use crate::species::SpeciesId;

/// One auxiliary coupling rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouplingRule {
    /// The predator consumes the prey's offspring (eggs, spores) rather
    /// than standing biomass: the prey's growth rate is reduced by
    /// `predator biomass * rate`.
    ReproductionSuppression {
        predator: SpeciesId,
        prey: SpeciesId,
        rate: Fixed64,
    },
    /// The species reproduces faster when a detritus pool is plentiful:
    /// its growth rate gains `rate` scaled by the pool's saturation ratio.
    DetritusGrowthBonus {
        species: SpeciesId,
        pool: Pool,
        rate: Fixed64,
    },
}

impl CouplingRule {
    /// Species ids this rule references, for load-time validation.
    pub fn species_refs(&self) -> impl Iterator<Item = SpeciesId> {
        match *self {
            CouplingRule::ReproductionSuppression { predator, prey, .. } => {
                [Some(predator), Some(prey)]
            }
            CouplingRule::DetritusGrowthBonus { species, .. } => [Some(species), None],
        }
        .into_iter()
        .flatten()
    }

    /// The rule's rate coefficient, for load-time validation.
    pub fn rate(&self) -> Fixed64 {
        match *self {
            CouplingRule::ReproductionSuppression { rate, .. } => rate,
            CouplingRule::DetritusGrowthBonus { rate, .. } => rate,
        }
    }
}

/// Per-species signed growth-rate adjustments accumulated by the coupling
/// stage and consumed by the metabolism stage.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthAdjustments {
    rates: Vec<Fixed64>,
}

impl GrowthAdjustments {
    pub fn new(species_count: usize) -> Self {
        Self {
            rates: vec![Fixed64::ZERO; species_count],
        }
    }

    /// Net rate adjustment for a species (positive = bonus, negative =
    /// suppression). The metabolism stage floors the adjusted rate at zero.
    #[inline]
    pub fn rate_for(&self, id: SpeciesId) -> Fixed64 {
        self.rates[id.index()]
    }

    pub fn add(&mut self, id: SpeciesId, delta: Fixed64) {
        self.rates[id.index()] += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64 as fx;

    #[test]
    fn suppression_references_both_species() {
        let rule = CouplingRule::ReproductionSuppression {
            predator: SpeciesId(3),
            prey: SpeciesId(1),
            rate: fx(0.001),
        };
        let refs: Vec<SpeciesId> = rule.species_refs().collect();
        assert_eq!(refs, vec![SpeciesId(3), SpeciesId(1)]);
    }

    #[test]
    fn bonus_references_one_species() {
        let rule = CouplingRule::DetritusGrowthBonus {
            species: SpeciesId(2),
            pool: Pool::SoftDetritus,
            rate: fx(0.002),
        };
        let refs: Vec<SpeciesId> = rule.species_refs().collect();
        assert_eq!(refs, vec![SpeciesId(2)]);
    }

    #[test]
    fn adjustments_accumulate_signed() {
        let mut adj = GrowthAdjustments::new(2);
        adj.add(SpeciesId(0), fx(0.002));
        adj.add(SpeciesId(0), fx(-0.005));
        assert_eq!(adj.rate_for(SpeciesId(0)), fx(-0.003));
        assert_eq!(adj.rate_for(SpeciesId(1)), Fixed64::ZERO);
    }
}
