//! Setup-phase editing commands and their refusal diagnostics.
//!
//! Commands are submitted by the jar editor (UI, scripting) and applied
//! immediately -- setup mutation bypasses the step engine's delta batching.
//! Every refusal is local and recoverable: state is unchanged, the caller
//! gets a [`CommandError`], and a `CommandRefused` event is emitted for
//! any listening console/HUD layer.

use crate::fixed::Fixed64;

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A single setup-phase operation on the jar.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupCommand {
    /// Add one configured unit of biomass for a species.
    AddOrganism { species: String },
    /// Remove one unit of biomass, refusing if insufficient biomass exists.
    RemoveOrganism { species: String },
    /// Add a quantity to a named resource pool.
    AddResource { pool: String, amount: Fixed64 },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a command (or an advance request) was refused. Non-fatal by design;
/// there is no condition under which the core terminates the process.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("operation requires the setup phase; the jar is sealed")]
    PhaseLocked,
    #[error("unknown species: '{0}'")]
    UnknownSpecies(String),
    #[error("unknown resource pool: '{0}'")]
    UnknownPool(String),
    #[error("cannot remove one '{species}' unit: {available} biomass available, {required} required")]
    InsufficientBiomass {
        species: String,
        available: Fixed64,
        required: Fixed64,
    },
    #[error("resource amount must not be negative")]
    NegativeAmount,
}

/// Compact, copyable refusal tag carried by `CommandRefused` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    PhaseLocked,
    UnknownSpecies,
    UnknownPool,
    InsufficientBiomass,
    NegativeAmount,
}

impl CommandError {
    /// The event tag for this refusal.
    pub fn refusal(&self) -> RefusalReason {
        match self {
            CommandError::PhaseLocked => RefusalReason::PhaseLocked,
            CommandError::UnknownSpecies(_) => RefusalReason::UnknownSpecies,
            CommandError::UnknownPool(_) => RefusalReason::UnknownPool,
            CommandError::InsufficientBiomass { .. } => RefusalReason::InsufficientBiomass,
            CommandError::NegativeAmount => RefusalReason::NegativeAmount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64 as fx;

    #[test]
    fn error_display_messages() {
        let err = CommandError::UnknownSpecies("kraken".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("unknown species"), "got: {msg}");
        assert!(msg.contains("kraken"), "got: {msg}");

        let err = CommandError::InsufficientBiomass {
            species: "snail".to_string(),
            available: fx(2.0),
            required: fx(5.0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("snail"), "got: {msg}");
    }

    #[test]
    fn refusal_tags_match_variants() {
        assert_eq!(
            CommandError::PhaseLocked.refusal(),
            RefusalReason::PhaseLocked
        );
        assert_eq!(
            CommandError::UnknownPool("x".into()).refusal(),
            RefusalReason::UnknownPool
        );
        assert_eq!(
            CommandError::NegativeAmount.refusal(),
            RefusalReason::NegativeAmount
        );
    }
}
