//! # Juror Records and Admission Constants
//!
//! A [`Juror`] is the pool's bookkeeping record for one staked participant.
//! Records outlive roster membership: a withdrawn or slashed-out juror keeps
//! its verdict history, and a slashed-below-minimum juror keeps its stake
//! remainder until it is separately withdrawn.

use serde::{Deserialize, Serialize};

use agora_core::{AgentId, Amount, Timestamp};

/// Minimum stake to register, and the floor below which a slashed juror is
/// deactivated.
pub const MIN_STAKE: Amount = 1_000;

/// Minimum reputation-oracle snapshot required for admission.
pub const MIN_REPUTATION: u64 = 50;

/// Snapshot value assumed when no reputation oracle is configured.
pub const DEFAULT_REPUTATION: u64 = 100;

/// A staked participant eligible for committee selection.
///
/// ## Invariants
///
/// - `active` implies `stake >= MIN_STAKE`. The converse does not hold: a
///   slashed-below-minimum juror is deactivated but may still hold a stake
///   remainder awaiting withdrawal.
/// - `cases_judged` and `correct_verdicts` are monotonically non-decreasing,
///   with `correct_verdicts <= cases_judged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Juror {
    /// The juror's participant identity.
    pub identity: AgentId,
    /// Currently posted collateral.
    pub stake: Amount,
    /// Reputation cached from the oracle at registration; not live-refreshed.
    pub reputation_snapshot: u64,
    /// Total disputes this juror has adjudicated.
    pub cases_judged: u64,
    /// Adjudications matching the final outcome.
    pub correct_verdicts: u64,
    /// Whether the juror is eligible for selection.
    pub active: bool,
    /// When the current registration was created.
    pub registered_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn juror_serde_roundtrip() {
        let juror = Juror {
            identity: AgentId::new("juror-1").unwrap(),
            stake: 5_000,
            reputation_snapshot: 80,
            cases_judged: 3,
            correct_verdicts: 2,
            active: true,
            registered_at: Timestamp::from_epoch_secs(1_700_000_000).unwrap(),
        };
        let json = serde_json::to_string(&juror).unwrap();
        let parsed: Juror = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, juror);
    }

    #[test]
    fn default_reputation_clears_the_admission_floor() {
        // Bootstrap mode (no oracle) must be able to admit jurors.
        assert!(DEFAULT_REPUTATION >= MIN_REPUTATION);
    }
}
