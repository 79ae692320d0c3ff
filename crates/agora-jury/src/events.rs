//! # Jury Events — The Durable Audit Trail
//!
//! Every committed pool operation appends exactly one event, with the
//! single exception of verdict bookkeeping for an exited juror, which
//! no-ops without a trace. Off-chain observers reconstruct juror history
//! from this log; no other persisted log exists.

use serde::{Deserialize, Serialize};

use agora_core::{AgentId, Amount, DisputeId};

/// An event emitted by a committed juror pool operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JuryEvent {
    /// A juror registered and posted stake.
    JurorRegistered {
        /// The new juror.
        agent: AgentId,
        /// Posted stake.
        stake: Amount,
        /// Reputation snapshot taken at registration.
        reputation: u64,
    },
    /// A juror withdrew and recovered its stake.
    JurorWithdrawn {
        /// The exiting juror.
        agent: AgentId,
        /// Stake returned.
        returned: Amount,
    },
    /// A committee was selected for a dispute.
    JurorsSelected {
        /// The dispute being adjudicated.
        dispute_id: DisputeId,
        /// The selected committee, in draw order.
        jurors: Vec<AgentId>,
    },
    /// A juror's verdict quality was recorded.
    VerdictRecorded {
        /// The adjudicating juror.
        agent: AgentId,
        /// Whether the verdict matched the final outcome.
        was_correct: bool,
    },
    /// A juror's stake was slashed.
    JurorSlashed {
        /// The slashed juror.
        agent: AgentId,
        /// Amount actually deducted (after clamping to posted stake).
        slashed: Amount,
        /// Stake remaining after the deduction.
        remaining: Amount,
        /// Whether the remainder fell below the minimum and the juror was
        /// deactivated as a side effect.
        deactivated: bool,
    },
}
