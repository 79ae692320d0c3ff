//! # Task Lifecycle
//!
//! The task record and its lifecycle state machine. This module uses a
//! validated enum (runtime-checked) rather than a typestate encoding:
//! tasks live in a table keyed by [`TaskId`], are serialized for off-chain
//! observers, and their state is not known at compile time at any call site.
//!
//! ## Transition Graph
//!
//! ```text
//! Created ──accept_task()──▶ Accepted ──submit_result()──▶ Submitted
//!                                                              │
//!                                 ┌────────────────────────────┤
//!                                 │                            │
//!                         approve_result() /           dispute_result()
//!                         claim_after_timeout()                │
//!                                 │                            ▼
//!                                 ▼                        Disputed
//!                             Completed ◀──resolve_for_worker()─┤
//!                                                               │
//!                              Refunded ◀──resolve_for_client()─┘
//! ```
//!
//! `Completed` and `Refunded` are terminal. `Verified` is reserved for
//! coordinator extensibility — no transition in this core produces it.

use serde::{Deserialize, Serialize};

use agora_core::{AgentId, Amount, ContentDigest, TaskId, Timestamp};

/// The lifecycle state of an escrowed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Task created and payment escrowed; awaiting a worker.
    Created,
    /// A worker has posted stake and taken the task.
    Accepted,
    /// The worker has submitted a result; awaiting client verdict.
    Submitted,
    /// Reserved for coordinator extensibility; unreachable in this core.
    Verified,
    /// The client has disputed the result; awaiting coordinator resolution.
    Disputed,
    /// Settled in the worker's favor. Terminal state.
    Completed,
    /// Settled in the client's favor. Terminal state.
    Refunded,
}

impl TaskState {
    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Accepted => "ACCEPTED",
            Self::Submitted => "SUBMITTED",
            Self::Verified => "VERIFIED",
            Self::Disputed => "DISPUTED",
            Self::Completed => "COMPLETED",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Whether this state is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Refunded)
    }

    /// Valid target states from this state.
    pub fn valid_transitions(&self) -> &'static [TaskState] {
        match self {
            Self::Created => &[Self::Accepted],
            Self::Accepted => &[Self::Submitted],
            Self::Submitted => &[Self::Completed, Self::Disputed],
            Self::Disputed => &[Self::Completed, Self::Refunded],
            // Reserved: nothing transitions into or out of Verified here.
            Self::Verified => &[],
            Self::Completed | Self::Refunded => &[],
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of paid work with escrowed funds.
///
/// ## Invariants
///
/// - `payment > 0` always (enforced at creation, immutable afterward).
/// - `worker` and `worker_stake` are set exactly once, at acceptance;
///   the stake is only released as part of an atomic terminal payout.
/// - `submitted_at` is set exactly once, at submission, and anchors the
///   verification-timeout eligibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// The identity that created and funded the task.
    pub client: AgentId,
    /// The identity that accepted the task; absent until acceptance.
    pub worker: Option<AgentId>,
    /// Escrowed payment, fixed at creation.
    pub payment: Amount,
    /// Worker collateral, fixed at acceptance (zero before).
    pub worker_stake: Amount,
    /// Content hash of the off-chain task specification. Stored, never
    /// validated.
    pub spec_hash: ContentDigest,
    /// Content hash of the off-chain result; absent until submission.
    pub result_hash: Option<ContentDigest>,
    /// Current lifecycle state.
    pub state: TaskState,
    /// When the task was created.
    pub created_at: Timestamp,
    /// When the result was submitted; absent until submission.
    pub submitted_at: Option<Timestamp>,
}

impl Task {
    /// The combined settlement pool: `payment + worker_stake`.
    ///
    /// This is the exact amount paid out on every terminal transition,
    /// whichever party receives it.
    pub fn settlement_pool(&self) -> Option<Amount> {
        self.payment.checked_add(self.worker_stake)
    }
}
