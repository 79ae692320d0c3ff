//! # Error Types — Escrow Preconditions as Hard Aborts
//!
//! Every precondition failure in the escrow ledger is a typed rejection with
//! distinct message text: state mismatch, wrong caller, invalid amounts,
//! timeout not elapsed, failed value transfer, reentrant entry. A rejected
//! operation leaves the ledger exactly as it was before the call.

use thiserror::Error;

use agora_core::{Amount, AgentId, BankError, ReentrancyError, TaskId, Timestamp};

use crate::task::TaskState;

/// Errors raised by escrow ledger operations.
#[derive(Error, Debug)]
pub enum EscrowError {
    /// No task exists with the given id.
    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    /// The task is not in the state the operation requires.
    #[error("invalid transition for {task_id}: {from} -> {to}: {reason}")]
    InvalidTransition {
        /// The task being operated on.
        task_id: TaskId,
        /// Current task state.
        from: TaskState,
        /// Attempted target state.
        to: TaskState,
        /// Why the transition was rejected.
        reason: String,
    },

    /// The caller is not the task's client.
    #[error("caller {caller} is not the client of {task_id}")]
    NotClient {
        /// The task being operated on.
        task_id: TaskId,
        /// The rejected caller.
        caller: AgentId,
    },

    /// The caller is not the task's worker.
    #[error("caller {caller} is not the worker of {task_id}")]
    NotWorker {
        /// The task being operated on.
        task_id: TaskId,
        /// The rejected caller.
        caller: AgentId,
    },

    /// The caller is not the configured owner.
    #[error("caller {caller} is not the ledger owner")]
    NotOwner {
        /// The rejected caller.
        caller: AgentId,
    },

    /// The caller is not the configured dispute coordinator.
    #[error("caller {caller} is not the dispute coordinator")]
    NotCoordinator {
        /// The rejected caller.
        caller: AgentId,
    },

    /// No dispute coordinator has been configured yet.
    #[error("dispute coordinator has not been configured")]
    CoordinatorUnset,

    /// The coordinator is a one-time bring-up configuration.
    #[error("dispute coordinator is already configured")]
    CoordinatorAlreadySet,

    /// A client may not accept its own task as worker.
    #[error("client cannot accept its own task {task_id}")]
    SelfAcceptance {
        /// The task being operated on.
        task_id: TaskId,
    },

    /// Task payment must be positive.
    #[error("payment must be greater than zero")]
    InvalidPayment,

    /// The offered worker stake is below the required floor.
    #[error("stake too low: offered {offered}, required {required}")]
    StakeTooLow {
        /// The minimum acceptable stake.
        required: Amount,
        /// The stake actually offered.
        offered: Amount,
    },

    /// The verification timeout has not strictly elapsed.
    #[error("verification timeout has not elapsed: claimable strictly after {deadline}")]
    TimeoutNotElapsed {
        /// The instant after which the claim becomes valid.
        deadline: Timestamp,
    },

    /// Payment plus stake exceeded the representable amount range.
    #[error("amount arithmetic overflow")]
    AmountOverflow,

    /// The underlying value transfer failed; the operation was aborted.
    #[error("value transfer failed: {0}")]
    Transfer(#[from] BankError),

    /// A guarded operation was entered reentrantly.
    #[error(transparent)]
    Reentrancy(#[from] ReentrancyError),
}
