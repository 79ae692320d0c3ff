//! # Error Types — Pool Preconditions as Hard Aborts
//!
//! Every precondition failure in the juror pool is a typed rejection with
//! distinct message text. A rejected operation leaves the pool exactly as
//! it was before the call. The single intentional exception — verdict
//! bookkeeping for an exited juror — is a silent no-op by design and does
//! not appear here.

use thiserror::Error;

use agora_core::{AgentId, Amount, BankError, ReentrancyError};

/// Errors raised by juror pool operations.
#[derive(Error, Debug)]
pub enum JuryError {
    /// The caller already holds an active registration.
    #[error("juror {caller} is already registered and active")]
    AlreadyRegistered {
        /// The rejected caller.
        caller: AgentId,
    },

    /// A deactivated record still holds stake from a prior registration.
    #[error("juror {caller} has stranded stake from a prior registration; withdraw it before re-registering")]
    StrandedStake {
        /// The rejected caller.
        caller: AgentId,
    },

    /// The offered stake is below the admission floor.
    #[error("stake too low: offered {offered}, required {required}")]
    StakeTooLow {
        /// The minimum admissible stake.
        required: Amount,
        /// The stake actually offered.
        offered: Amount,
    },

    /// The caller's reputation snapshot is below the admission floor.
    #[error("insufficient reputation: have {actual}, required {required}")]
    InsufficientReputation {
        /// The minimum admissible reputation.
        required: u64,
        /// The oracle snapshot taken at registration time.
        actual: u64,
    },

    /// No juror record exists for the given identity.
    #[error("unknown juror {0}")]
    UnknownJuror(AgentId),

    /// The juror record holds no stake to return.
    #[error("juror {caller} has no stake to withdraw")]
    NothingToWithdraw {
        /// The rejected caller.
        caller: AgentId,
    },

    /// The target juror is not active.
    #[error("juror {agent} is not active")]
    NotActive {
        /// The inactive juror.
        agent: AgentId,
    },

    /// The caller is not the configured owner.
    #[error("caller {caller} is not the pool owner")]
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

    /// Fewer active jurors than the requested committee size.
    #[error("not enough jurors: {available} active, {requested} requested")]
    NotEnoughJurors {
        /// Active jurors available for selection.
        available: usize,
        /// Committee size requested.
        requested: usize,
    },

    /// The bounded attempt budget ran out before the committee filled.
    #[error("could not select enough jurors: {requested} requested, budget of {attempts} attempts exhausted")]
    SelectionExhausted {
        /// Attempts consumed (the full budget).
        attempts: u64,
        /// Committee size requested.
        requested: usize,
    },

    /// The underlying value transfer failed; the operation was aborted.
    #[error("value transfer failed: {0}")]
    Transfer(#[from] BankError),

    /// A guarded operation was entered reentrantly.
    #[error(transparent)]
    Reentrancy(#[from] ReentrancyError),
}
