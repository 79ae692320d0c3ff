//! # agora-escrow — Escrow Ledger
//!
//! Custody of per-task funds and enforcement of a strict lifecycle that
//! prevents any payout outside the defined terminal transitions:
//!
//! - **Error** ([`error`]): Structured error hierarchy for the escrow
//!   subsystem — every rejected precondition has a distinct variant.
//!
//! - **Task** ([`task`]): The task record and its lifecycle state machine,
//!   `Created → Accepted → Submitted → {Completed, Disputed}` with
//!   `Disputed → {Completed, Refunded}`.
//!
//! - **Events** ([`events`]): The append-only audit trail emitted for
//!   off-chain observers; the only persisted log.
//!
//! - **Ledger** ([`ledger`]): The [`EscrowLedger`] itself — operation entry
//!   points, caller authentication, payout paths, and the reentrancy guard.
//!
//! The ledger is invoked by clients, workers, and the external dispute
//! coordinator; it never calls out except through the [`agora_core::Bank`]
//! value-transfer seam.

pub mod error;
pub mod events;
pub mod ledger;
pub mod task;

// Re-export primary types for ergonomic imports.
pub use error::EscrowError;
pub use events::EscrowEvent;
pub use ledger::{required_stake, EscrowLedger, STAKE_PERCENT, VERIFICATION_TIMEOUT_SECS};
pub use task::{Task, TaskState};
