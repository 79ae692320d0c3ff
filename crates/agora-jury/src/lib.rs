//! # agora-jury — Juror Pool
//!
//! Admission control, stake custody, and randomized exclusion-aware
//! selection of dispute committees:
//!
//! - **Error** ([`error`]): Structured error hierarchy for the pool —
//!   every rejected precondition has a distinct variant.
//!
//! - **Juror** ([`juror`]): The juror record, admission constants, and the
//!   active/stake invariant.
//!
//! - **Selection** ([`selection`]): The deterministic seed-mixing draw
//!   loop, isolated as pure functions for testing without a pool.
//!
//! - **Events** ([`events`]): The append-only audit trail emitted for
//!   off-chain observers.
//!
//! - **Pool** ([`pool`]): The [`JurorPool`] itself — registration,
//!   withdrawal, committee draws, verdict accounting, and slashing.
//!
//! The pool is invoked by registering jurors and by the external dispute
//! coordinator; like the escrow ledger, it never calls out except through
//! the [`agora_core::Bank`] value-transfer seam and the read-only
//! [`ReputationOracle`].

pub mod error;
pub mod events;
pub mod juror;
pub mod pool;
pub mod selection;

// Re-export primary types for ergonomic imports.
pub use error::JuryError;
pub use events::JuryEvent;
pub use juror::{Juror, DEFAULT_REPUTATION, MIN_REPUTATION, MIN_STAKE};
pub use pool::{JurorPool, ReputationOracle};
pub use selection::{advance_seed, derive_seed, select_indices, SELECTION_ATTEMPT_FACTOR};
