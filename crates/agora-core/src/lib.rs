//! # agora-core — Foundational Types for the Agora Settlement Core
//!
//! This crate is the bedrock of the Agora settlement workspace. It defines
//! the type-system primitives shared by the escrow ledger and the juror
//! pool; both depend on `agora-core`, and it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** [`AgentId`], [`TaskId`],
//!    [`DisputeId`] — validated constructors, no bare strings or bare
//!    integers for identifiers.
//!
//! 2. **One value-transfer seam.** All custody movement flows through the
//!    [`Bank`] trait. A failed transfer is the only interaction failure the
//!    ledgers have to reason about, and every caller treats it as a hard
//!    abort.
//!
//! 3. **UTC-only timestamps.** The [`Timestamp`] type enforces UTC with
//!    seconds precision. Operation eligibility (timeouts) is evaluated
//!    against caller-supplied timestamps, never wall-clock reads inside an
//!    operation.
//!
//! 4. **Explicit reentrancy guard.** [`ReentrancyLock`] gives each ledger a
//!    per-instance exclusive flag with scoped RAII release, the settlement
//!    analogue of a per-contract reentrancy lock.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `agora-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public state types derive `Debug`, `Clone`, `Serialize`/`Deserialize`.

pub mod bank;
pub mod digest;
pub mod error;
pub mod guard;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use bank::{Amount, Bank, BankError, InMemoryBank};
pub use digest::ContentDigest;
pub use error::CoreError;
pub use guard::{ReentrancyError, ReentrancyGuard, ReentrancyLock};
pub use identity::{AgentId, DisputeId, TaskId};
pub use temporal::Timestamp;
