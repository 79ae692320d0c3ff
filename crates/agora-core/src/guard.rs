//! # Reentrancy Guard — Scoped Per-Ledger Exclusive Flag
//!
//! A value transfer triggered mid-operation must not be allowed to re-enter
//! a guarded operation of the same ledger before the triggering operation
//! has committed. Each ledger holds one [`ReentrancyLock`]; every guarded
//! public operation acquires it on entry and holds the returned
//! [`ReentrancyGuard`] for the duration of the call.
//!
//! The flag is released in `Drop`, so every exit path — early precondition
//! failure, transfer failure, success — releases it. No exit path can leave
//! the ledger locked.

use std::cell::Cell;

use thiserror::Error;

/// Error raised when a guarded operation is entered while another guarded
/// operation of the same ledger is still in flight.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReentrancyError {
    /// Nested entry into a guarded operation.
    #[error("reentrant call rejected: another guarded operation is in flight")]
    Reentered,
}

/// Per-ledger exclusive flag guarding against reentrant self-calls.
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    engaged: Cell<bool>,
}

impl ReentrancyLock {
    /// Create a released lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for the duration of one operation.
    ///
    /// # Errors
    ///
    /// Returns [`ReentrancyError::Reentered`] if the lock is already held.
    pub fn enter(&self) -> Result<ReentrancyGuard<'_>, ReentrancyError> {
        if self.engaged.replace(true) {
            return Err(ReentrancyError::Reentered);
        }
        Ok(ReentrancyGuard { lock: self })
    }

    /// Whether a guarded operation is currently in flight.
    pub fn is_engaged(&self) -> bool {
        self.engaged.get()
    }
}

/// RAII handle holding a [`ReentrancyLock`]; releases on drop.
#[derive(Debug)]
pub struct ReentrancyGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.lock.engaged.set(false);
    }
}
