//! # Bank — The Value-Transfer Seam
//!
//! All custody movement in the settlement core flows through the [`Bank`]
//! trait: escrowing a payment, posting a stake, paying out a settlement,
//! returning a juror's collateral. The ledgers never hold balances
//! themselves — they hold a custody *account identity* whose balance lives
//! in the bank.
//!
//! ## Failure Contract
//!
//! [`Bank::transfer`] is fallible. Both ledgers follow checks-effects-
//! interactions ordering: state is mutated first, the transfer is attempted
//! last, and a transfer failure aborts the whole operation with state
//! restored to its pre-call value. No partial payout is ever observable.
//!
//! [`InMemoryBank`] is the reference implementation used by tests and
//! bootstrap deployments; production embeds the native-currency ledger of
//! the execution environment behind the same trait.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::AgentId;

/// A native-currency amount, in the smallest indivisible unit.
pub type Amount = u128;

/// Error raised by a failed or rejected value transfer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    /// The source account does not hold the requested amount.
    #[error("insufficient funds in {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        /// The debited account.
        account: AgentId,
        /// The amount requested.
        requested: Amount,
        /// The amount actually available.
        available: Amount,
    },

    /// Crediting the destination would overflow its balance.
    #[error("balance overflow crediting {account}")]
    BalanceOverflow {
        /// The credited account.
        account: AgentId,
    },

    /// The transfer was rejected by the receiving side or the underlying
    /// currency ledger.
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// The single seam through which value moves.
pub trait Bank {
    /// The balance currently held by `account`. Unknown accounts hold zero.
    fn balance_of(&self, account: &AgentId) -> Amount;

    /// Move `amount` from `from` to `to`.
    ///
    /// Either fully succeeds or fully fails — a failed transfer must leave
    /// both balances untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`BankError`] if the source balance is insufficient, the
    /// destination would overflow, or the underlying ledger rejects the
    /// movement.
    fn transfer(&mut self, from: &AgentId, to: &AgentId, amount: Amount) -> Result<(), BankError>;
}

/// In-memory balance ledger for tests and bootstrap deployments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryBank {
    balances: HashMap<AgentId, Amount>,
}

impl InMemoryBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account out of thin air. Test/bootstrap funding only.
    pub fn mint(&mut self, account: &AgentId, amount: Amount) {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

impl Bank for InMemoryBank {
    fn balance_of(&self, account: &AgentId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &AgentId, to: &AgentId, amount: Amount) -> Result<(), BankError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(BankError::InsufficientFunds {
                account: from.clone(),
                requested: amount,
                available,
            });
        }
        // Self-transfers are a no-op once the balance check passes.
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| BankError::BalanceOverflow { account: to.clone() })?;
        self.balances.insert(from.clone(), available - amount);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }
}
