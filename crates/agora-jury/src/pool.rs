//! # Juror Pool — Admission, Custody, and Committee Draws
//!
//! The [`JurorPool`] owns juror stakes and identity records and exposes the
//! selection primitive the dispute coordinator consumes once per dispute.
//!
//! ## Roster Bookkeeping
//!
//! Jurors live in a record map plus an order-unstable dense roster with an
//! identity-to-slot map, so removal is O(1) swap-with-last. The two
//! structures are kept mutually consistent at every commit point: each
//! rostered identity's recorded slot points at its current position, and
//! each slot's occupant maps back to that slot. Records outlive roster
//! membership — verdict history survives withdrawal, and a
//! slashed-below-minimum juror keeps its stake remainder (and stays in the
//! roster, selection-blocked by the `active` flag) until it withdraws.
//!
//! ## Failure Semantics
//!
//! As in the escrow ledger, outbound payouts follow
//! checks-effects-interactions ordering: the record and roster are mutated
//! before the stake-return transfer runs, and a refused transfer restores
//! both. Restoration re-appends to the roster tail; the roster is
//! order-unstable, so the position change is unobservable.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info};

use agora_core::{AgentId, Amount, Bank, DisputeId, ReentrancyLock, Timestamp};

use crate::error::JuryError;
use crate::events::JuryEvent;
use crate::juror::{Juror, DEFAULT_REPUTATION, MIN_REPUTATION, MIN_STAKE};
use crate::selection::{self, SELECTION_ATTEMPT_FACTOR};

/// Read-only reputation source, consulted exactly once per registration.
///
/// The returned value is cached on the juror record as a snapshot; it is
/// never refreshed, so later reputation changes do not affect an existing
/// registration.
pub trait ReputationOracle {
    /// The current reputation summary value for `agent`.
    fn reputation_of(&self, agent: &AgentId) -> u64;
}

/// The juror pool.
///
/// Administrative wiring mirrors the escrow ledger: owner and custody
/// account fixed at construction, coordinator configured once via
/// [`JurorPool::set_coordinator`]. The reputation oracle is optional —
/// without one, every registrant snapshots [`DEFAULT_REPUTATION`]
/// (bootstrap/test mode).
pub struct JurorPool {
    owner: AgentId,
    pool_account: AgentId,
    coordinator: Option<AgentId>,
    jurors: HashMap<AgentId, Juror>,
    roster: Vec<AgentId>,
    slots: HashMap<AgentId, usize>,
    events: Vec<JuryEvent>,
    lock: ReentrancyLock,
    oracle: Option<Box<dyn ReputationOracle>>,
}

impl fmt::Debug for JurorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JurorPool")
            .field("owner", &self.owner)
            .field("pool_account", &self.pool_account)
            .field("coordinator", &self.coordinator)
            .field("jurors", &self.jurors.len())
            .field("roster", &self.roster)
            .field("oracle", &self.oracle.is_some())
            .finish_non_exhaustive()
    }
}

impl JurorPool {
    /// Create an empty pool with no reputation oracle: every registrant
    /// snapshots [`DEFAULT_REPUTATION`].
    pub fn new(owner: AgentId, pool_account: AgentId) -> Self {
        Self {
            owner,
            pool_account,
            coordinator: None,
            jurors: HashMap::new(),
            roster: Vec::new(),
            slots: HashMap::new(),
            events: Vec::new(),
            lock: ReentrancyLock::new(),
            oracle: None,
        }
    }

    /// Create an empty pool that snapshots reputation from `oracle` at each
    /// registration.
    pub fn with_oracle(
        owner: AgentId,
        pool_account: AgentId,
        oracle: Box<dyn ReputationOracle>,
    ) -> Self {
        let mut pool = Self::new(owner, pool_account);
        pool.oracle = Some(oracle);
        pool
    }

    /// One-time bring-up configuration of the dispute coordinator identity.
    ///
    /// # Errors
    ///
    /// - [`JuryError::NotOwner`] unless called by the owner.
    /// - [`JuryError::CoordinatorAlreadySet`] on reconfiguration attempts.
    pub fn set_coordinator(
        &mut self,
        caller: &AgentId,
        coordinator: AgentId,
    ) -> Result<(), JuryError> {
        if *caller != self.owner {
            return Err(JuryError::NotOwner { caller: caller.clone() });
        }
        if self.coordinator.is_some() {
            return Err(JuryError::CoordinatorAlreadySet);
        }
        debug!(coordinator = %coordinator, "pool coordinator configured");
        self.coordinator = Some(coordinator);
        Ok(())
    }

    /// Register the caller as an active juror, posting `stake_offered`.
    ///
    /// The reputation snapshot is taken here, once, and cached on the
    /// record.
    ///
    /// # Errors
    ///
    /// - [`JuryError::AlreadyRegistered`] if the caller is already active.
    /// - [`JuryError::StrandedStake`] if a deactivated prior registration
    ///   still holds stake — it must be withdrawn first, or the new
    ///   registration would overwrite and strand it.
    /// - [`JuryError::StakeTooLow`] below [`MIN_STAKE`].
    /// - [`JuryError::InsufficientReputation`] below [`MIN_REPUTATION`].
    /// - [`JuryError::Transfer`] if the stake cannot be funded; nothing is
    ///   recorded.
    pub fn register(
        &mut self,
        caller: &AgentId,
        stake_offered: Amount,
        now: Timestamp,
        bank: &mut dyn Bank,
    ) -> Result<(), JuryError> {
        let _guard = self.lock.enter()?;
        if let Some(record) = self.jurors.get(caller) {
            if record.active {
                return Err(JuryError::AlreadyRegistered { caller: caller.clone() });
            }
            if record.stake > 0 {
                return Err(JuryError::StrandedStake { caller: caller.clone() });
            }
        }
        if stake_offered < MIN_STAKE {
            return Err(JuryError::StakeTooLow {
                required: MIN_STAKE,
                offered: stake_offered,
            });
        }
        let reputation = match &self.oracle {
            Some(oracle) => oracle.reputation_of(caller),
            None => DEFAULT_REPUTATION,
        };
        if reputation < MIN_REPUTATION {
            return Err(JuryError::InsufficientReputation {
                required: MIN_REPUTATION,
                actual: reputation,
            });
        }
        bank.transfer(caller, &self.pool_account, stake_offered)?;

        // Overwrites any exhausted prior record, counters included.
        self.jurors.insert(
            caller.clone(),
            Juror {
                identity: caller.clone(),
                stake: stake_offered,
                reputation_snapshot: reputation,
                cases_judged: 0,
                correct_verdicts: 0,
                active: true,
                registered_at: now,
            },
        );
        self.slots.insert(caller.clone(), self.roster.len());
        self.roster.push(caller.clone());
        debug!(agent = %caller, stake = stake_offered, reputation, "juror registered");
        self.events.push(JuryEvent::JurorRegistered {
            agent: caller.clone(),
            stake: stake_offered,
            reputation,
        });
        Ok(())
    }

    /// Withdraw the caller's full posted stake and leave the roster.
    ///
    /// Available to active jurors and to deactivated-by-slashing jurors
    /// reclaiming a remainder. The record itself survives, retaining
    /// verdict history.
    ///
    /// # Errors
    ///
    /// - [`JuryError::UnknownJuror`] with no record at all.
    /// - [`JuryError::NothingToWithdraw`] if the record holds no stake.
    /// - [`JuryError::Transfer`] if the stake return is refused; the record
    ///   and roster membership are restored.
    pub fn withdraw(&mut self, caller: &AgentId, bank: &mut dyn Bank) -> Result<(), JuryError> {
        let _guard = self.lock.enter()?;
        let pool_account = self.pool_account.clone();
        let record = self
            .jurors
            .get_mut(caller)
            .ok_or_else(|| JuryError::UnknownJuror(caller.clone()))?;
        if record.stake == 0 {
            return Err(JuryError::NothingToWithdraw { caller: caller.clone() });
        }
        let amount = record.stake;
        let was_active = record.active;
        record.stake = 0;
        record.active = false;
        let was_rostered = roster_remove(&mut self.roster, &mut self.slots, caller);

        if let Err(err) = bank.transfer(&pool_account, caller, amount) {
            if let Some(record) = self.jurors.get_mut(caller) {
                record.stake = amount;
                record.active = was_active;
            }
            if was_rostered {
                self.slots.insert(caller.clone(), self.roster.len());
                self.roster.push(caller.clone());
            }
            return Err(JuryError::Transfer(err));
        }
        info!(agent = %caller, returned = amount, "juror withdrew");
        self.events.push(JuryEvent::JurorWithdrawn {
            agent: caller.clone(),
            returned: amount,
        });
        Ok(())
    }

    /// Select `count` distinct active jurors for a dispute, excluding the
    /// two disputing parties. Coordinator only.
    ///
    /// `entropy` is caller-supplied draw entropy, typically block-level
    /// randomness from the embedding runtime. The draw is deterministic given
    /// `(entropy, dispute_id)` and the current roster.
    ///
    /// # Errors
    ///
    /// - [`JuryError::CoordinatorUnset`] / [`JuryError::NotCoordinator`]
    ///   unless called by the configured coordinator.
    /// - [`JuryError::NotEnoughJurors`] if fewer than `count` jurors are
    ///   active.
    /// - [`JuryError::SelectionExhausted`] if the attempt budget
    ///   (`3 × roster length`) runs out before the committee fills; never
    ///   a short list.
    pub fn select_jurors(
        &mut self,
        caller: &AgentId,
        dispute_id: DisputeId,
        count: usize,
        exclude_a: &AgentId,
        exclude_b: &AgentId,
        entropy: &[u8],
    ) -> Result<Vec<AgentId>, JuryError> {
        let _guard = self.lock.enter()?;
        require_coordinator(self.coordinator.as_ref(), caller)?;
        let available = self
            .roster
            .iter()
            .filter(|agent| self.jurors.get(*agent).is_some_and(|j| j.active))
            .count();
        if available < count {
            return Err(JuryError::NotEnoughJurors {
                available,
                requested: count,
            });
        }

        let seed = selection::derive_seed(entropy, dispute_id);
        let max_attempts = SELECTION_ATTEMPT_FACTOR * self.roster.len() as u64;
        let roster = &self.roster;
        let jurors = &self.jurors;
        let picked = selection::select_indices(seed, roster.len(), count, max_attempts, |idx| {
            let candidate = &roster[idx];
            candidate != exclude_a
                && candidate != exclude_b
                && jurors.get(candidate).is_some_and(|j| j.active)
        })
        .ok_or(JuryError::SelectionExhausted {
            attempts: max_attempts,
            requested: count,
        })?;

        let committee: Vec<AgentId> = picked.into_iter().map(|i| self.roster[i].clone()).collect();
        info!(dispute = %dispute_id, size = committee.len(), "committee selected");
        self.events.push(JuryEvent::JurorsSelected {
            dispute_id,
            jurors: committee.clone(),
        });
        Ok(committee)
    }

    /// Record one juror's verdict quality after a dispute resolves.
    /// Coordinator only.
    ///
    /// Unknown or exited jurors are a silent no-op: verdict bookkeeping on
    /// a juror that left mid-dispute is discarded, not an error.
    ///
    /// # Errors
    ///
    /// - [`JuryError::CoordinatorUnset`] / [`JuryError::NotCoordinator`]
    ///   unless called by the configured coordinator.
    pub fn record_verdict(
        &mut self,
        caller: &AgentId,
        agent: &AgentId,
        was_correct: bool,
    ) -> Result<(), JuryError> {
        let _guard = self.lock.enter()?;
        require_coordinator(self.coordinator.as_ref(), caller)?;
        let Some(record) = self.jurors.get_mut(agent) else {
            debug!(agent = %agent, "verdict for unknown juror discarded");
            return Ok(());
        };
        if !record.active {
            debug!(agent = %agent, "verdict for exited juror discarded");
            return Ok(());
        }
        record.cases_judged += 1;
        if was_correct {
            record.correct_verdicts += 1;
        }
        debug!(agent = %agent, was_correct, "verdict recorded");
        self.events.push(JuryEvent::VerdictRecorded {
            agent: agent.clone(),
            was_correct,
        });
        Ok(())
    }

    /// Slash an active juror's stake by up to `amount`. Coordinator only.
    ///
    /// The deduction is clamped to the posted stake. If the remainder falls
    /// below [`MIN_STAKE`] the juror is deactivated in place — it stays in
    /// the roster, blocked from selection by the `active` flag, and must
    /// withdraw separately to reclaim the remainder. Slashed value stays in
    /// the pool custody account.
    ///
    /// # Errors
    ///
    /// - [`JuryError::CoordinatorUnset`] / [`JuryError::NotCoordinator`]
    ///   unless called by the configured coordinator.
    /// - [`JuryError::UnknownJuror`] / [`JuryError::NotActive`] unless the
    ///   target is an active juror.
    pub fn slash_stake(
        &mut self,
        caller: &AgentId,
        agent: &AgentId,
        amount: Amount,
    ) -> Result<(), JuryError> {
        let _guard = self.lock.enter()?;
        require_coordinator(self.coordinator.as_ref(), caller)?;
        let record = self
            .jurors
            .get_mut(agent)
            .ok_or_else(|| JuryError::UnknownJuror(agent.clone()))?;
        if !record.active {
            return Err(JuryError::NotActive { agent: agent.clone() });
        }
        let slashed = amount.min(record.stake);
        record.stake -= slashed;
        let remaining = record.stake;
        let deactivated = remaining < MIN_STAKE;
        if deactivated {
            record.active = false;
        }
        info!(agent = %agent, slashed, remaining, deactivated, "juror slashed");
        self.events.push(JuryEvent::JurorSlashed {
            agent: agent.clone(),
            slashed,
            remaining,
            deactivated,
        });
        Ok(())
    }

    /// Look up a juror record by identity.
    pub fn juror(&self, agent: &AgentId) -> Option<&Juror> {
        self.jurors.get(agent)
    }

    /// The dense roster, in current (order-unstable) slot order.
    pub fn roster(&self) -> &[AgentId] {
        &self.roster
    }

    /// The number of jurors currently eligible for selection.
    pub fn active_count(&self) -> usize {
        self.jurors.values().filter(|j| j.active).count()
    }

    /// The append-only audit trail of committed operations.
    pub fn events(&self) -> &[JuryEvent] {
        &self.events
    }

    /// The configured dispute coordinator, if any.
    pub fn coordinator(&self) -> Option<&AgentId> {
        self.coordinator.as_ref()
    }

    /// The bank identity holding all posted (and slashed) stake.
    pub fn pool_account(&self) -> &AgentId {
        &self.pool_account
    }

    /// The pool owner.
    pub fn owner(&self) -> &AgentId {
        &self.owner
    }
}

/// Authenticate the caller as the configured coordinator.
fn require_coordinator(
    coordinator: Option<&AgentId>,
    caller: &AgentId,
) -> Result<(), JuryError> {
    match coordinator {
        None => Err(JuryError::CoordinatorUnset),
        Some(configured) if configured != caller => Err(JuryError::NotCoordinator {
            caller: caller.clone(),
        }),
        Some(_) => Ok(()),
    }
}

/// Remove `agent` from the dense roster via swap-with-last, fixing up the
/// displaced occupant's slot. Returns whether the agent was rostered.
fn roster_remove(
    roster: &mut Vec<AgentId>,
    slots: &mut HashMap<AgentId, usize>,
    agent: &AgentId,
) -> bool {
    let Some(slot) = slots.remove(agent) else {
        return false;
    };
    let last = roster.len() - 1;
    roster.swap_remove(slot);
    if slot != last {
        let displaced = roster[slot].clone();
        slots.insert(displaced, slot);
    }
    true
}
