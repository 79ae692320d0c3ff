//! # Escrow Ledger — Custody and Settlement
//!
//! The [`EscrowLedger`] owns client and worker funds for a task from
//! creation to settlement and is the only component permitted to transfer
//! custody of staked value. Each operation authenticates its caller by
//! identity equality, enforces the lifecycle state machine from
//! [`crate::task`], and moves value exclusively through the
//! [`agora_core::Bank`] seam.
//!
//! ## Failure Semantics
//!
//! Every payout path follows checks-effects-interactions ordering: all
//! preconditions are checked, the terminal state is written, and the value
//! transfer runs last. A refused transfer restores the pre-call state and
//! appends no event, so the operation behaves as a transactional abort.
//! Inbound funding paths (task creation, stake
//! posting) pull funds before mutating, so a refused transfer likewise
//! leaves the ledger untouched.
//!
//! ## Concurrency
//!
//! The embedding runtime serializes calls; `&mut self` receivers encode
//! that here. The [`ReentrancyLock`] additionally rejects nested entry into
//! any guarded operation while a value transfer is in flight.

use std::collections::BTreeMap;

use tracing::{debug, info};

use agora_core::{AgentId, Amount, Bank, ContentDigest, ReentrancyLock, TaskId, Timestamp};

use crate::error::EscrowError;
use crate::events::EscrowEvent;
use crate::task::{Task, TaskState};

/// Required worker stake as a percentage of the task payment.
pub const STAKE_PERCENT: Amount = 10;

/// How long a client has to approve or dispute a submitted result before
/// the worker may claim implicit approval: 3 days.
pub const VERIFICATION_TIMEOUT_SECS: i64 = 3 * 24 * 60 * 60;

/// The minimum worker stake for a given payment:
/// `floor(payment × STAKE_PERCENT / 100)`.
///
/// Offers above the floor are fully retained as stake, not refunded.
///
/// # Errors
///
/// Returns [`EscrowError::AmountOverflow`] if the intermediate product
/// exceeds the amount range.
pub fn required_stake(payment: Amount) -> Result<Amount, EscrowError> {
    payment
        .checked_mul(STAKE_PERCENT)
        .map(|scaled| scaled / 100)
        .ok_or(EscrowError::AmountOverflow)
}

/// The escrow settlement ledger.
///
/// Administrative wiring (owner, custody account, coordinator) is fixed at
/// bring-up: the owner and custody account at construction, the coordinator
/// through a one-time [`EscrowLedger::set_coordinator`] call.
#[derive(Debug)]
pub struct EscrowLedger {
    owner: AgentId,
    escrow_account: AgentId,
    coordinator: Option<AgentId>,
    next_task_id: u64,
    tasks: BTreeMap<TaskId, Task>,
    events: Vec<EscrowEvent>,
    lock: ReentrancyLock,
}

impl EscrowLedger {
    /// Create an empty ledger.
    ///
    /// `escrow_account` is the bank identity holding all escrowed value; it
    /// must not be used by any participant as their own account.
    pub fn new(owner: AgentId, escrow_account: AgentId) -> Self {
        Self {
            owner,
            escrow_account,
            coordinator: None,
            next_task_id: 0,
            tasks: BTreeMap::new(),
            events: Vec::new(),
            lock: ReentrancyLock::new(),
        }
    }

    /// One-time bring-up configuration of the dispute coordinator identity.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotOwner`] unless called by the owner.
    /// - [`EscrowError::CoordinatorAlreadySet`] on reconfiguration attempts.
    pub fn set_coordinator(
        &mut self,
        caller: &AgentId,
        coordinator: AgentId,
    ) -> Result<(), EscrowError> {
        if *caller != self.owner {
            return Err(EscrowError::NotOwner { caller: caller.clone() });
        }
        if self.coordinator.is_some() {
            return Err(EscrowError::CoordinatorAlreadySet);
        }
        debug!(coordinator = %coordinator, "escrow coordinator configured");
        self.coordinator = Some(coordinator);
        Ok(())
    }

    /// Create a task, escrowing `payment` from the caller.
    ///
    /// Returns the newly allocated task id; the caller becomes the task's
    /// client.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::InvalidPayment`] if `payment` is zero.
    /// - [`EscrowError::Transfer`] if the caller cannot fund the payment;
    ///   no task is created.
    pub fn create_task(
        &mut self,
        caller: &AgentId,
        spec_hash: ContentDigest,
        payment: Amount,
        now: Timestamp,
        bank: &mut dyn Bank,
    ) -> Result<TaskId, EscrowError> {
        let _guard = self.lock.enter()?;
        if payment == 0 {
            return Err(EscrowError::InvalidPayment);
        }
        bank.transfer(caller, &self.escrow_account, payment)?;

        self.next_task_id += 1;
        let task_id = TaskId::new(self.next_task_id);
        self.tasks.insert(
            task_id,
            Task {
                id: task_id,
                client: caller.clone(),
                worker: None,
                payment,
                worker_stake: 0,
                spec_hash,
                result_hash: None,
                state: TaskState::Created,
                created_at: now,
                submitted_at: None,
            },
        );
        debug!(task = %task_id, client = %caller, payment, "task created");
        self.events.push(EscrowEvent::TaskCreated {
            task_id,
            client: caller.clone(),
            payment,
        });
        Ok(task_id)
    }

    /// Accept a task as worker, posting `stake_offered` as collateral.
    ///
    /// The full offer is retained as stake — amounts above the required
    /// floor are not refunded.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::UnknownTask`] / [`EscrowError::InvalidTransition`]
    ///   unless the task exists in state `Created`.
    /// - [`EscrowError::SelfAcceptance`] if the client accepts its own task.
    /// - [`EscrowError::StakeTooLow`] below `floor(payment × 10 / 100)`.
    /// - [`EscrowError::Transfer`] if the stake cannot be funded; the task
    ///   remains `Created`.
    pub fn accept_task(
        &mut self,
        caller: &AgentId,
        task_id: TaskId,
        stake_offered: Amount,
        bank: &mut dyn Bank,
    ) -> Result<(), EscrowError> {
        let _guard = self.lock.enter()?;
        let escrow_account = self.escrow_account.clone();
        let task = self
            .tasks
            .get_mut(&task_id)
            .ok_or(EscrowError::UnknownTask(task_id))?;
        require_state(task, TaskState::Created, TaskState::Accepted)?;
        if task.client == *caller {
            return Err(EscrowError::SelfAcceptance { task_id });
        }
        let required = required_stake(task.payment)?;
        if stake_offered < required {
            return Err(EscrowError::StakeTooLow {
                required,
                offered: stake_offered,
            });
        }
        bank.transfer(caller, &escrow_account, stake_offered)?;

        task.worker = Some(caller.clone());
        task.worker_stake = stake_offered;
        task.state = TaskState::Accepted;
        debug!(task = %task_id, worker = %caller, stake = stake_offered, "task accepted");
        self.events.push(EscrowEvent::TaskAccepted {
            task_id,
            worker: caller.clone(),
            stake: stake_offered,
        });
        Ok(())
    }

    /// Submit the result hash for an accepted task.
    ///
    /// Records the submission time, which anchors the verification timeout.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotWorker`] unless called by the task's worker.
    /// - [`EscrowError::InvalidTransition`] unless the task is `Accepted`.
    pub fn submit_result(
        &mut self,
        caller: &AgentId,
        task_id: TaskId,
        result_hash: ContentDigest,
        now: Timestamp,
    ) -> Result<(), EscrowError> {
        let _guard = self.lock.enter()?;
        let task = self
            .tasks
            .get_mut(&task_id)
            .ok_or(EscrowError::UnknownTask(task_id))?;
        require_worker(task, caller)?;
        require_state(task, TaskState::Accepted, TaskState::Submitted)?;

        task.result_hash = Some(result_hash);
        task.submitted_at = Some(now);
        task.state = TaskState::Submitted;
        debug!(task = %task_id, result = %result_hash, "result submitted");
        self.events.push(EscrowEvent::ResultSubmitted {
            task_id,
            result_hash,
        });
        Ok(())
    }

    /// Approve a submitted result, paying the worker `payment + stake`.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotClient`] unless called by the task's client.
    /// - [`EscrowError::InvalidTransition`] unless the task is `Submitted`.
    /// - [`EscrowError::Transfer`] if the payout is refused; the task
    ///   remains `Submitted`.
    pub fn approve_result(
        &mut self,
        caller: &AgentId,
        task_id: TaskId,
        bank: &mut dyn Bank,
    ) -> Result<(), EscrowError> {
        let _guard = self.lock.enter()?;
        let escrow_account = self.escrow_account.clone();
        let task = self
            .tasks
            .get_mut(&task_id)
            .ok_or(EscrowError::UnknownTask(task_id))?;
        require_client(task, caller)?;
        require_state(task, TaskState::Submitted, TaskState::Completed)?;
        let worker = require_assigned_worker(task, TaskState::Completed)?;

        let amount = pay_out(task, &escrow_account, &worker, TaskState::Completed, bank)?;
        info!(task = %task_id, to = %worker, amount, "task completed by client approval");
        self.events.push(EscrowEvent::TaskCompleted {
            task_id,
            paid_to: worker,
            amount,
        });
        Ok(())
    }

    /// Dispute a submitted result. No funds move; this is the sole handoff
    /// point to the dispute coordinator.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotClient`] unless called by the task's client.
    /// - [`EscrowError::InvalidTransition`] unless the task is `Submitted`.
    pub fn dispute_result(
        &mut self,
        caller: &AgentId,
        task_id: TaskId,
    ) -> Result<(), EscrowError> {
        let _guard = self.lock.enter()?;
        let task = self
            .tasks
            .get_mut(&task_id)
            .ok_or(EscrowError::UnknownTask(task_id))?;
        require_client(task, caller)?;
        require_state(task, TaskState::Submitted, TaskState::Disputed)?;

        task.state = TaskState::Disputed;
        info!(task = %task_id, "task disputed; awaiting coordinator resolution");
        self.events.push(EscrowEvent::TaskDisputed { task_id });
        Ok(())
    }

    /// Resolve a dispute in the worker's favor, paying the worker
    /// `payment + stake`. Coordinator only.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::CoordinatorUnset`] / [`EscrowError::NotCoordinator`]
    ///   unless called by the configured coordinator.
    /// - [`EscrowError::InvalidTransition`] unless the task is `Disputed`.
    /// - [`EscrowError::Transfer`] if the payout is refused; the task
    ///   remains `Disputed`.
    pub fn resolve_for_worker(
        &mut self,
        caller: &AgentId,
        task_id: TaskId,
        bank: &mut dyn Bank,
    ) -> Result<(), EscrowError> {
        let _guard = self.lock.enter()?;
        require_coordinator(self.coordinator.as_ref(), caller)?;
        let escrow_account = self.escrow_account.clone();
        let task = self
            .tasks
            .get_mut(&task_id)
            .ok_or(EscrowError::UnknownTask(task_id))?;
        require_state(task, TaskState::Disputed, TaskState::Completed)?;
        let worker = require_assigned_worker(task, TaskState::Completed)?;

        let amount = pay_out(task, &escrow_account, &worker, TaskState::Completed, bank)?;
        info!(task = %task_id, to = %worker, amount, "dispute resolved for worker");
        self.events.push(EscrowEvent::TaskCompleted {
            task_id,
            paid_to: worker,
            amount,
        });
        Ok(())
    }

    /// Resolve a dispute in the client's favor: the client recovers the
    /// payment and is compensated with the worker's forfeited stake.
    /// Coordinator only.
    ///
    /// # Errors
    ///
    /// As [`EscrowLedger::resolve_for_worker`], with the payout going to
    /// the client and the task ending `Refunded`.
    pub fn resolve_for_client(
        &mut self,
        caller: &AgentId,
        task_id: TaskId,
        bank: &mut dyn Bank,
    ) -> Result<(), EscrowError> {
        let _guard = self.lock.enter()?;
        require_coordinator(self.coordinator.as_ref(), caller)?;
        let escrow_account = self.escrow_account.clone();
        let task = self
            .tasks
            .get_mut(&task_id)
            .ok_or(EscrowError::UnknownTask(task_id))?;
        require_state(task, TaskState::Disputed, TaskState::Refunded)?;

        let client = task.client.clone();
        let amount = pay_out(task, &escrow_account, &client, TaskState::Refunded, bank)?;
        info!(task = %task_id, to = %client, amount, "dispute resolved for client");
        self.events.push(EscrowEvent::TaskRefunded {
            task_id,
            refunded_to: client,
            amount,
        });
        Ok(())
    }

    /// Claim settlement after the client failed to respond within the
    /// verification timeout. Worker only; requires strictly
    /// `now > submitted_at + VERIFICATION_TIMEOUT`.
    ///
    /// Absence of a client response is treated as implicit approval: the
    /// payout is identical to [`EscrowLedger::approve_result`].
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotWorker`] unless called by the task's worker.
    /// - [`EscrowError::InvalidTransition`] unless the task is `Submitted`.
    /// - [`EscrowError::TimeoutNotElapsed`] at or before the deadline.
    /// - [`EscrowError::Transfer`] if the payout is refused; the task
    ///   remains `Submitted`.
    pub fn claim_after_timeout(
        &mut self,
        caller: &AgentId,
        task_id: TaskId,
        now: Timestamp,
        bank: &mut dyn Bank,
    ) -> Result<(), EscrowError> {
        let _guard = self.lock.enter()?;
        let escrow_account = self.escrow_account.clone();
        let task = self
            .tasks
            .get_mut(&task_id)
            .ok_or(EscrowError::UnknownTask(task_id))?;
        require_worker(task, caller)?;
        require_state(task, TaskState::Submitted, TaskState::Completed)?;
        let worker = require_assigned_worker(task, TaskState::Completed)?;

        // submitted_at is set on the Accepted -> Submitted transition, so a
        // Submitted task always carries it.
        let submitted_at = task.submitted_at.ok_or_else(|| EscrowError::InvalidTransition {
            task_id,
            from: task.state,
            to: TaskState::Completed,
            reason: "submitted task is missing its submission time".to_string(),
        })?;
        let deadline = submitted_at.plus_secs(VERIFICATION_TIMEOUT_SECS);
        if now <= deadline {
            return Err(EscrowError::TimeoutNotElapsed { deadline });
        }

        let amount = pay_out(task, &escrow_account, &worker, TaskState::Completed, bank)?;
        info!(task = %task_id, to = %worker, amount, "task completed by timeout claim");
        self.events.push(EscrowEvent::TaskCompleted {
            task_id,
            paid_to: worker,
            amount,
        });
        Ok(())
    }

    /// Look up a task by id.
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.get(&task_id)
    }

    /// The append-only audit trail of committed operations.
    pub fn events(&self) -> &[EscrowEvent] {
        &self.events
    }

    /// The configured dispute coordinator, if any.
    pub fn coordinator(&self) -> Option<&AgentId> {
        self.coordinator.as_ref()
    }

    /// The bank identity holding all escrowed value.
    pub fn escrow_account(&self) -> &AgentId {
        &self.escrow_account
    }

    /// The ledger owner.
    pub fn owner(&self) -> &AgentId {
        &self.owner
    }
}

/// Check the task is in `expected` before transitioning toward `target`.
fn require_state(task: &Task, expected: TaskState, target: TaskState) -> Result<(), EscrowError> {
    if task.state != expected {
        return Err(EscrowError::InvalidTransition {
            task_id: task.id,
            from: task.state,
            to: target,
            reason: format!("expected state {expected}, got {}", task.state),
        });
    }
    Ok(())
}

/// Authenticate the caller as the configured coordinator.
fn require_coordinator(
    coordinator: Option<&AgentId>,
    caller: &AgentId,
) -> Result<(), EscrowError> {
    match coordinator {
        None => Err(EscrowError::CoordinatorUnset),
        Some(configured) if configured != caller => Err(EscrowError::NotCoordinator {
            caller: caller.clone(),
        }),
        Some(_) => Ok(()),
    }
}

/// Authenticate the caller as the task's client.
fn require_client(task: &Task, caller: &AgentId) -> Result<(), EscrowError> {
    if task.client != *caller {
        return Err(EscrowError::NotClient {
            task_id: task.id,
            caller: caller.clone(),
        });
    }
    Ok(())
}

/// Authenticate the caller as the task's worker.
fn require_worker(task: &Task, caller: &AgentId) -> Result<(), EscrowError> {
    if task.worker.as_ref() != Some(caller) {
        return Err(EscrowError::NotWorker {
            task_id: task.id,
            caller: caller.clone(),
        });
    }
    Ok(())
}

/// Fetch the assigned worker; every post-acceptance state carries one.
fn require_assigned_worker(task: &Task, target: TaskState) -> Result<AgentId, EscrowError> {
    task.worker.clone().ok_or_else(|| EscrowError::InvalidTransition {
        task_id: task.id,
        from: task.state,
        to: target,
        reason: "task has no assigned worker".to_string(),
    })
}

/// Pay the full settlement pool to `recipient` and commit `to_state`.
///
/// Checks-effects-interactions: the terminal state is written before the
/// transfer runs; a refused transfer restores the previous state so no
/// partial payout is observable.
fn pay_out(
    task: &mut Task,
    escrow_account: &AgentId,
    recipient: &AgentId,
    to_state: TaskState,
    bank: &mut dyn Bank,
) -> Result<Amount, EscrowError> {
    let amount = task.settlement_pool().ok_or(EscrowError::AmountOverflow)?;
    let previous = task.state;
    task.state = to_state;
    if let Err(err) = bank.transfer(escrow_account, recipient, amount) {
        task.state = previous;
        return Err(EscrowError::Transfer(err));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{BankError, InMemoryBank};

    fn agent(s: &str) -> AgentId {
        AgentId::new(s).unwrap()
    }

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    fn spec_hash() -> ContentDigest {
        ContentDigest::sha256(b"render the report")
    }

    fn result_hash() -> ContentDigest {
        ContentDigest::sha256(b"the rendered report")
    }

    /// Ledger plus a funded client and worker.
    fn setup() -> (EscrowLedger, InMemoryBank, AgentId, AgentId) {
        let mut ledger = EscrowLedger::new(agent("owner"), agent("escrow-vault"));
        ledger
            .set_coordinator(&agent("owner"), agent("coordinator"))
            .unwrap();
        let mut bank = InMemoryBank::new();
        let client = agent("client");
        let worker = agent("worker");
        bank.mint(&client, 1_000);
        bank.mint(&worker, 1_000);
        (ledger, bank, client, worker)
    }

    /// Drive a task to `Submitted` with payment 100 and stake 10.
    fn submitted_task(
        ledger: &mut EscrowLedger,
        bank: &mut InMemoryBank,
        client: &AgentId,
        worker: &AgentId,
    ) -> TaskId {
        let id = ledger
            .create_task(client, spec_hash(), 100, ts(0), bank)
            .unwrap();
        ledger.accept_task(worker, id, 10, bank).unwrap();
        ledger
            .submit_result(worker, id, result_hash(), ts(50))
            .unwrap();
        id
    }

    /// A bank that refuses every transfer, for abort-path tests.
    struct RefusingBank;

    impl Bank for RefusingBank {
        fn balance_of(&self, _account: &AgentId) -> Amount {
            0
        }

        fn transfer(
            &mut self,
            _from: &AgentId,
            _to: &AgentId,
            _amount: Amount,
        ) -> Result<(), BankError> {
            Err(BankError::Rejected("refused by test bank".to_string()))
        }
    }

    // ── Creation ─────────────────────────────────────────────────────

    #[test]
    fn create_task_escrows_payment() {
        let (mut ledger, mut bank, client, _) = setup();
        let id = ledger
            .create_task(&client, spec_hash(), 100, ts(0), &mut bank)
            .unwrap();
        let task = ledger.task(id).unwrap();
        assert_eq!(task.state, TaskState::Created);
        assert_eq!(task.payment, 100);
        assert_eq!(task.client, client);
        assert!(task.worker.is_none());
        assert_eq!(bank.balance_of(&client), 900);
        assert_eq!(bank.balance_of(ledger.escrow_account()), 100);
    }

    #[test]
    fn create_task_rejects_zero_payment() {
        let (mut ledger, mut bank, client, _) = setup();
        let err = ledger
            .create_task(&client, spec_hash(), 0, ts(0), &mut bank)
            .unwrap_err();
        assert!(matches!(err, EscrowError::InvalidPayment));
    }

    #[test]
    fn create_task_ids_are_monotonic() {
        let (mut ledger, mut bank, client, _) = setup();
        let a = ledger
            .create_task(&client, spec_hash(), 1, ts(0), &mut bank)
            .unwrap();
        let b = ledger
            .create_task(&client, spec_hash(), 1, ts(0), &mut bank)
            .unwrap();
        assert!(a < b);
    }

    #[test]
    fn create_task_aborts_when_unfunded() {
        let (mut ledger, mut bank, _, _) = setup();
        let broke = agent("broke");
        let err = ledger
            .create_task(&broke, spec_hash(), 100, ts(0), &mut bank)
            .unwrap_err();
        assert!(matches!(err, EscrowError::Transfer(_)));
        assert!(ledger.events().is_empty());
        assert!(ledger.task(TaskId::new(1)).is_none());
    }

    // ── Acceptance and the stake floor ───────────────────────────────

    #[test]
    fn accept_at_exact_stake_floor_succeeds() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = ledger
            .create_task(&client, spec_hash(), 100, ts(0), &mut bank)
            .unwrap();
        // floor(100 * 10 / 100) = 10
        ledger.accept_task(&worker, id, 10, &mut bank).unwrap();
        let task = ledger.task(id).unwrap();
        assert_eq!(task.state, TaskState::Accepted);
        assert_eq!(task.worker, Some(worker));
        assert_eq!(task.worker_stake, 10);
    }

    #[test]
    fn accept_one_unit_below_floor_fails() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = ledger
            .create_task(&client, spec_hash(), 100, ts(0), &mut bank)
            .unwrap();
        let err = ledger.accept_task(&worker, id, 9, &mut bank).unwrap_err();
        assert!(matches!(
            err,
            EscrowError::StakeTooLow { required: 10, offered: 9 }
        ));
        assert_eq!(ledger.task(id).unwrap().state, TaskState::Created);
    }

    #[test]
    fn stake_floor_uses_integer_floor_division() {
        assert_eq!(required_stake(100).unwrap(), 10);
        assert_eq!(required_stake(109).unwrap(), 10);
        assert_eq!(required_stake(9).unwrap(), 0);
        assert_eq!(required_stake(1).unwrap(), 0);
    }

    #[test]
    fn required_stake_overflow_is_rejected() {
        assert!(matches!(
            required_stake(Amount::MAX),
            Err(EscrowError::AmountOverflow)
        ));
    }

    #[test]
    fn excess_stake_is_fully_retained() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = ledger
            .create_task(&client, spec_hash(), 100, ts(0), &mut bank)
            .unwrap();
        ledger.accept_task(&worker, id, 25, &mut bank).unwrap();
        assert_eq!(ledger.task(id).unwrap().worker_stake, 25);
        assert_eq!(bank.balance_of(&worker), 975);
    }

    #[test]
    fn client_cannot_accept_own_task() {
        let (mut ledger, mut bank, client, _) = setup();
        let id = ledger
            .create_task(&client, spec_hash(), 100, ts(0), &mut bank)
            .unwrap();
        let err = ledger.accept_task(&client, id, 10, &mut bank).unwrap_err();
        assert!(matches!(err, EscrowError::SelfAcceptance { .. }));
    }

    #[test]
    fn accept_requires_created_state() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = ledger
            .create_task(&client, spec_hash(), 100, ts(0), &mut bank)
            .unwrap();
        ledger.accept_task(&worker, id, 10, &mut bank).unwrap();
        let err = ledger
            .accept_task(&agent("other"), id, 10, &mut bank)
            .unwrap_err();
        assert!(matches!(err, EscrowError::InvalidTransition { .. }));
    }

    #[test]
    fn accept_unknown_task_fails() {
        let (mut ledger, mut bank, _, worker) = setup();
        let err = ledger
            .accept_task(&worker, TaskId::new(99), 10, &mut bank)
            .unwrap_err();
        assert!(matches!(err, EscrowError::UnknownTask(_)));
    }

    // ── Submission ───────────────────────────────────────────────────

    #[test]
    fn submit_records_hash_and_time() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        let task = ledger.task(id).unwrap();
        assert_eq!(task.state, TaskState::Submitted);
        assert_eq!(task.result_hash, Some(result_hash()));
        assert_eq!(task.submitted_at, Some(ts(50)));
    }

    #[test]
    fn submit_rejects_non_worker() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = ledger
            .create_task(&client, spec_hash(), 100, ts(0), &mut bank)
            .unwrap();
        ledger.accept_task(&worker, id, 10, &mut bank).unwrap();
        let err = ledger
            .submit_result(&client, id, result_hash(), ts(50))
            .unwrap_err();
        assert!(matches!(err, EscrowError::NotWorker { .. }));
    }

    #[test]
    fn submit_requires_accepted_state() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = ledger
            .create_task(&client, spec_hash(), 100, ts(0), &mut bank)
            .unwrap();
        let err = ledger
            .submit_result(&worker, id, result_hash(), ts(50))
            .unwrap_err();
        // Worker is not assigned before acceptance.
        assert!(matches!(err, EscrowError::NotWorker { .. }));
    }

    // ── Approval ─────────────────────────────────────────────────────

    #[test]
    fn approve_pays_payment_plus_stake_to_worker() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        ledger.approve_result(&client, id, &mut bank).unwrap();

        let task = ledger.task(id).unwrap();
        assert_eq!(task.state, TaskState::Completed);
        // Worker started with 1000, staked 10, received 110: net +100.
        assert_eq!(bank.balance_of(&worker), 1_100);
        assert_eq!(bank.balance_of(ledger.escrow_account()), 0);
    }

    #[test]
    fn approve_rejects_non_client() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        let err = ledger.approve_result(&worker, id, &mut bank).unwrap_err();
        assert!(matches!(err, EscrowError::NotClient { .. }));
    }

    #[test]
    fn approve_requires_submitted_state() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = ledger
            .create_task(&client, spec_hash(), 100, ts(0), &mut bank)
            .unwrap();
        ledger.accept_task(&worker, id, 10, &mut bank).unwrap();
        let err = ledger.approve_result(&client, id, &mut bank).unwrap_err();
        assert!(matches!(err, EscrowError::InvalidTransition { .. }));
    }

    #[test]
    fn terminal_task_rejects_further_settlement() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        ledger.approve_result(&client, id, &mut bank).unwrap();
        // No second payout from any path.
        assert!(ledger.approve_result(&client, id, &mut bank).is_err());
        assert!(ledger.dispute_result(&client, id).is_err());
        assert!(ledger
            .claim_after_timeout(&worker, id, ts(10_000_000_000), &mut bank)
            .is_err());
        assert_eq!(bank.balance_of(&worker), 1_100);
    }

    // ── Dispute and resolution ───────────────────────────────────────

    #[test]
    fn dispute_moves_no_funds() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        let escrowed = bank.balance_of(ledger.escrow_account());
        ledger.dispute_result(&client, id).unwrap();
        assert_eq!(ledger.task(id).unwrap().state, TaskState::Disputed);
        assert_eq!(bank.balance_of(ledger.escrow_account()), escrowed);
    }

    #[test]
    fn resolve_for_worker_pays_worker() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        ledger.dispute_result(&client, id).unwrap();
        ledger
            .resolve_for_worker(&agent("coordinator"), id, &mut bank)
            .unwrap();
        assert_eq!(ledger.task(id).unwrap().state, TaskState::Completed);
        assert_eq!(bank.balance_of(&worker), 1_100);
    }

    #[test]
    fn resolve_for_client_refunds_and_forfeits_stake() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        ledger.dispute_result(&client, id).unwrap();
        ledger
            .resolve_for_client(&agent("coordinator"), id, &mut bank)
            .unwrap();
        let task = ledger.task(id).unwrap();
        assert_eq!(task.state, TaskState::Refunded);
        // Client paid 100, got back 110: net +10 (the forfeited stake).
        assert_eq!(bank.balance_of(&client), 1_010);
        // Worker is out its stake entirely.
        assert_eq!(bank.balance_of(&worker), 990);
        assert_eq!(bank.balance_of(ledger.escrow_account()), 0);
    }

    #[test]
    fn resolution_rejects_non_coordinator() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        ledger.dispute_result(&client, id).unwrap();
        let err = ledger.resolve_for_worker(&client, id, &mut bank).unwrap_err();
        assert!(matches!(err, EscrowError::NotCoordinator { .. }));
        let err = ledger.resolve_for_client(&worker, id, &mut bank).unwrap_err();
        assert!(matches!(err, EscrowError::NotCoordinator { .. }));
    }

    #[test]
    fn resolution_requires_configured_coordinator() {
        let mut ledger = EscrowLedger::new(agent("owner"), agent("escrow-vault"));
        let mut bank = InMemoryBank::new();
        let client = agent("client");
        let worker = agent("worker");
        bank.mint(&client, 1_000);
        bank.mint(&worker, 1_000);
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        ledger.dispute_result(&client, id).unwrap();
        let err = ledger
            .resolve_for_worker(&agent("coordinator"), id, &mut bank)
            .unwrap_err();
        assert!(matches!(err, EscrowError::CoordinatorUnset));
    }

    #[test]
    fn resolution_requires_disputed_state() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        let err = ledger
            .resolve_for_client(&agent("coordinator"), id, &mut bank)
            .unwrap_err();
        assert!(matches!(err, EscrowError::InvalidTransition { .. }));
    }

    // ── Timeout claim ────────────────────────────────────────────────

    #[test]
    fn claim_at_exact_deadline_fails() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        // Submitted at t=50; deadline is t=50+TIMEOUT. Strict > required.
        let at_deadline = ts(50 + VERIFICATION_TIMEOUT_SECS);
        let err = ledger
            .claim_after_timeout(&worker, id, at_deadline, &mut bank)
            .unwrap_err();
        assert!(matches!(err, EscrowError::TimeoutNotElapsed { .. }));
        assert_eq!(ledger.task(id).unwrap().state, TaskState::Submitted);
    }

    #[test]
    fn claim_one_second_past_deadline_succeeds() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        let past_deadline = ts(50 + VERIFICATION_TIMEOUT_SECS + 1);
        ledger
            .claim_after_timeout(&worker, id, past_deadline, &mut bank)
            .unwrap();
        assert_eq!(ledger.task(id).unwrap().state, TaskState::Completed);
        assert_eq!(bank.balance_of(&worker), 1_100);
    }

    #[test]
    fn claim_rejects_non_worker() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        let err = ledger
            .claim_after_timeout(&client, id, ts(50 + VERIFICATION_TIMEOUT_SECS + 1), &mut bank)
            .unwrap_err();
        assert!(matches!(err, EscrowError::NotWorker { .. }));
    }

    // ── Transfer-failure aborts ──────────────────────────────────────

    #[test]
    fn refused_payout_leaves_task_submitted() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        let events_before = ledger.events().len();

        let err = ledger
            .approve_result(&client, id, &mut RefusingBank)
            .unwrap_err();
        assert!(matches!(err, EscrowError::Transfer(_)));
        assert_eq!(ledger.task(id).unwrap().state, TaskState::Submitted);
        assert_eq!(ledger.events().len(), events_before);

        // The operation can be retried against a working bank, exactly once.
        ledger.approve_result(&client, id, &mut bank).unwrap();
        assert_eq!(bank.balance_of(&worker), 1_100);
    }

    #[test]
    fn refused_payout_leaves_dispute_open() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        ledger.dispute_result(&client, id).unwrap();
        let err = ledger
            .resolve_for_client(&agent("coordinator"), id, &mut RefusingBank)
            .unwrap_err();
        assert!(matches!(err, EscrowError::Transfer(_)));
        assert_eq!(ledger.task(id).unwrap().state, TaskState::Disputed);
    }

    // ── Administrative configuration ─────────────────────────────────

    #[test]
    fn set_coordinator_is_owner_only() {
        let mut ledger = EscrowLedger::new(agent("owner"), agent("escrow-vault"));
        let err = ledger
            .set_coordinator(&agent("mallory"), agent("mallory"))
            .unwrap_err();
        assert!(matches!(err, EscrowError::NotOwner { .. }));
        assert!(ledger.coordinator().is_none());
    }

    #[test]
    fn set_coordinator_is_one_time() {
        let mut ledger = EscrowLedger::new(agent("owner"), agent("escrow-vault"));
        ledger
            .set_coordinator(&agent("owner"), agent("coordinator"))
            .unwrap();
        let err = ledger
            .set_coordinator(&agent("owner"), agent("other"))
            .unwrap_err();
        assert!(matches!(err, EscrowError::CoordinatorAlreadySet));
        assert_eq!(ledger.coordinator(), Some(&agent("coordinator")));
    }

    // ── Audit trail ──────────────────────────────────────────────────

    #[test]
    fn events_record_committed_history() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        ledger.dispute_result(&client, id).unwrap();
        ledger
            .resolve_for_client(&agent("coordinator"), id, &mut bank)
            .unwrap();

        let events = ledger.events();
        assert_eq!(events.len(), 5);
        assert!(matches!(events[0], EscrowEvent::TaskCreated { payment: 100, .. }));
        assert!(matches!(events[1], EscrowEvent::TaskAccepted { stake: 10, .. }));
        assert!(matches!(events[2], EscrowEvent::ResultSubmitted { .. }));
        assert!(matches!(events[3], EscrowEvent::TaskDisputed { .. }));
        assert!(matches!(events[4], EscrowEvent::TaskRefunded { amount: 110, .. }));
    }

    #[test]
    fn payout_events_sum_to_pool_exactly_once() {
        let (mut ledger, mut bank, client, worker) = setup();
        let id = submitted_task(&mut ledger, &mut bank, &client, &worker);
        ledger.approve_result(&client, id, &mut bank).unwrap();
        let _ = ledger.approve_result(&client, id, &mut bank);

        let paid: Amount = ledger
            .events()
            .iter()
            .filter_map(|e| match e {
                EscrowEvent::TaskCompleted { task_id, amount, .. }
                | EscrowEvent::TaskRefunded { task_id, amount, .. } if *task_id == id => {
                    Some(*amount)
                }
                _ => None,
            })
            .sum();
        let task = ledger.task(id).unwrap();
        assert_eq!(paid, task.settlement_pool().unwrap());
    }
}
