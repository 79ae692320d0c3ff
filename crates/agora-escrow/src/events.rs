//! # Escrow Events — The Durable Audit Trail
//!
//! Every committed operation appends exactly one event. The event log is the
//! only persisted history: off-chain observers (including the dispute
//! coordinator, which watches for [`EscrowEvent::TaskDisputed`]) reconstruct
//! the full task timeline from it. Aborted operations append nothing.

use serde::{Deserialize, Serialize};

use agora_core::{AgentId, Amount, ContentDigest, TaskId};

/// An event emitted by a committed escrow ledger operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EscrowEvent {
    /// A task was created and its payment escrowed.
    TaskCreated {
        /// The new task.
        task_id: TaskId,
        /// The funding client.
        client: AgentId,
        /// Escrowed payment.
        payment: Amount,
    },
    /// A worker accepted the task and posted stake.
    TaskAccepted {
        /// The accepted task.
        task_id: TaskId,
        /// The accepting worker.
        worker: AgentId,
        /// Posted collateral (the full offer, including any excess over the
        /// required floor).
        stake: Amount,
    },
    /// The worker submitted a result hash.
    ResultSubmitted {
        /// The task submitted against.
        task_id: TaskId,
        /// Content hash of the off-chain result.
        result_hash: ContentDigest,
    },
    /// The client disputed the submitted result; handed off to the
    /// dispute coordinator.
    TaskDisputed {
        /// The disputed task.
        task_id: TaskId,
    },
    /// The task settled in the worker's favor.
    TaskCompleted {
        /// The settled task.
        task_id: TaskId,
        /// The payout recipient (the worker).
        paid_to: AgentId,
        /// The full settlement pool: payment + worker stake.
        amount: Amount,
    },
    /// The task settled in the client's favor; the worker's stake was
    /// forfeited to the client.
    TaskRefunded {
        /// The settled task.
        task_id: TaskId,
        /// The payout recipient (the client).
        refunded_to: AgentId,
        /// The full settlement pool: payment + forfeited worker stake.
        amount: Amount,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serde_roundtrip() {
        let event = EscrowEvent::TaskCompleted {
            task_id: TaskId::new(3),
            paid_to: AgentId::new("worker").unwrap(),
            amount: 110,
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: EscrowEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
