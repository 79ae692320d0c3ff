//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the settlement core.
//! Each identifier is a distinct type — you cannot pass a [`TaskId`] where a
//! [`DisputeId`] is expected.
//!
//! ## Validation
//!
//! [`AgentId`] validates its format at construction time and re-validates on
//! deserialization. Integer identifiers ([`TaskId`], [`DisputeId`]) are
//! always valid by construction: task ids are allocated by the escrow
//! ledger's monotonic counter, dispute ids are assigned by the dispute
//! coordinator.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The identity of a participant: client, worker, juror, coordinator, or a
/// contract custody account.
///
/// Wraps a validated string — non-empty, printable ASCII, no whitespace.
/// The settlement core compares identities by equality only; it attaches no
/// meaning to their contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AgentId(String);

impl AgentId {
    /// Create a validated agent identity.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] if the string is empty or
    /// contains whitespace or non-printable characters.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidIdentifier {
                value: id,
                reason: "identity must not be empty".to_string(),
            });
        }
        if let Some(c) = id.chars().find(|c| !c.is_ascii_graphic()) {
            return Err(CoreError::InvalidIdentifier {
                value: id.clone(),
                reason: format!("identity contains invalid character {c:?}"),
            });
        }
        Ok(Self(id))
    }

    /// Return the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for AgentId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// Deserializes as a plain `String`, then routes through `new()` so that
// invalid values are rejected at deserialization time, not silently accepted.
impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A unique identifier for an escrowed task.
///
/// Allocated by the escrow ledger's monotonically increasing counter — two
/// tasks never share an id, and ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    /// Create a task identifier from its raw counter value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw counter value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task:{}", self.0)
    }
}

/// A unique identifier for a dispute, assigned by the dispute coordinator.
///
/// The juror pool folds this value into the selection seed so that two
/// disputes selected in the same block draw different committees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisputeId(u64);

impl DisputeId {
    /// Create a dispute identifier from its raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DisputeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dispute:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_id_accepts_printable_ascii() {
        assert!(AgentId::new("alice").is_ok());
        assert!(AgentId::new("0xDEADbeef01").is_ok());
        assert!(AgentId::new("did:key:z6MkExample").is_ok());
    }

    #[test]
    fn agent_id_rejects_empty() {
        assert!(AgentId::new("").is_err());
    }

    #[test]
    fn agent_id_rejects_whitespace() {
        assert!(AgentId::new("alice bob").is_err());
        assert!(AgentId::new("alice\n").is_err());
        assert!(AgentId::new("\t").is_err());
    }

    #[test]
    fn agent_id_rejects_non_ascii() {
        assert!(AgentId::new("ålice").is_err());
    }

    #[test]
    fn agent_id_deserialize_revalidates() {
        let ok: Result<AgentId, _> = serde_json::from_str("\"alice\"");
        assert!(ok.is_ok());
        let bad: Result<AgentId, _> = serde_json::from_str("\"has space\"");
        assert!(bad.is_err());
    }

    #[test]
    fn agent_id_display_and_from_str() {
        let id: AgentId = "worker-7".parse().unwrap();
        assert_eq!(format!("{id}"), "worker-7");
        assert_eq!(id.as_str(), "worker-7");
    }

    #[test]
    fn task_id_display() {
        assert_eq!(format!("{}", TaskId::new(42)), "task:42");
    }

    #[test]
    fn dispute_id_display() {
        assert_eq!(format!("{}", DisputeId::new(7)), "dispute:7");
    }

    #[test]
    fn integer_ids_are_distinct_types() {
        // Equality only within the same newtype; ordering follows the raw value.
        assert!(TaskId::new(1) < TaskId::new(2));
        assert_eq!(DisputeId::new(3).value(), 3);
    }

    #[test]
    fn task_id_serde_roundtrip() {
        let id = TaskId::new(9);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
