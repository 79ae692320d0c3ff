//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines [`Timestamp`], a UTC-only timestamp truncated to seconds
//! precision.
//!
//! ## Caller-Supplied Time
//!
//! The ledgers never read the wall clock inside an operation. Timeout
//! eligibility (`now > submitted_at + VERIFICATION_TIMEOUT`) is evaluated
//! against a `Timestamp` supplied by the caller — in production the
//! embedding runtime's block time, in tests an arbitrary instant. This keeps
//! every operation a pure function of its arguments and the ledger state.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating
    /// sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimestamp`] if the value is outside the
    /// representable range.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| CoreError::InvalidTimestamp(format!("epoch seconds out of range: {secs}")))?;
        Ok(Self(dt))
    }

    /// The Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// This timestamp advanced by a number of seconds.
    ///
    /// Saturates at the representable bounds rather than wrapping; timeout
    /// deadlines near the end of representable time degrade to "never
    /// claimable" instead of wrapping into the past.
    pub fn plus_secs(&self, secs: i64) -> Self {
        match DateTime::from_timestamp(self.0.timestamp().saturating_add(secs), 0) {
            Some(dt) => Self(dt),
            None => *self,
        }
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO-8601 with Z suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
