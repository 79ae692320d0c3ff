//! # Deterministic Committee Selection
//!
//! The seed-mixing draw loop, isolated as pure functions over plain values
//! so it can be tested without a pool. The pool supplies an acceptance
//! predicate over candidate roster indices; this module owns seed
//! derivation, seed advancement, duplicate rejection, and the bounded
//! attempt budget.
//!
//! ## Known Weakness
//!
//! The seed is derived from caller-supplied entropy mixed with the dispute
//! id — both publicly predictable, and the entropy potentially
//! producer-influenced. This is deliberate: the draw trades perfect fairness
//! for a termination guarantee under a bounded compute budget. Deployments
//! where a party could bias the entropy need an externally verifiable
//! randomness source instead.

use sha2::{Digest, Sha256};

use agora_core::DisputeId;

/// Attempt budget multiplier: a draw may consume at most
/// `SELECTION_ATTEMPT_FACTOR × roster_len` attempts before failing hard.
pub const SELECTION_ATTEMPT_FACTOR: u64 = 3;

/// Derive the initial draw seed: `SHA-256(entropy ‖ dispute_id)` truncated
/// to its first 8 bytes, big-endian.
pub fn derive_seed(entropy: &[u8], dispute_id: DisputeId) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(entropy);
    hasher.update(dispute_id.value().to_be_bytes());
    truncate(&hasher.finalize())
}

/// Advance the seed by one attempt: `SHA-256(seed ‖ attempt)` truncated.
///
/// One-way mixing keeps later draws unpredictable from earlier rejections
/// alone, and the attempt counter guarantees the sequence never cycles
/// within a draw.
pub fn advance_seed(seed: u64, attempt: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_be_bytes());
    hasher.update(attempt.to_be_bytes());
    truncate(&hasher.finalize())
}

fn truncate(digest: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(buf)
}

/// Draw `count` distinct roster indices from `0..pool_size`.
///
/// Each attempt proposes `seed mod pool_size`; the candidate is taken if it
/// is not already selected and `accept` approves it. The seed advances after
/// every attempt, accepted or rejected. Returns `None` if `max_attempts`
/// run out before the committee fills — never a short list.
pub fn select_indices<F>(
    seed: u64,
    pool_size: usize,
    count: usize,
    max_attempts: u64,
    mut accept: F,
) -> Option<Vec<usize>>
where
    F: FnMut(usize) -> bool,
{
    if count == 0 {
        return Some(Vec::new());
    }
    if pool_size == 0 {
        return None;
    }

    let mut seed = seed;
    let mut selected = Vec::with_capacity(count);
    for attempt in 0..max_attempts {
        let candidate = (seed % pool_size as u64) as usize;
        if !selected.contains(&candidate) && accept(candidate) {
            selected.push(candidate);
            if selected.len() == count {
                return Some(selected);
            }
        }
        seed = advance_seed(seed, attempt);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_derivation_is_deterministic() {
        let a = derive_seed(b"block-entropy", DisputeId::new(7));
        let b = derive_seed(b"block-entropy", DisputeId::new(7));
        assert_eq!(a, b);
    }

    #[test]
    fn seed_varies_with_dispute_id_and_entropy() {
        let base = derive_seed(b"block-entropy", DisputeId::new(7));
        assert_ne!(base, derive_seed(b"block-entropy", DisputeId::new(8)));
        assert_ne!(base, derive_seed(b"other-entropy", DisputeId::new(7)));
    }

    #[test]
    fn advance_never_fixes_the_sequence() {
        // Even a colliding seed cannot cycle: the attempt counter differs.
        let s1 = advance_seed(42, 0);
        let s2 = advance_seed(42, 1);
        assert_ne!(s1, s2);
    }

    #[test]
    fn selects_exactly_count_distinct_indices() {
        let picked = select_indices(derive_seed(b"e", DisputeId::new(1)), 10, 4, 30, |_| true)
            .unwrap();
        assert_eq!(picked.len(), 4);
        let mut dedup = picked.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), 4);
        assert!(picked.iter().all(|&i| i < 10));
    }

    #[test]
    fn uses_the_whole_pool_when_count_equals_size() {
        let picked = select_indices(derive_seed(b"e", DisputeId::new(2)), 3, 3, 9, |_| true);
        // Budget 3×3 = 9 attempts may or may not land all three distinct
        // indices; when it does, the committee is the full pool.
        if let Some(picked) = picked {
            let mut sorted = picked;
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2]);
        }
    }

    #[test]
    fn rejected_candidates_are_never_returned() {
        let picked = select_indices(derive_seed(b"e", DisputeId::new(3)), 10, 3, 30, |i| i != 5)
            .unwrap();
        assert!(!picked.contains(&5));
    }

    #[test]
    fn exhaustion_is_a_hard_failure_not_a_short_list() {
        // Only one acceptable index but two requested: must return None.
        let picked = select_indices(0, 4, 2, 12, |i| i == 0);
        assert!(picked.is_none());
    }

    #[test]
    fn empty_pool_fails_and_empty_committee_succeeds() {
        assert!(select_indices(1, 0, 1, 3, |_| true).is_none());
        assert_eq!(select_indices(1, 0, 0, 0, |_| true), Some(Vec::new()));
    }

    #[test]
    fn same_seed_same_committee() {
        let seed = derive_seed(b"entropy", DisputeId::new(9));
        let a = select_indices(seed, 20, 5, 60, |_| true).unwrap();
        let b = select_indices(seed, 20, 5, 60, |_| true).unwrap();
        assert_eq!(a, b);
    }
}
