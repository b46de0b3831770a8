//! Backoff scheduling for reconnect attempts.
//!
//! Pure, deterministic functions over explicit counters: given the candidate
//! port list and the attempt history, pick the next port to try and the
//! timeout to allow for that attempt. No sockets, no clocks, no hidden
//! state, so scheduling decisions are unit-testable in isolation.

use std::time::Duration;

use super::error::{TransportError, TransportResult};

/// Attempt history driving port rotation and backoff growth.
///
/// All counters are monotonically non-decreasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptCounters {
    /// Number of reconnect attempts made so far.
    pub ports_tried: u32,
    /// Number of ports permanently removed after a socket error.
    pub ports_removed: u32,
    /// Number of per-attempt connect timeouts observed.
    pub timeout_count: u32,
    /// Backoff exponent; grows the per-attempt timeout.
    pub backoff: u32,
}

impl AttemptCounters {
    /// Fresh counters for a new connect cycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a per-attempt connect timeout.
    pub fn on_timeout(&mut self) {
        self.timeout_count += 1;
    }

    /// Record the permanent removal of a candidate port.
    pub fn on_port_removed(&mut self) {
        self.ports_removed += 1;
    }

    /// Record the start of a reconnect attempt.
    ///
    /// Bumps the backoff exponent whenever the counted timeouts complete a
    /// full pass over the current candidate count (skipped for an empty
    /// list).
    pub fn on_reconnect(&mut self, candidate_count: usize) {
        self.ports_tried += 1;

        if candidate_count > 0 && self.timeout_count as usize % candidate_count == 0 {
            self.backoff += 1;
        }
    }
}

/// Select the next candidate port to try.
///
/// Round-robin over the current candidate list, indexed by
/// `ports_tried - ports_removed`, so removals do not skip the port that
/// shifted into the removed slot.
pub fn next_port(candidates: &[u16], counters: &AttemptCounters) -> TransportResult<u16> {
    if candidates.is_empty() {
        return Err(TransportError::NoCandidates);
    }

    let rotation = counters.ports_tried.saturating_sub(counters.ports_removed) as usize;
    Ok(candidates[rotation % candidates.len()])
}

/// Per-attempt connect timeout for the given backoff exponent.
///
/// `min(2^(exponent + 1), overall)` in whole seconds, so a single
/// unresponsive port is retried with timeouts 2, 4, 8, ... capped at the
/// overall connect timeout.
pub fn attempt_timeout(backoff_exponent: u32, overall: Duration) -> Duration {
    let secs = 1u64
        .checked_shl(backoff_exponent.saturating_add(1))
        .unwrap_or(u64::MAX);
    Duration::from_secs(secs).min(overall)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERALL: Duration = Duration::from_secs(30);

    #[test]
    fn test_next_port_cycles_through_all_candidates() {
        let candidates = [4567, 4568, 4569];
        let mut counters = AttemptCounters::new();

        let mut picked = Vec::new();
        for _ in 0..6 {
            picked.push(next_port(&candidates, &counters).unwrap());
            counters.ports_tried += 1;
        }
        assert_eq!(picked, [4567, 4568, 4569, 4567, 4568, 4569]);
    }

    #[test]
    fn test_next_port_accounts_for_removals() {
        // First port removed after a refused connect; the reconnect attempt
        // lands on the head of the shrunk list, not past it.
        let counters = AttemptCounters {
            ports_tried: 1,
            ports_removed: 1,
            ..AttemptCounters::new()
        };
        assert_eq!(next_port(&[4568, 4569], &counters).unwrap(), 4568);
    }

    #[test]
    fn test_next_port_empty_list_rejected() {
        let counters = AttemptCounters::new();
        assert!(matches!(
            next_port(&[], &counters),
            Err(TransportError::NoCandidates)
        ));
    }

    #[test]
    fn test_attempt_timeout_growth_sequence() {
        let timeouts: Vec<u64> = (0..5)
            .map(|exp| attempt_timeout(exp, OVERALL).as_secs())
            .collect();
        assert_eq!(timeouts, [2, 4, 8, 16, 30]);
    }

    #[test]
    fn test_attempt_timeout_capped_and_monotone() {
        let mut previous = Duration::ZERO;
        for exp in 0..80 {
            let timeout = attempt_timeout(exp, OVERALL);
            assert!(timeout >= previous);
            assert!(timeout <= OVERALL);
            previous = timeout;
        }
    }

    #[test]
    fn test_backoff_bumps_once_per_full_timeout_cycle() {
        let mut counters = AttemptCounters::new();

        // Single candidate: every reconnect completes a cycle.
        counters.on_timeout();
        counters.on_reconnect(1);
        assert_eq!(counters.backoff, 1);

        counters.on_timeout();
        counters.on_reconnect(1);
        assert_eq!(counters.backoff, 2);
    }

    #[test]
    fn test_backoff_waits_for_full_cycle_with_many_candidates() {
        let mut counters = AttemptCounters::new();

        // First reconnect: zero timeouts counted, so the cycle is complete
        // by definition and the exponent bumps.
        counters.on_reconnect(3);
        assert_eq!(counters.backoff, 1);

        // One timeout into a three-port cycle: no bump.
        counters.on_timeout();
        counters.on_reconnect(3);
        assert_eq!(counters.backoff, 1);

        counters.on_timeout();
        counters.on_timeout();
        counters.on_reconnect(3);
        assert_eq!(counters.backoff, 2);
    }

    #[test]
    fn test_counters_never_decrease() {
        let mut counters = AttemptCounters::new();
        counters.on_timeout();
        counters.on_port_removed();
        counters.on_reconnect(2);

        assert_eq!(counters.timeout_count, 1);
        assert_eq!(counters.ports_removed, 1);
        assert_eq!(counters.ports_tried, 1);
    }
}
