//! Eviction policies enforcing the window capacity bound.
//!
//! A [`TrimPolicy`] is a selectable function applied after every successful
//! load, rather than branches scattered through the load path, so data
//! sources with unusual retention needs (e.g., prefer recent entries) can
//! swap in their own policy without touching the engine.

use std::collections::VecDeque;

use crate::types::{Direction, Entry};

/// Inputs to a trim pass, captured after a batch has been inserted.
#[derive(Debug, Clone, Copy)]
pub struct TrimParams {
    /// Maximum number of entries the window may hold.
    pub capacity: usize,
    /// Configured fetch unit size.
    pub page_size: usize,
    /// Number of entries the just-applied batch contributed.
    pub fresh: usize,
}

/// How many entries a trim pass removed from each end of the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimReport {
    /// Entries dropped from the front (smallest keys).
    pub dropped_front: usize,
    /// Entries dropped from the back (largest keys).
    pub dropped_back: usize,
}

/// A selectable eviction policy.
///
/// Implementations must preserve the ascending-key ordering of the window
/// and must not drop just-fetched entries when that would leave the window
/// shorter than one fetch unit. The report feeds the cursor's
/// `window_start` bookkeeping.
pub trait TrimPolicy<K, V>: Send + Sync {
    /// Shrinks `window` to at most `params.capacity` entries.
    ///
    /// `direction` is the direction of the load that triggered the pass.
    fn trim(
        &self,
        window: &mut VecDeque<Entry<K, V>>,
        direction: Direction,
        params: &TrimParams,
    ) -> TrimReport;
}

/// Default policy for incremental scrolling: drops excess entries from the
/// end opposite to the direction just extended, so the freshly fetched
/// page is always retained in full.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionalTrim;

impl<K, V> TrimPolicy<K, V> for DirectionalTrim {
    fn trim(
        &self,
        window: &mut VecDeque<Entry<K, V>>,
        direction: Direction,
        params: &TrimParams,
    ) -> TrimReport {
        let len = window.len();
        if len <= params.capacity {
            return TrimReport::default();
        }
        // The cap guards against over-delivering strategies; with capacity
        // of at least one page the excess never reaches the fresh batch.
        let protected = params.fresh.min(len);
        let excess = (len - params.capacity).min(len - protected);
        match direction {
            Direction::After => {
                window.drain(..excess);
                TrimReport {
                    dropped_front: excess,
                    dropped_back: 0,
                }
            }
            Direction::Before => {
                window.drain(len - excess..);
                TrimReport {
                    dropped_front: 0,
                    dropped_back: excess,
                }
            }
        }
    }
}

/// Fallback policy when no directional hint applies: keeps half the
/// capacity on each side of the window midpoint and drops the remainder
/// from both ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenteredTrim;

impl<K, V> TrimPolicy<K, V> for CenteredTrim {
    fn trim(
        &self,
        window: &mut VecDeque<Entry<K, V>>,
        _direction: Direction,
        params: &TrimParams,
    ) -> TrimReport {
        let len = window.len();
        if len <= params.capacity {
            return TrimReport::default();
        }
        let half = params.capacity / 2;
        let mid = len / 2;
        let keep_from = mid.saturating_sub(half);
        let keep_to = (keep_from + params.capacity).min(len);
        let dropped_back = len - keep_to;
        window.drain(keep_to..);
        window.drain(..keep_from);
        TrimReport {
            dropped_front: keep_from,
            dropped_back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(range: std::ops::Range<u64>) -> VecDeque<Entry<u64, u64>> {
        range.map(|i| Entry::new(i, i * 10)).collect()
    }

    fn keys(window: &VecDeque<Entry<u64, u64>>) -> Vec<u64> {
        window.iter().map(|e| e.key).collect()
    }

    #[test]
    fn directional_noop_below_capacity() {
        let mut buf = window(0..8);
        let params = TrimParams {
            capacity: 10,
            page_size: 5,
            fresh: 5,
        };
        let report = DirectionalTrim.trim(&mut buf, Direction::After, &params);
        assert_eq!(report, TrimReport::default());
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn directional_after_drops_front() {
        let mut buf = window(0..15);
        let params = TrimParams {
            capacity: 10,
            page_size: 5,
            fresh: 5,
        };
        let report = DirectionalTrim.trim(&mut buf, Direction::After, &params);
        assert_eq!(report.dropped_front, 5);
        assert_eq!(report.dropped_back, 0);
        assert_eq!(keys(&buf), (5..15).collect::<Vec<_>>());
    }

    #[test]
    fn directional_before_drops_back() {
        let mut buf = window(0..15);
        let params = TrimParams {
            capacity: 10,
            page_size: 5,
            fresh: 5,
        };
        let report = DirectionalTrim.trim(&mut buf, Direction::Before, &params);
        assert_eq!(report.dropped_back, 5);
        assert_eq!(keys(&buf), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn directional_never_drops_into_fresh_batch() {
        // An over-delivering strategy pushed the window far past capacity;
        // the excess is capped so the fresh batch survives intact.
        let mut buf = window(0..30);
        let params = TrimParams {
            capacity: 10,
            page_size: 5,
            fresh: 25,
        };
        let report = DirectionalTrim.trim(&mut buf, Direction::After, &params);
        assert_eq!(report.dropped_front, 5);
        assert_eq!(buf.len(), 25);
    }

    #[test]
    fn centered_keeps_middle() {
        let mut buf = window(0..20);
        let params = TrimParams {
            capacity: 10,
            page_size: 5,
            fresh: 5,
        };
        let report = CenteredTrim.trim(&mut buf, Direction::After, &params);
        assert_eq!(buf.len(), 10);
        assert_eq!(report.dropped_front, 5);
        assert_eq!(report.dropped_back, 5);
        assert_eq!(keys(&buf), (5..15).collect::<Vec<_>>());
    }

    #[test]
    fn centered_ordering_preserved() {
        let mut buf = window(100..125);
        let params = TrimParams {
            capacity: 10,
            page_size: 5,
            fresh: 5,
        };
        CenteredTrim.trim(&mut buf, Direction::Before, &params);
        let ks = keys(&buf);
        assert_eq!(ks.len(), 10);
        assert!(ks.windows(2).all(|w| w[0] < w[1]));
    }
}
