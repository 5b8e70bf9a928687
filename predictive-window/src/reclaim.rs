//! Memory reclamation policy and its interval timer.

use alloc::vec::Vec;

use crate::{EvictionScale, WindowConfig};

/// A cancellable interval handle for the reclaimer.
///
/// The store arms it on `initialize` and cancels it on `destroy`; whoever owns the clock
/// (a frame loop, a timer thread) polls it through `WindowedStore::poll_reclaim`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReclaimTimer {
    interval_ms: u64,
    next_due_ms: Option<u64>,
}

impl ReclaimTimer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            next_due_ms: None,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn is_armed(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.next_due_ms
    }

    /// Arms the timer so it first fires one interval after `now_ms`. No-op when already armed.
    pub fn arm(&mut self, now_ms: u64) {
        if self.next_due_ms.is_none() {
            self.next_due_ms = Some(now_ms.saturating_add(self.interval_ms));
        }
    }

    pub fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.next_due_ms.is_some_and(|due| now_ms >= due)
    }

    /// Consumes a due tick and schedules the next one. Missed periods are not replayed.
    pub fn fire(&mut self, now_ms: u64) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        self.next_due_ms = Some(now_ms.saturating_add(self.interval_ms));
        true
    }
}

/// Flat per-item usage estimate.
pub(crate) fn estimated_usage(loaded: usize, per_item_estimate: f64) -> f64 {
    loaded as f64 * per_item_estimate
}

/// Number of entries to evict in one pass.
///
/// At least one while there is a candidate, never more than the candidates available.
/// An `eviction_fraction` of zero disables eviction.
pub(crate) fn batch_size(config: &WindowConfig, total: usize, candidates: usize) -> usize {
    if candidates == 0 || config.eviction_fraction <= 0.0 {
        return 0;
    }
    let base = match config.eviction_scale {
        EvictionScale::TotalItems => total,
        EvictionScale::Candidates => candidates,
    };
    let batch = (base as f64 * config.eviction_fraction) as usize;
    batch.clamp(1, candidates)
}

/// A reclamation candidate: entry index plus its last visibility stamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) index: usize,
    pub(crate) last_accessed: Option<u64>,
}

/// Orders candidates oldest first; never-accessed entries lead, ties keep index order.
pub(crate) fn oldest_first(candidates: &mut Vec<Candidate>, take: usize) {
    candidates.sort_by_key(|c| (c.last_accessed, c.index));
    candidates.truncate(take);
}
