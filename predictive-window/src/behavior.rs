use crate::KeyCacheKey;
use crate::key::KeyMap;

/// Per-key visibility counters.
///
/// Counts only grow; the whole table is dropped on re-initialization.
#[derive(Clone, Debug)]
pub(crate) struct BehaviorTracker<K> {
    counts: KeyMap<K, u64>,
}

impl<K: KeyCacheKey> BehaviorTracker<K> {
    pub(crate) fn new() -> Self {
        Self {
            counts: KeyMap::new(),
        }
    }

    /// Records a not-visible → visible transition.
    pub(crate) fn record(&mut self, key: &K) -> u64 {
        if let Some(count) = self.counts.get_mut(key) {
            *count = count.saturating_add(1);
            return *count;
        }
        self.counts.insert(key.clone(), 1);
        1
    }

    pub(crate) fn count(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }

    pub(crate) fn clear(&mut self) {
        self.counts.clear();
    }
}
