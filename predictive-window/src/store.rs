use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::behavior::BehaviorTracker;
use crate::key::{KeyCacheKey, KeyMap, KeySet};
use crate::priority::{PrioritySignals, render_priority};
use crate::range;
use crate::reclaim::{self, Candidate, ReclaimTimer};
use crate::{
    ItemKey, Lifecycle, ReclaimOutcome, VirtualEntry, VisibleRange, WindowError, WindowOptions,
    WindowStats,
};

enum KeyOf<T, K> {
    /// Keys are the ingestion sequence number.
    Sequence(fn(u64) -> K),
    Extract(Arc<dyn Fn(&T) -> K + Send + Sync>),
}

impl<T, K> KeyOf<T, K> {
    fn key(&self, item: &T, seq: u64) -> K {
        match self {
            Self::Sequence(f) => f(seq),
            Self::Extract(f) => f(item),
        }
    }
}

/// A windowed item store with predictive loading and memory reclamation.
///
/// The store is UI-agnostic and holds no clock:
/// - the host reports scroll offsets via [`Self::update_visible_range`] and renders
///   [`Self::visible_items`] at `entry.offset()`;
/// - speculative loads are queued in [`Self::render_queue`] for the host to materialize;
/// - a reclamation pass runs whenever the host (or a timer thread) calls
///   [`Self::poll_reclaim`] after the configured interval has elapsed.
///
/// The store is single-owner. For multi-threaded hosts, see `predictive-window-adapter`.
pub struct WindowedStore<T, K = ItemKey> {
    options: WindowOptions<K>,
    key_of: KeyOf<T, K>,
    lifecycle: Lifecycle,

    items: Vec<VirtualEntry<T, K>>,
    index_of: KeyMap<K, usize>,
    visible: VisibleRange,
    scroll_offset: u64,
    total_extent: u64,

    loaded: KeySet<K>,
    render_queue: Vec<K>,
    behavior: BehaviorTracker<K>,
    timer: ReclaimTimer,
    next_seq: u64,
}

impl<T> WindowedStore<T, ItemKey> {
    /// Creates a store that assigns each ingested item a fresh sequence key.
    ///
    /// Sequence keys keep increasing across re-initializations, so keys from a previous
    /// generation never alias new items.
    pub fn new(options: WindowOptions<ItemKey>) -> Result<Self, WindowError> {
        Self::from_parts(options, KeyOf::Sequence(|seq| seq))
    }
}

impl<T, K: KeyCacheKey> WindowedStore<T, K> {
    /// Creates a store keyed by `key_of(item)`.
    ///
    /// Keys must be unique within one `initialize` call.
    pub fn with_key(
        options: WindowOptions<K>,
        key_of: impl Fn(&T) -> K + Send + Sync + 'static,
    ) -> Result<Self, WindowError> {
        Self::from_parts(options, KeyOf::Extract(Arc::new(key_of)))
    }

    fn from_parts(options: WindowOptions<K>, key_of: KeyOf<T, K>) -> Result<Self, WindowError> {
        options.config.validate()?;
        wdebug!(
            item_height = options.config.item_height,
            container_height = options.config.container_height,
            overscan = options.config.overscan,
            predictive = options.config.ai_optimization_enabled,
            "WindowedStore::new"
        );
        Ok(Self {
            timer: ReclaimTimer::new(options.config.reclaim_interval_ms),
            options,
            key_of,
            lifecycle: Lifecycle::Uninitialized,
            items: Vec::new(),
            index_of: KeyMap::new(),
            visible: VisibleRange::EMPTY,
            scroll_offset: 0,
            total_extent: 0,
            loaded: KeySet::new(),
            render_queue: Vec::new(),
            behavior: BehaviorTracker::new(),
            next_seq: 0,
        })
    }

    pub fn options(&self) -> &WindowOptions<K> {
        &self.options
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Replaces the whole logical sequence.
    ///
    /// Access counts, the loaded set and the render queue are discarded, the reclaim timer is
    /// armed if it is not already, and the window is seeded at scroll offset 0. On error the
    /// store is left untouched.
    pub fn initialize(
        &mut self,
        data: impl IntoIterator<Item = T>,
        now_ms: u64,
    ) -> Result<(), WindowError> {
        if self.lifecycle == Lifecycle::Destroyed {
            wwarn!("WindowedStore::initialize after destroy");
            return Err(WindowError::Destroyed);
        }

        let height = self.options.config.item_height;
        let mut seq = self.next_seq;
        let mut items = Vec::new();
        let mut index_of = KeyMap::new();
        for (index, data) in data.into_iter().enumerate() {
            let key = self.key_of.key(&data, seq);
            seq = seq.wrapping_add(1);
            if index_of.insert(key.clone(), index).is_some() {
                return Err(WindowError::DuplicateKey { index });
            }
            items.push(VirtualEntry {
                key,
                index,
                data,
                height,
                is_visible: false,
                last_accessed: None,
                render_priority: 0.0,
            });
        }

        self.next_seq = seq;
        self.total_extent = (items.len() as u64).saturating_mul(height as u64);
        self.items = items;
        self.index_of = index_of;
        self.visible = VisibleRange::EMPTY;
        self.scroll_offset = 0;
        self.behavior.clear();
        self.loaded.clear();
        self.render_queue.clear();
        self.lifecycle = Lifecycle::Active;
        self.timer.arm(now_ms);
        wdebug!(
            len = self.items.len(),
            total_extent = self.total_extent,
            "WindowedStore::initialize"
        );

        self.update_visible_range(0, now_ms);
        Ok(())
    }

    /// Recomputes the window for `scroll_offset` and runs the predictive loader.
    ///
    /// Entries entering the window are stamped with `now_ms` and their access count grows by
    /// one. Offsets past the end are accepted and clamp the window to the entry count.
    pub fn update_visible_range(&mut self, scroll_offset: u64, now_ms: u64) {
        if self.lifecycle == Lifecycle::Destroyed {
            wwarn!(scroll_offset, "WindowedStore::update_visible_range after destroy");
            return;
        }

        let config = self.options.config;
        let next = range::visible_range(
            self.items.len(),
            scroll_offset,
            config.item_height,
            config.container_height,
            config.overscan,
        );
        let prev = self.visible;

        for i in prev.start_index..prev.end_index {
            if !next.contains(i) {
                self.items[i].is_visible = false;
            }
        }
        for i in next.start_index..next.end_index {
            let entry = &mut self.items[i];
            if !entry.is_visible {
                entry.is_visible = true;
                entry.last_accessed = Some(now_ms);
                self.behavior.record(&entry.key);
            }
        }

        self.visible = next;
        self.scroll_offset = scroll_offset;
        wtrace!(
            scroll_offset,
            start = next.start_index,
            end = next.end_index,
            "update_visible_range"
        );
        self.debug_check_window(prev);

        if config.ai_optimization_enabled {
            self.predictive_load(now_ms);
        }
    }

    /// Scores unloaded entries around the window and queues those above the threshold.
    fn predictive_load(&mut self, now_ms: u64) {
        let config = self.options.config;
        let window = self.visible;
        let scan = range::predictive_range(
            window,
            config.predictive_loading_factor,
            self.items.len(),
        );

        for i in scan.start_index..scan.end_index {
            let entry = &mut self.items[i];
            if self.loaded.contains(&entry.key) {
                continue;
            }
            let score = render_priority(PrioritySignals {
                access_count: self.behavior.count(&entry.key),
                recency_ms: entry.last_accessed.map(|t| now_ms.saturating_sub(t)),
                distance: window.edge_distance(i),
            });
            entry.render_priority = score;
            if score > config.priority_threshold {
                self.loaded.insert(entry.key.clone());
                self.render_queue.push(entry.key.clone());
            }
        }
    }

    /// Changes the viewport height and recomputes the window at the current scroll offset.
    pub fn set_container_height(
        &mut self,
        container_height: u32,
        now_ms: u64,
    ) -> Result<(), WindowError> {
        if container_height == 0 {
            return Err(WindowError::InvalidConfiguration {
                field: "container_height",
                reason: "must be greater than zero",
            });
        }
        if self.options.config.container_height == container_height {
            return Ok(());
        }
        self.options.config.container_height = container_height;
        self.update_visible_range(self.scroll_offset, now_ms);
        Ok(())
    }

    pub fn set_ai_optimization_enabled(&mut self, enabled: bool) {
        self.options.config.ai_optimization_enabled = enabled;
    }

    /// Runs one reclamation pass now, regardless of the timer.
    ///
    /// When the estimated usage exceeds `memory_threshold`, evicts the oldest loaded entries
    /// outside the window. Evicted entries stay indexable and may be loaded again by a later
    /// predictive pass.
    pub fn reclaim(&mut self) -> ReclaimOutcome {
        let config = self.options.config;
        let mut outcome = ReclaimOutcome {
            estimated_usage: reclaim::estimated_usage(self.loaded.len(), config.per_item_estimate),
            candidates: 0,
            evicted: 0,
        };
        if self.lifecycle != Lifecycle::Active || outcome.estimated_usage <= config.memory_threshold
        {
            return outcome;
        }

        let mut candidates: Vec<Candidate> = self
            .items
            .iter()
            .filter(|e| !e.is_visible && self.loaded.contains(&e.key))
            .map(|e| Candidate {
                index: e.index,
                last_accessed: e.last_accessed,
            })
            .collect();
        outcome.candidates = candidates.len();
        let take = reclaim::batch_size(&config, self.items.len(), candidates.len());
        reclaim::oldest_first(&mut candidates, take);

        for c in &candidates {
            let entry = &self.items[c.index];
            debug_assert!(
                !entry.is_visible,
                "reclaim: evicting a visible entry (index={})",
                c.index
            );
            if self.loaded.remove(&entry.key) {
                outcome.evicted += 1;
                if let Some(cb) = &self.options.on_evict {
                    cb(&entry.key);
                }
            }
        }
        if outcome.evicted > 0 {
            self.render_queue.retain(|k| self.loaded.contains(k));
        }

        wdebug!(
            estimated_usage = outcome.estimated_usage,
            threshold = config.memory_threshold,
            candidates = outcome.candidates,
            evicted = outcome.evicted,
            "reclaim"
        );
        outcome
    }

    /// Runs a reclamation pass if the timer is due, then re-arms it one interval later.
    pub fn poll_reclaim(&mut self, now_ms: u64) -> Option<ReclaimOutcome> {
        if self.lifecycle != Lifecycle::Active {
            return None;
        }
        if !self.timer.fire(now_ms) {
            return None;
        }
        Some(self.reclaim())
    }

    pub fn reclaim_timer(&self) -> &ReclaimTimer {
        &self.timer
    }

    /// Cancels the reclaim timer and drops all state. Idempotent.
    ///
    /// A destroyed store rejects `initialize` and ignores scroll updates.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        self.timer.cancel();
        self.behavior.clear();
        self.loaded.clear();
        self.render_queue.clear();
        self.items.clear();
        self.index_of.clear();
        self.visible = VisibleRange::EMPTY;
        self.total_extent = 0;
        self.lifecycle = Lifecycle::Destroyed;
        wdebug!("WindowedStore::destroy");
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries the host must render, each at `entry.offset()`.
    pub fn visible_items(&self) -> &[VirtualEntry<T, K>] {
        &self.items[self.visible.start_index..self.visible.end_index]
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.visible
    }

    /// The scan window the predictive loader covers for the current visible range.
    pub fn predictive_range(&self) -> VisibleRange {
        range::predictive_range(
            self.visible,
            self.options.config.predictive_loading_factor,
            self.items.len(),
        )
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Full scrollable height: `len * item_height`.
    pub fn total_extent(&self) -> u64 {
        self.total_extent
    }

    pub fn item_offset(&self, index: usize) -> Option<u64> {
        self.items.get(index).map(VirtualEntry::offset)
    }

    pub fn entries(&self) -> &[VirtualEntry<T, K>] {
        &self.items
    }

    pub fn entry(&self, index: usize) -> Option<&VirtualEntry<T, K>> {
        self.items.get(index)
    }

    pub fn entry_by_key(&self, key: &K) -> Option<&VirtualEntry<T, K>> {
        let index = *self.index_of.get(key)?;
        self.items.get(index)
    }

    pub fn is_loaded(&self, key: &K) -> bool {
        self.loaded.contains(key)
    }

    pub fn loaded_len(&self) -> usize {
        self.loaded.len()
    }

    pub fn access_count(&self, key: &K) -> u64 {
        self.behavior.count(key)
    }

    pub fn render_queue(&self) -> &[K] {
        &self.render_queue
    }

    /// Hands the queued keys to the host, leaving the queue empty.
    ///
    /// Taken keys stay in the loaded set until evicted.
    pub fn take_render_queue(&mut self) -> Vec<K> {
        core::mem::take(&mut self.render_queue)
    }

    pub fn estimated_memory_usage(&self) -> f64 {
        reclaim::estimated_usage(self.loaded.len(), self.options.config.per_item_estimate)
    }

    pub fn stats(&self) -> WindowStats {
        WindowStats {
            lifecycle: self.lifecycle,
            len: self.items.len(),
            visible_range: self.visible,
            scroll_offset: self.scroll_offset,
            total_extent: self.total_extent,
            loaded: self.loaded.len(),
            queued: self.render_queue.len(),
            tracked: self.behavior.len(),
            estimated_memory_usage: self.estimated_memory_usage(),
            next_reclaim_ms: self.timer.next_due_ms(),
        }
    }

    #[cfg(debug_assertions)]
    fn debug_check_window(&self, prev: VisibleRange) {
        let next = self.visible;
        debug_assert!(next.start_index <= next.end_index);
        debug_assert!(next.end_index <= self.items.len());
        let lo = prev.start_index.min(next.start_index);
        let hi = prev.end_index.max(next.end_index).min(self.items.len());
        for i in lo..hi {
            let entry = &self.items[i];
            debug_assert_eq!(entry.index, i, "entry index out of sync");
            debug_assert_eq!(
                entry.is_visible,
                self.visible.contains(i),
                "visibility flag out of sync (index={i})"
            );
        }
    }

    #[cfg(not(debug_assertions))]
    fn debug_check_window(&self, _prev: VisibleRange) {}
}

impl<T, K: core::fmt::Debug> core::fmt::Debug for WindowedStore<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowedStore")
            .field("options", &self.options)
            .field("lifecycle", &self.lifecycle)
            .field("len", &self.items.len())
            .field("visible", &self.visible)
            .field("scroll_offset", &self.scroll_offset)
            .field("loaded", &self.loaded.len())
            .field("render_queue", &self.render_queue)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}
