use predictive_window::{
    ItemKey, KeyCacheKey, ReclaimOutcome, VirtualEntry, WindowError, WindowOptions, WindowedStore,
};

/// A framework-neutral controller that wraps a `predictive_window::WindowedStore` and drives it
/// from host events.
///
/// This type does not hold any UI objects or clocks. Adapters drive it by calling:
/// - `set_data` when the item sequence changes
/// - `on_scroll` / `on_container_height` when UI events occur
/// - `tick(now_ms)` each frame/timer tick (runs the reclaimer when its interval has elapsed)
/// - `drain_render_queue` to materialize speculatively loaded items
#[derive(Debug)]
pub struct Controller<T, K = ItemKey> {
    store: WindowedStore<T, K>,
}

impl<T> Controller<T, ItemKey> {
    pub fn new(options: WindowOptions<ItemKey>) -> Result<Self, WindowError> {
        Ok(Self {
            store: WindowedStore::new(options)?,
        })
    }
}

impl<T, K: KeyCacheKey> Controller<T, K> {
    pub fn with_key(
        options: WindowOptions<K>,
        key_of: impl Fn(&T) -> K + Send + Sync + 'static,
    ) -> Result<Self, WindowError> {
        Ok(Self {
            store: WindowedStore::with_key(options, key_of)?,
        })
    }

    pub fn from_store(store: WindowedStore<T, K>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &WindowedStore<T, K> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WindowedStore<T, K> {
        &mut self.store
    }

    pub fn into_store(self) -> WindowedStore<T, K> {
        self.store
    }

    /// Replaces the item sequence. The window resets to the top of the list.
    pub fn set_data(
        &mut self,
        data: impl IntoIterator<Item = T>,
        now_ms: u64,
    ) -> Result<(), WindowError> {
        self.store.initialize(data, now_ms)
    }

    /// Call this when the UI reports a scroll offset change.
    pub fn on_scroll(&mut self, scroll_offset: u64, now_ms: u64) {
        self.store.update_visible_range(scroll_offset, now_ms);
    }

    pub fn on_container_height(
        &mut self,
        container_height: u32,
        now_ms: u64,
    ) -> Result<(), WindowError> {
        self.store.set_container_height(container_height, now_ms)
    }

    /// Advances the controller.
    ///
    /// Returns the outcome of a reclamation pass when one was due, `None` otherwise.
    pub fn tick(&mut self, now_ms: u64) -> Option<ReclaimOutcome> {
        self.store.poll_reclaim(now_ms)
    }

    /// Scroll offset that brings `index` to the top of the viewport, clamped so the list end
    /// does not scroll past the bottom edge.
    pub fn scroll_to_index_offset(&self, index: usize) -> u64 {
        let config = &self.store.options().config;
        let max = self
            .store
            .total_extent()
            .saturating_sub(config.container_height as u64);
        let target = (index as u64).saturating_mul(config.item_height as u64);
        target.min(max)
    }

    /// Scrolls so `index` is at the top of the viewport.
    ///
    /// Returns the applied (clamped) offset.
    pub fn scroll_to_index(&mut self, index: usize, now_ms: u64) -> u64 {
        let offset = self.scroll_to_index_offset(index);
        self.store.update_visible_range(offset, now_ms);
        offset
    }

    /// Calls `f(offset, entry)` for every entry to render, in index order.
    pub fn for_each_visible(&self, mut f: impl FnMut(u64, &VirtualEntry<T, K>)) {
        for entry in self.store.visible_items() {
            f(entry.offset(), entry);
        }
    }

    /// Hands every queued key (with its entry) to `f` and empties the queue.
    ///
    /// Returns the number of entries handed out.
    pub fn drain_render_queue(&mut self, mut f: impl FnMut(&VirtualEntry<T, K>)) -> usize {
        let queued = self.store.take_render_queue();
        let mut n = 0;
        for key in &queued {
            if let Some(entry) = self.store.entry_by_key(key) {
                f(entry);
                n += 1;
            }
        }
        n
    }

    /// Stops the reclaimer and releases the store's state. Idempotent.
    pub fn destroy(&mut self) {
        self.store.destroy();
    }
}
