use crate::{Lifecycle, VisibleRange};

/// A lightweight, serializable snapshot of a store's bookkeeping.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowStats {
    pub lifecycle: Lifecycle,
    pub len: usize,
    pub visible_range: VisibleRange,
    pub scroll_offset: u64,
    pub total_extent: u64,
    pub loaded: usize,
    pub queued: usize,
    pub tracked: usize,
    /// `loaded * per_item_estimate`.
    pub estimated_memory_usage: f64,
    pub next_reclaim_ms: Option<u64>,
}
