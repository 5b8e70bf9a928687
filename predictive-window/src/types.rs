/// Key assigned by the store when items carry no identity of their own.
pub type ItemKey = u64;

/// A half-open index interval `[start_index, end_index)` over the store's entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl VisibleRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn new(start_index: usize, end_index: usize) -> Self {
        debug_assert!(start_index <= end_index, "inverted range");
        Self {
            start_index,
            end_index,
        }
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }

    /// Distance from `index` to the nearer of the two range edges.
    pub fn edge_distance(&self, index: usize) -> usize {
        let to_start = index.abs_diff(self.start_index);
        let to_end = index.abs_diff(self.end_index);
        to_start.min(to_end)
    }
}

/// The store's wrapper around one caller-supplied item.
#[derive(Clone, Debug)]
pub struct VirtualEntry<T, K = ItemKey> {
    pub(crate) key: K,
    pub(crate) index: usize,
    pub(crate) data: T,
    pub(crate) height: u32,
    pub(crate) is_visible: bool,
    pub(crate) last_accessed: Option<u64>,
    pub(crate) render_priority: f64,
}

impl<T, K> VirtualEntry<T, K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Position in the logical sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Top offset of the entry in the scroll axis.
    pub fn offset(&self) -> u64 {
        self.index as u64 * self.height as u64
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    /// Timestamp of the most recent transition into visibility, `None` if never visible.
    pub fn last_accessed(&self) -> Option<u64> {
        self.last_accessed
    }

    /// Score from the last predictive pass that considered this entry.
    ///
    /// Stale between passes; `0.0` if the entry was never scored.
    pub fn render_priority(&self) -> f64 {
        self.render_priority
    }
}

/// Lifecycle of a [`crate::WindowedStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Active,
    /// Terminal; the store rejects further initialization.
    Destroyed,
}

/// Result of one reclamation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReclaimOutcome {
    /// Estimated usage before the pass, in `per_item_estimate` units.
    pub estimated_usage: f64,
    pub candidates: usize,
    pub evicted: usize,
}
