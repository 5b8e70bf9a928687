//! Window arithmetic over uniformly sized rows.

use crate::VisibleRange;

/// Computes the index window to render for `scroll_offset`.
///
/// `start = floor(scroll_offset / item_height)`, and the window spans the rows that fit the
/// container (rounded up) plus `overscan` more past the end, clamped to `count`. Offsets past the
/// end of the list are accepted and yield an empty window at `count`.
pub fn visible_range(
    count: usize,
    scroll_offset: u64,
    item_height: u32,
    container_height: u32,
    overscan: usize,
) -> VisibleRange {
    if count == 0 || item_height == 0 {
        return VisibleRange::EMPTY;
    }
    let start = scroll_offset / item_height as u64;
    let start = usize::try_from(start).unwrap_or(usize::MAX).min(count);
    let per_view = container_height.div_ceil(item_height) as usize;
    let end = start
        .saturating_add(per_view)
        .saturating_add(overscan)
        .min(count);
    VisibleRange::new(start, end)
}

/// Extends `range` on both sides by `floor(range.len() * factor)`, clamped to `[0, count)`.
///
/// This is the scan window of the predictive loader.
pub fn predictive_range(range: VisibleRange, factor: f64, count: usize) -> VisibleRange {
    let extend = predictive_extent(range.len(), factor);
    let start = range.start_index.saturating_sub(extend);
    let end = range.end_index.saturating_add(extend).min(count);
    VisibleRange::new(start.min(end), end)
}

fn predictive_extent(len: usize, factor: f64) -> usize {
    let raw = len as f64 * factor;
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    // `as` truncates toward zero, which is floor for positive values.
    raw as usize
}
