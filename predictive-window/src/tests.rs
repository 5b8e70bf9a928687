use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

fn expected_range(
    count: usize,
    scroll_offset: u64,
    item_height: u32,
    container_height: u32,
    overscan: usize,
) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let start = ((scroll_offset / item_height as u64) as usize).min(count);
    let mut fit = container_height / item_height;
    if container_height % item_height != 0 {
        fit += 1;
    }
    let end = (start + fit as usize + overscan).min(count);
    (start, end)
}

fn store_of(len: usize, options: WindowOptions) -> WindowedStore<usize> {
    let mut store = WindowedStore::new(options).unwrap();
    store.initialize(0..len, 0).unwrap();
    store
}

/// Rows of 10px in a 100px container, every scored entry near the window gets loaded.
fn eager_options() -> WindowOptions {
    WindowOptions::new(10, 100)
        .with_overscan(0)
        .with_predictive_loading_factor(1.0)
        .with_priority_threshold(0.0)
}

#[test]
fn scroll_scenario_matches_expected_window() {
    let mut store = store_of(1000, WindowOptions::new(120, 600).with_overscan(3));
    assert_eq!(store.total_extent(), 120_000);

    store.update_visible_range(0, 1);
    assert_eq!(store.visible_range(), VisibleRange::new(0, 8));

    store.update_visible_range(1200, 2);
    assert_eq!(store.visible_range(), VisibleRange::new(10, 18));

    let visible = store.visible_items();
    assert_eq!(visible.len(), 8);
    assert_eq!(visible[0].index(), 10);
    assert_eq!(visible[0].offset(), 1200);
    assert!(visible.iter().all(|e| e.is_visible()));
}

#[test]
fn predictive_scan_extends_half_the_window_each_side() {
    let mut store = store_of(
        1000,
        WindowOptions::new(120, 600)
            .with_overscan(3)
            .with_predictive_loading_factor(0.5),
    );
    store.update_visible_range(1200, 1);
    assert_eq!(store.visible_range(), VisibleRange::new(10, 18));
    assert_eq!(store.predictive_range(), VisibleRange::new(6, 22));

    // Nothing past either scan window has been scored.
    for entry in store.entries() {
        if entry.index() >= 22 {
            assert_eq!(entry.render_priority(), 0.0);
        }
    }
}

#[test]
fn reclaim_evicts_oldest_tenth_of_total() {
    let evicted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evicted);
    let options = eager_options()
        .with_memory_threshold(0.1)
        .with_per_item_estimate(0.001)
        .with_on_evict(Some(move |_: &ItemKey| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
    let mut store = store_of(200, options);

    // Walk the list one page at a time; page k is stamped at time k.
    for k in 1..20u64 {
        store.update_visible_range(k * 100, k);
    }
    assert_eq!(store.loaded_len(), 200);
    assert_eq!(store.visible_range(), VisibleRange::new(190, 200));

    let outcome = store.reclaim();
    assert_eq!(outcome.candidates, 190);
    assert_eq!(outcome.evicted, 20);
    assert_eq!(evicted.load(Ordering::Relaxed), 20);
    assert_eq!(store.loaded_len(), 180);

    for entry in store.entries() {
        let key = *entry.key();
        if entry.index() < 20 {
            assert!(!store.is_loaded(&key), "index {} should be evicted", entry.index());
        } else {
            assert!(store.is_loaded(&key));
        }
    }
    assert!(store.render_queue().iter().all(|k| store.is_loaded(k)));
}

#[test]
fn evicted_entries_can_be_loaded_again() {
    let mut store = store_of(
        200,
        eager_options()
            .with_memory_threshold(0.1)
            .with_per_item_estimate(0.001),
    );
    for k in 1..20u64 {
        store.update_visible_range(k * 100, k);
    }
    store.reclaim();
    let first = *store.entry(0).unwrap().key();
    assert!(!store.is_loaded(&first));
    assert!(store.entry(0).is_some());

    store.update_visible_range(0, 100);
    assert!(store.is_loaded(&first));
    assert_eq!(store.access_count(&first), 2);
}

#[test]
fn reclaim_is_a_noop_under_threshold() {
    let mut store = store_of(200, eager_options().with_memory_threshold(1_000.0));
    let before = store.loaded_len();
    assert!(before > 0);
    let outcome = store.reclaim();
    assert_eq!(outcome.evicted, 0);
    assert_eq!(outcome.candidates, 0);
    assert_eq!(store.loaded_len(), before);
}

#[test]
fn candidate_scale_sizes_batch_from_candidates() {
    let mut store = store_of(
        200,
        eager_options()
            .with_memory_threshold(0.0)
            .with_eviction(0.5, EvictionScale::Candidates),
    );
    // Window [0, 10) plus scan [10, 20) are loaded; only the scan half is evictable.
    assert_eq!(store.loaded_len(), 20);
    let outcome = store.reclaim();
    assert_eq!(outcome.candidates, 10);
    assert_eq!(outcome.evicted, 5);
}

#[test]
fn small_store_still_evicts_one() {
    // floor(5 * 0.1) == 0, but a pass over threshold evicts at least one entry.
    let mut store = store_of(
        5,
        WindowOptions::new(10, 10)
            .with_overscan(0)
            .with_predictive_loading_factor(1.0)
            .with_priority_threshold(0.0)
            .with_memory_threshold(0.0),
    );
    let loaded = store.loaded_len();
    assert_eq!(loaded, 2);
    let outcome = store.reclaim();
    assert_eq!(outcome.evicted, 1);
    assert_eq!(store.loaded_len(), loaded - 1);
    let visible = *store.visible_items()[0].key();
    assert!(store.is_loaded(&visible));
}

#[test]
fn zero_eviction_fraction_disables_eviction() {
    let mut store = store_of(
        200,
        eager_options()
            .with_memory_threshold(0.0)
            .with_eviction(0.0, EvictionScale::TotalItems),
    );
    let loaded = store.loaded_len();
    assert_eq!(loaded, 20);

    let outcome = store.reclaim();
    assert_eq!(outcome.candidates, 10);
    assert_eq!(outcome.evicted, 0);
    assert_eq!(store.loaded_len(), loaded);

    let mut store = store_of(
        200,
        eager_options()
            .with_memory_threshold(0.0)
            .with_eviction(0.0, EvictionScale::Candidates),
    );
    assert_eq!(store.reclaim().evicted, 0);
}

#[test]
fn jump_scroll_clears_the_old_window() {
    let mut store = store_of(100_000, eager_options().with_predictive_loading_factor(0.0));
    for (t, offset) in [0u64, 500_000, 999_950, 10].into_iter().enumerate() {
        store.update_visible_range(offset, t as u64);
        let range = store.visible_range();
        let flagged = store.entries().iter().filter(|e| e.is_visible()).count();
        assert_eq!(flagged, range.len());
        assert!(store.visible_items().iter().all(|e| range.contains(e.index())));
    }
    assert_eq!(store.visible_range(), VisibleRange::new(1, 11));
}

#[test]
fn timer_fires_on_interval_only() {
    let mut store: WindowedStore<usize> =
        WindowedStore::new(eager_options().with_reclaim_interval_ms(1_000)).unwrap();
    assert!(!store.reclaim_timer().is_armed());
    assert!(store.poll_reclaim(5_000).is_none());

    store.initialize(0..50, 100).unwrap();
    assert_eq!(store.reclaim_timer().next_due_ms(), Some(1_100));
    assert!(store.poll_reclaim(1_099).is_none());
    assert!(store.poll_reclaim(1_100).is_some());
    assert_eq!(store.reclaim_timer().next_due_ms(), Some(2_100));

    // A late tick does not replay missed periods.
    assert!(store.poll_reclaim(9_000).is_some());
    assert!(store.poll_reclaim(9_500).is_none());
    assert_eq!(store.stats().next_reclaim_ms, Some(10_000));
}

#[test]
fn destroy_is_idempotent_and_terminal() {
    let evicted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evicted);
    let mut store = store_of(
        100,
        eager_options()
            .with_memory_threshold(0.0)
            .with_on_evict(Some(move |_: &ItemKey| {
                counter.fetch_add(1, Ordering::Relaxed);
            })),
    );
    store.destroy();
    let stats = store.stats();
    store.destroy();
    assert_eq!(store.stats(), stats);
    assert_eq!(stats.lifecycle, Lifecycle::Destroyed);
    assert_eq!(stats.loaded, 0);
    assert_eq!(stats.tracked, 0);
    assert!(!store.reclaim_timer().is_armed());

    assert!(store.poll_reclaim(u64::MAX).is_none());
    assert_eq!(store.reclaim().evicted, 0);
    assert_eq!(evicted.load(Ordering::Relaxed), 0);

    store.update_visible_range(500, 1);
    assert!(store.visible_items().is_empty());
    assert_eq!(store.initialize(0..10, 2), Err(WindowError::Destroyed));
}

#[test]
fn reinitialize_resets_tracking() {
    let mut store = store_of(100, eager_options());
    store.update_visible_range(300, 1);
    store.update_visible_range(0, 2);
    let old = *store.entry(0).unwrap().key();
    assert_eq!(store.access_count(&old), 2);

    store.initialize(0..40, 3).unwrap();
    assert_eq!(store.len(), 40);
    assert_eq!(store.total_extent(), 400);
    let fresh = *store.entry(0).unwrap().key();
    assert_ne!(fresh, old);
    assert_eq!(store.access_count(&old), 0);
    assert_eq!(store.access_count(&fresh), 1);
    assert!(!store.is_loaded(&old));
    assert_eq!(store.entry(0).unwrap().last_accessed(), Some(3));
}

#[test]
fn predictive_loader_respects_flag() {
    let mut store = store_of(100, eager_options().with_ai_optimization_enabled(false));
    assert_eq!(store.loaded_len(), 0);
    assert!(store.render_queue().is_empty());

    store.set_ai_optimization_enabled(true);
    store.update_visible_range(0, 1);
    assert!(store.loaded_len() > 0);
    let queued = store.take_render_queue();
    assert_eq!(queued.len(), store.loaded_len());
    assert!(store.render_queue().is_empty());

    // Loaded entries are not queued twice.
    store.update_visible_range(0, 2);
    assert!(store.render_queue().is_empty());
}

#[test]
fn default_threshold_prefers_the_visible_edge() {
    let mut store = store_of(
        1000,
        WindowOptions::new(120, 600)
            .with_overscan(3)
            .with_predictive_loading_factor(0.5),
    );
    store.update_visible_range(1200, 1);
    // Just-seen entries next to a window edge clear 0.5; far scan entries do not.
    let edge = *store.entry(10).unwrap().key();
    assert!(store.is_loaded(&edge));
    let far = store.entry(21).unwrap();
    assert!(far.render_priority() <= 0.5);
    assert!(!store.is_loaded(far.key()));
}

#[test]
fn keyed_store_rejects_duplicates() {
    #[derive(Clone, Debug)]
    struct Row {
        id: &'static str,
    }

    let mut store = WindowedStore::with_key(WindowOptions::new(20, 100), |r: &Row| r.id).unwrap();
    let rows = [Row { id: "a" }, Row { id: "b" }, Row { id: "c" }];
    store.initialize(rows.iter().cloned(), 0).unwrap();
    assert_eq!(store.entry_by_key(&"b").map(VirtualEntry::index), Some(1));
    assert_eq!(store.entry_by_key(&"b").unwrap().data().id, "b");

    let dup = [Row { id: "x" }, Row { id: "y" }, Row { id: "x" }];
    assert_eq!(
        store.initialize(dup.iter().cloned(), 1),
        Err(WindowError::DuplicateKey { index: 2 })
    );
    // Unchanged on failure.
    assert_eq!(store.len(), 3);
    assert!(store.entry_by_key(&"a").is_some());
}

#[test]
fn invalid_configuration_fails_fast() {
    let cases: [(WindowOptions, &str); 6] = [
        (WindowOptions::new(0, 100), "item_height"),
        (WindowOptions::new(10, 0), "container_height"),
        (
            WindowOptions::new(10, 100).with_predictive_loading_factor(f64::NAN),
            "predictive_loading_factor",
        ),
        (
            WindowOptions::new(10, 100).with_memory_threshold(-1.0),
            "memory_threshold",
        ),
        (
            WindowOptions::new(10, 100).with_reclaim_interval_ms(0),
            "reclaim_interval_ms",
        ),
        (
            WindowOptions::new(10, 100).with_eviction(1.5, EvictionScale::TotalItems),
            "eviction_fraction",
        ),
    ];
    for (options, expected) in cases {
        match WindowedStore::<u8, ItemKey>::new(options) {
            Err(WindowError::InvalidConfiguration { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }
}

#[test]
fn container_resize_recomputes_window() {
    let mut store = store_of(100, WindowOptions::new(10, 50).with_overscan(0));
    store.update_visible_range(200, 1);
    assert_eq!(store.visible_range(), VisibleRange::new(20, 25));

    store.set_container_height(95, 2).unwrap();
    assert_eq!(store.visible_range(), VisibleRange::new(20, 30));
    assert_eq!(store.entry(29).unwrap().last_accessed(), Some(2));
    assert!(store.set_container_height(0, 3).is_err());
}

#[test]
fn empty_and_overscrolled_stores() {
    let mut store = store_of(0, WindowOptions::new(10, 100));
    store.update_visible_range(1_000, 1);
    assert_eq!(store.visible_range(), VisibleRange::EMPTY);
    assert!(store.visible_items().is_empty());

    let mut store = store_of(10, WindowOptions::new(10, 100).with_overscan(2));
    store.update_visible_range(1_000_000, 1);
    assert_eq!(store.visible_range(), VisibleRange::new(10, 10));
    assert!(store.entries().iter().all(|e| !e.is_visible()));
}

#[test]
fn priority_terms_saturate() {
    let best = render_priority(PrioritySignals {
        access_count: 1_000,
        recency_ms: Some(0),
        distance: 0,
    });
    assert!((best - 1.0).abs() < 1e-12);

    let worst = render_priority(PrioritySignals {
        access_count: 0,
        recency_ms: None,
        distance: 1_000,
    });
    assert_eq!(worst, 0.0);

    let stale = render_priority(PrioritySignals {
        access_count: 5,
        recency_ms: Some(10 * 60 * 1000),
        distance: 10,
    });
    assert!((stale - (0.4 * 0.5 + 0.3 * 0.5)).abs() < 1e-12);
}

#[test]
fn priority_stays_in_unit_interval() {
    let mut rng = Lcg::new(0x5eed);
    for _ in 0..10_000 {
        let signals = PrioritySignals {
            access_count: rng.gen_range_u64(0, 50),
            recency_ms: rng.gen_bool().then(|| rng.gen_range_u64(0, 1_000_000)),
            distance: rng.gen_range_usize(0, 60),
        };
        let p = render_priority(signals);
        assert!((0.0..=1.0).contains(&p), "{signals:?} -> {p}");
    }
}

#[test]
fn randomized_scrolls_keep_invariants() {
    let mut rng = Lcg::new(42);
    for _case in 0..40 {
        let count = rng.gen_range_usize(0, 300);
        let item_height = rng.gen_range_u32(1, 40);
        let container_height = rng.gen_range_u32(1, 400);
        let overscan = rng.gen_range_usize(0, 6);
        let options = WindowOptions::new(item_height, container_height)
            .with_overscan(overscan)
            .with_predictive_loading_factor(rng.gen_range_u32(0, 11) as f64 / 10.0)
            .with_priority_threshold(rng.gen_range_u32(0, 11) as f64 / 10.0)
            .with_memory_threshold(rng.gen_range_u32(0, 40) as f64);
        let mut store = store_of(count, options);
        assert_eq!(store.len(), count);
        for (i, entry) in store.entries().iter().enumerate() {
            assert_eq!(entry.index(), i);
        }

        let total = store.total_extent();
        let mut now = 0u64;
        for _step in 0..60 {
            now += rng.gen_range_u64(1, 5_000);
            let before: Vec<(ItemKey, bool, u64)> = store
                .entries()
                .iter()
                .map(|e| (*e.key(), e.is_visible(), store.access_count(e.key())))
                .collect();

            let offset = rng.gen_range_u64(0, total.saturating_add(500).max(1));
            store.update_visible_range(offset, now);

            let (start, end) =
                expected_range(count, offset, item_height, container_height, overscan);
            assert_eq!(store.visible_range(), VisibleRange::new(start, end));

            for (entry, (key, was_visible, old_count)) in store.entries().iter().zip(&before) {
                assert_eq!(entry.key(), key);
                assert_eq!(entry.is_visible(), (start..end).contains(&entry.index()));
                let new_count = store.access_count(key);
                let entered = !was_visible && entry.is_visible();
                assert_eq!(new_count, old_count + entered as u64);
                if entered {
                    assert_eq!(entry.last_accessed(), Some(now));
                }
                assert!((0.0..=1.0).contains(&entry.render_priority()));
            }

            if rng.gen_range_u32(0, 4) == 0 {
                let visible_loaded: Vec<ItemKey> = store
                    .visible_items()
                    .iter()
                    .map(|e| *e.key())
                    .filter(|k| store.is_loaded(k))
                    .collect();
                store.reclaim();
                for k in &visible_loaded {
                    assert!(store.is_loaded(k), "visible entry evicted");
                }
                for k in store.render_queue() {
                    assert!(store.entry_by_key(k).is_some());
                }
            }
        }
    }
}

#[test]
fn stats_snapshot_tracks_store() {
    let mut store = store_of(100, eager_options());
    store.update_visible_range(250, 7);
    let stats = store.stats();
    assert_eq!(stats.lifecycle, Lifecycle::Active);
    assert_eq!(stats.len, 100);
    assert_eq!(stats.visible_range, VisibleRange::new(25, 35));
    assert_eq!(stats.scroll_offset, 250);
    assert_eq!(stats.total_extent, 1_000);
    assert_eq!(stats.loaded, store.loaded_len());
    assert_eq!(stats.queued, store.render_queue().len());
    assert_eq!(stats.estimated_memory_usage, store.loaded_len() as f64);
}

#[test]
fn range_helpers_clamp() {
    assert_eq!(visible_range(10, 10_000, 10, 30, 2), VisibleRange::new(10, 10));
    // A 25px container over 10px rows shows parts of 3 rows.
    assert_eq!(visible_range(100, 5, 10, 25, 0), VisibleRange::new(0, 3));

    let r = VisibleRange::new(4, 9);
    assert_eq!(predictive_range(r, 0.0, 20), r);
    assert_eq!(
        predictive_range(VisibleRange::new(1, 9), 1.0, 12),
        VisibleRange::new(0, 12)
    );
}
