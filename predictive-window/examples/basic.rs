// Example: scroll through a long list and run a reclamation pass.
use predictive_window::{WindowOptions, WindowedStore};

fn main() -> Result<(), predictive_window::WindowError> {
    let options = WindowOptions::new(120, 600)
        .with_overscan(3)
        .with_predictive_loading_factor(0.5)
        .with_memory_threshold(16.0);
    let mut store = WindowedStore::new(options)?;
    store.initialize((0..1_000).map(|i| format!("row {i}")), 0)?;
    println!("total_extent={}", store.total_extent());

    for (step, offset) in [0u64, 1_200, 2_400, 3_600, 1_200].into_iter().enumerate() {
        store.update_visible_range(offset, step as u64 * 16);
        let queued = store.take_render_queue();
        let first = store.visible_items().first().map(|e| e.data().as_str());
        println!(
            "offset={offset} range={:?} first={first:?} queued={queued:?}",
            store.visible_range()
        );
    }

    let outcome = store.reclaim();
    println!("reclaim={outcome:?} stats={:?}", store.stats());

    store.destroy();
    Ok(())
}
