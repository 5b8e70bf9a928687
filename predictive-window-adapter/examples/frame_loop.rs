// Example: drive a controller from a simulated 60 FPS frame loop.
use predictive_window::WindowOptions;
use predictive_window_adapter::Controller;

fn main() -> Result<(), predictive_window::WindowError> {
    let options = WindowOptions::new(32, 480)
        .with_overscan(4)
        .with_memory_threshold(64.0)
        .with_reclaim_interval_ms(1_000);
    let mut c = Controller::new(options)?;
    c.set_data(0..100_000u32, 0)?;

    let mut materialized = 0usize;
    for frame in 0..600u64 {
        let now_ms = frame * 16;
        // Steady fling: 40px per frame.
        c.on_scroll(frame * 40, now_ms);
        materialized += c.drain_render_queue(|_| {});
        if let Some(outcome) = c.tick(now_ms) {
            println!("t={now_ms}ms reclaim={outcome:?}");
        }
    }

    let target = c.scroll_to_index(99_999, 10_000);
    println!("scrolled to end: offset={target} stats={:?}", c.store().stats());
    println!("materialized={materialized}");
    c.destroy();
    Ok(())
}
