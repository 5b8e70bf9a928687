use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};
use predictive_window::{
    ItemKey, KeyCacheKey, Lifecycle, ReclaimOutcome, WindowError, WindowStats, WindowedStore,
};

/// A `WindowedStore` shared between a host thread and a background reclaimer.
///
/// Every access goes through one mutex, so a reclamation pass and a scroll update never
/// interleave. Timestamps come from a monotonic clock started when the handle was created.
pub struct SharedStore<T, K = ItemKey> {
    inner: Arc<Mutex<WindowedStore<T, K>>>,
    epoch: Instant,
}

impl<T, K> Clone for SharedStore<T, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            epoch: self.epoch,
        }
    }
}

impl<T, K: KeyCacheKey> SharedStore<T, K> {
    pub fn new(store: WindowedStore<T, K>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
            epoch: Instant::now(),
        }
    }

    /// Milliseconds since this handle was created.
    pub fn now_ms(&self) -> u64 {
        elapsed_ms(self.epoch)
    }

    pub fn lock(&self) -> MutexGuard<'_, WindowedStore<T, K>> {
        self.inner.lock()
    }

    pub fn initialize(&self, data: impl IntoIterator<Item = T>) -> Result<(), WindowError> {
        let now = self.now_ms();
        self.inner.lock().initialize(data, now)
    }

    pub fn update_visible_range(&self, scroll_offset: u64) {
        let now = self.now_ms();
        self.inner.lock().update_visible_range(scroll_offset, now);
    }

    pub fn poll_reclaim(&self) -> Option<ReclaimOutcome> {
        let now = self.now_ms();
        self.inner.lock().poll_reclaim(now)
    }

    pub fn take_render_queue(&self) -> Vec<K> {
        self.inner.lock().take_render_queue()
    }

    pub fn stats(&self) -> WindowStats {
        self.inner.lock().stats()
    }

    /// Destroys the store. A running reclaimer observes this on its next wake-up and exits.
    pub fn destroy(&self) {
        self.inner.lock().destroy();
    }
}

impl<T, K> SharedStore<T, K>
where
    T: Send + 'static,
    K: KeyCacheKey + Send + 'static,
{
    /// Starts a background thread that runs the reclaimer whenever the store's timer is due.
    ///
    /// The thread sleeps until the next due time (or one interval while the store is not yet
    /// initialized) and exits when the handle is cancelled/dropped or the store is destroyed.
    ///
    /// Passes run with the store locked, `on_evict` included. A callback that locks this
    /// `SharedStore` deadlocks; hand the key off (a channel, a queue) instead.
    pub fn spawn_reclaimer(&self) -> io::Result<ReclaimerHandle> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let inner = Arc::clone(&self.inner);
        let epoch = self.epoch;

        let thread = thread::Builder::new()
            .name("predictive-window-reclaimer".into())
            .spawn(move || {
                adebug!("reclaimer started");
                loop {
                    let wait = {
                        let store = inner.lock();
                        if store.lifecycle() == Lifecycle::Destroyed {
                            break;
                        }
                        let timer = store.reclaim_timer();
                        match timer.next_due_ms() {
                            Some(due) => due.saturating_sub(elapsed_ms(epoch)),
                            None => timer.interval_ms(),
                        }
                    };

                    match stop_rx.recv_timeout(Duration::from_millis(wait)) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    let now = elapsed_ms(epoch);
                    if inner.lock().poll_reclaim(now).is_some() {
                        atrace!(now, "reclaimer pass");
                    }
                }
                adebug!("reclaimer stopped");
            })?;

        Ok(ReclaimerHandle {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }
}

impl<T, K: core::fmt::Debug> core::fmt::Debug for SharedStore<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedStore")
            .field("inner", &self.inner)
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Handle to a running reclaimer thread.
///
/// `cancel` (or dropping the handle) stops the thread and waits for it to exit, so no pass
/// runs after it returns.
#[derive(Debug)]
pub struct ReclaimerHandle {
    stop: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ReclaimerHandle {
    pub fn cancel(mut self) {
        self.shutdown();
    }

    /// Whether the thread has exited (e.g. because the store was destroyed).
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    fn shutdown(&mut self) {
        // Dropping the sender wakes the worker with `Disconnected`.
        drop(self.stop.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                awarn!("reclaimer thread panicked");
            }
        }
    }
}

impl Drop for ReclaimerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn elapsed_ms(epoch: Instant) -> u64 {
    u64::try_from(epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
}
