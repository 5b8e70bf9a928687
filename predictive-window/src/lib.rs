//! A headless windowed-rendering engine with predictive loading.
//!
//! For host-side drivers (frame-tick controller, threaded reclaimer), see the
//! `predictive-window-adapter` crate.
//!
//! The engine keeps a large item sequence and renders only a window of it:
//! - a visible range computed from the scroll offset, viewport height and overscan,
//! - per-item access counters fed by visibility transitions,
//! - a predictive loader that scores entries around the window by access frequency,
//!   recency and proximity, and queues the promising ones for materialization,
//! - a memory reclaimer that evicts the oldest off-screen loaded entries once a flat
//!   per-item usage estimate crosses a threshold.
//!
//! It is UI-agnostic. A host layer is expected to provide:
//! - the item sequence
//! - scroll offsets (and viewport height changes)
//! - a monotonic clock in milliseconds
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod behavior;
mod error;
mod key;
mod options;
mod priority;
mod range;
mod reclaim;
mod state;
mod store;
mod types;

#[cfg(test)]
mod tests;

pub use error::WindowError;
pub use options::{EvictionScale, OnEvictCallback, WindowConfig, WindowOptions};
pub use priority::{PrioritySignals, render_priority};
pub use range::{predictive_range, visible_range};
pub use reclaim::ReclaimTimer;
pub use state::WindowStats;
pub use store::WindowedStore;
pub use types::{ItemKey, Lifecycle, ReclaimOutcome, VirtualEntry, VisibleRange};

#[doc(hidden)]
pub use key::KeyCacheKey;
