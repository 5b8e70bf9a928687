//! Host-side drivers for the `predictive-window` crate.
//!
//! The `predictive-window` crate is UI-agnostic and holds no clock. This crate provides small,
//! framework-neutral helpers commonly needed by hosts:
//!
//! - A frame-tick [`Controller`] that routes scroll/resize events and runs the reclaimer
//!   schedule from the host's own clock
//! - A [`SharedStore`] with a background reclaimer thread for multi-threaded hosts (`std`)
//!
//! This crate is intentionally framework-agnostic (no DOM/egui/ratatui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
#[cfg(feature = "std")]
mod shared;


pub use controller::Controller;
#[cfg(feature = "std")]
pub use shared::{ReclaimerHandle, SharedStore};
