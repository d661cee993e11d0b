//! Reactive dependency tracking for runtime style resolution.
//!
//! This crate provides the small signal graph the style runtime is built on:
//! - [`Signal`]: a value cell, either written directly or derived lazily
//! - [`Effect`]: an observer that re-runs when a signal it read changes
//! - [`batch`]: group writes so every affected effect runs once, after all writes
//! - [`Family`]: keyed signal cache with explicit eviction of unobserved entries
//!
//! # Architecture
//!
//! ```text
//! Layer 0: Written signals (environment, injected rules, interaction state)
//!     ↓
//! Layer 1: Derived signals (lazy, re-computed on next read after invalidation)
//!     ↓
//! Layer 2: Effects (component re-render callbacks)
//! ```
//!
//! Dependency tracking is explicit: a reader passes the effect that should be
//! notified to [`Signal::get`]. Derived signals pass their own internal effect
//! while computing, so their inputs are tracked transitively.
//!
//! # Example
//!
//! ```ignore
//! use style_query::{Effect, Signal, batch};
//!
//! let width = Signal::new(320.0f64);
//! let wide = Signal::derived(move |tracker| width.get(Some(tracker)) > 600.0);
//! let effect = Effect::new(|| log::info!("layout changed"));
//! assert!(!wide.get(Some(&effect)));
//! batch(|| width.set(800.0)); // effect runs exactly once
//! ```

#![allow(
    clippy::module_name_repetitions,
    reason = "Types like SignalFamily read better with the prefix"
)]

mod batch;
mod effect;
mod family;
mod revision;
mod signal;

pub use batch::{batch, is_batching};
pub use effect::{Effect, EffectId};
pub use family::Family;
pub use revision::{Revision, RevisionCounter};
pub use signal::Signal;
