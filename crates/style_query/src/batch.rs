//! Batched notification.
//!
//! While a batch is open, notifications are queued instead of delivered. When
//! the outermost batch closes, each queued effect runs once, in the order it
//! was first notified, after every write of the batch has been committed.

use crate::effect::Effect;
use core::cell::RefCell;
use log::trace;
use rustc_hash::FxHashSet;

thread_local! {
    static PENDING: RefCell<Option<Vec<Effect>>> = const { RefCell::new(None) };
}

/// Run `body` with notifications deferred until it returns.
///
/// Nested batches join the outermost one.
pub fn batch<R>(body: impl FnOnce() -> R) -> R {
    let opened = PENDING.with(|pending| {
        let mut pending = pending.borrow_mut();
        if pending.is_some() {
            false
        } else {
            *pending = Some(Vec::new());
            true
        }
    });
    let result = body();
    if opened {
        flush();
    }
    result
}

/// Whether a batch is currently open on this thread.
pub fn is_batching() -> bool {
    PENDING.with(|pending| pending.borrow().is_some())
}

/// Queue `effect` if a batch is open. Returns `false` when it must run now.
pub(crate) fn defer(effect: &Effect) -> bool {
    PENDING.with(|pending| match pending.borrow_mut().as_mut() {
        Some(queue) => {
            queue.push(effect.clone());
            true
        }
        None => false,
    })
}

fn flush() {
    let queue = PENDING
        .with(|pending| pending.borrow_mut().take())
        .unwrap_or_default();
    let mut seen: FxHashSet<u64> = FxHashSet::default();
    let mut delivered = 0usize;
    for effect in queue {
        if seen.insert(effect.id().get()) {
            delivered += 1;
            effect.run();
        }
    }
    trace!("Batch flushed: {delivered} effect(s) notified");
}
