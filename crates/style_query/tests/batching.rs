//! Batched invalidation across many signals.
#![cfg(test)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use style_query::{Effect, Signal, batch, is_batching};

fn init_logging() {
    env_logger::builder().is_test(true).try_init().unwrap_or_default();
}

#[test]
fn each_effect_runs_once_per_batch() {
    init_logging();
    let signals: Vec<Signal<u32>> = (0..5).map(Signal::new).collect();
    let runs = Rc::new(Cell::new(0));
    let seen = Rc::clone(&runs);
    let effect = Effect::new(move || seen.set(seen.get() + 1));
    for signal in &signals {
        signal.get(Some(&effect));
    }

    batch(|| {
        for (index, signal) in signals.iter().enumerate() {
            signal.set(index as u32 + 10);
        }
        assert!(is_batching());
        assert_eq!(runs.get(), 0);
    });

    assert_eq!(runs.get(), 1);
    assert!(!is_batching());
}

#[test]
fn effects_observe_committed_state() {
    init_logging();
    let first = Signal::new(0u32);
    let second = Signal::new(0u32);
    let observed = Rc::new(RefCell::new(Vec::new()));

    let (left, right, log) = (first.clone(), second.clone(), Rc::clone(&observed));
    let effect = Effect::new(move || log.borrow_mut().push((left.peek(), right.peek())));
    first.get(Some(&effect));
    second.get(Some(&effect));

    batch(|| {
        first.set(1);
        second.set(2);
    });
    assert_eq!(*observed.borrow(), vec![(1, 2)]);
}

#[test]
fn nested_batches_flush_with_the_outermost() {
    init_logging();
    let signal = Signal::new(0u32);
    let runs = Rc::new(Cell::new(0));
    let seen = Rc::clone(&runs);
    let effect = Effect::new(move || seen.set(seen.get() + 1));
    signal.get(Some(&effect));

    batch(|| {
        batch(|| signal.set(1));
        assert_eq!(runs.get(), 0);
        signal.set(2);
    });
    assert_eq!(runs.get(), 1);
}

#[test]
fn derived_chain_inside_batch() {
    init_logging();
    let width = Signal::new(320.0f64);
    let source = width.clone();
    let wide = Signal::derived(move |tracker| source.get(Some(tracker)) > 600.0);
    let runs = Rc::new(Cell::new(0));
    let seen = Rc::clone(&runs);
    let effect = Effect::new(move || seen.set(seen.get() + 1));
    assert!(!wide.get(Some(&effect)));

    batch(|| {
        width.set(700.0);
        assert!(wide.peek());
        width.set(800.0);
    });
    assert_eq!(runs.get(), 1);
    assert!(wide.get(Some(&effect)));
}
