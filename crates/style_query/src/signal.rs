//! Signals: observable value cells.

use crate::effect::{Effect, EffectId, EffectInner, Observed};
use core::cell::{Cell, RefCell};
use core::fmt;
use log::trace;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

type Compute<T> = Box<dyn Fn(&Effect) -> T>;
type Equality<T> = Box<dyn Fn(&T, &T) -> bool>;

struct Derivation<T> {
    compute: Compute<T>,
    /// Tracks the inputs read by `compute`; invalidates the signal when one changes.
    tracker: Effect,
}

struct SignalInner<T> {
    value: RefCell<T>,
    equals: Equality<T>,
    /// Keyed by id so notification order is creation order.
    observers: RefCell<BTreeMap<EffectId, Weak<EffectInner>>>,
    derivation: Option<Derivation<T>>,
    dirty: Cell<bool>,
}

impl<T: 'static> Observed for SignalInner<T> {
    fn remove_observer(&self, id: EffectId) {
        self.observers.borrow_mut().remove(&id);
    }
}

impl<T: Clone + 'static> SignalInner<T> {
    /// Deliver a change notification to every live observer.
    fn notify_observers(&self) {
        let observers: Vec<Effect> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|_, observer| observer.strong_count() > 0);
            observers
                .values()
                .filter_map(Weak::upgrade)
                .map(EffectInner::handle)
                .collect()
        };
        for observer in observers {
            observer.notify();
        }
    }

    /// Mark a derived value stale and propagate.
    fn invalidate(&self) {
        if !self.dirty.replace(true) {
            self.notify_observers();
        }
    }

    fn recompute(&self, derivation: &Derivation<T>) -> T {
        derivation.tracker.unsubscribe();
        let value = (derivation.compute)(&derivation.tracker);
        *self.value.borrow_mut() = value.clone();
        self.dirty.set(false);
        value
    }
}

/// A reactive value.
///
/// Reading with [`Signal::get`] subscribes the given effect; writing with
/// [`Signal::set`] notifies subscribers when the value actually changed.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f
            .debug_struct("Signal")
            .field("value", &self.inner.value.borrow())
            .field("observers", &self.inner.observers.borrow().len())
            .field("derived", &self.inner.derivation.is_some())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Written signal compared with `PartialEq`.
    pub fn new(value: T) -> Self {
        Self::with_equality(value, |left, right| left == right)
    }

    /// Derived signal compared with `PartialEq`.
    ///
    /// The value is computed once on creation; afterwards it is recomputed
    /// lazily on the first read following a change of any input.
    pub fn derived(compute: impl Fn(&Effect) -> T + 'static) -> Self {
        let compute: Compute<T> = Box::new(compute);
        let inner = Rc::new_cyclic(|weak: &Weak<SignalInner<T>>| {
            let weak = weak.clone();
            let tracker = Effect::immediate(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.invalidate();
                }
            });
            let initial = compute(&tracker);
            SignalInner {
                value: RefCell::new(initial),
                equals: Box::new(|left: &T, right: &T| left == right),
                observers: RefCell::new(BTreeMap::new()),
                derivation: Some(Derivation { compute, tracker }),
                dirty: Cell::new(false),
            }
        });
        Self { inner }
    }
}

impl<T: Clone + 'static> Signal<T> {
    /// Written signal with a custom equality test.
    pub fn with_equality(value: T, equals: impl Fn(&T, &T) -> bool + 'static) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                equals: Box::new(equals),
                observers: RefCell::new(BTreeMap::new()),
                derivation: None,
                dirty: Cell::new(false),
            }),
        }
    }

    /// Read the value, subscribing `observer` when given.
    pub fn get(&self, observer: Option<&Effect>) -> T {
        if let Some(effect) = observer {
            self.subscribe(effect);
        }
        if self.inner.dirty.get()
            && let Some(derivation) = &self.inner.derivation
        {
            return self.inner.recompute(derivation);
        }
        self.inner.value.borrow().clone()
    }

    /// Read without subscribing.
    #[inline]
    pub fn peek(&self) -> T {
        self.get(None)
    }

    /// Replace the value, notifying observers if it changed.
    ///
    /// Writing to a derived signal overrides its value until an input changes.
    pub fn set(&self, value: T) {
        let changed = !(self.inner.equals)(&self.inner.value.borrow(), &value);
        self.inner.dirty.set(false);
        if !changed {
            return;
        }
        *self.inner.value.borrow_mut() = value;
        self.inner.notify_observers();
    }

    /// Apply `update` to a copy of the value and write the result.
    pub fn update(&self, update: impl FnOnce(&mut T)) {
        let mut value = self.peek();
        update(&mut value);
        self.set(value);
    }

    /// Subscribe `effect` to future changes.
    pub fn subscribe(&self, effect: &Effect) {
        let inserted = self
            .inner
            .observers
            .borrow_mut()
            .insert(effect.id(), effect.downgrade())
            .is_none();
        if inserted {
            let weak: Weak<SignalInner<T>> = Rc::downgrade(&self.inner);
            let source: Weak<dyn Observed> = weak;
            effect.record_subscription(source);
            trace!("Effect {:?} subscribed", effect.id());
        }
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.inner
            .observers
            .borrow()
            .values()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }

    #[inline]
    pub fn is_derived(&self) -> bool {
        self.inner.derivation.is_some()
    }

    /// Whether both handles point to the same signal.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
