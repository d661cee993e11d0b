//! Effects: observers that are re-run when a signal they read changes.

use crate::batch;
use core::cell::{Cell, RefCell};
use core::fmt;
use log::trace;
use std::rc::{Rc, Weak};

/// Stable identity of an effect, used to key observer sets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId(u64);

thread_local! {
    static NEXT_EFFECT_ID: Cell<u64> = const { Cell::new(1) };
}

impl EffectId {
    fn next() -> Self {
        NEXT_EFFECT_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            Self(id)
        })
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Something an effect can be subscribed to.
pub(crate) trait Observed {
    /// Drop `id` from the observer set.
    fn remove_observer(&self, id: EffectId);
}

pub(crate) struct EffectInner {
    pub(crate) id: EffectId,
    run: Box<dyn Fn()>,
    /// Run synchronously even inside a batch (derived-signal invalidation).
    pub(crate) immediate: bool,
    subscriptions: RefCell<Vec<Weak<dyn Observed>>>,
    disposed: Cell<bool>,
}

/// An observer callback.
///
/// Cloning an `Effect` yields another handle to the same observer.
#[derive(Clone)]
pub struct Effect {
    pub(crate) inner: Rc<EffectInner>,
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f
            .debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("subscriptions", &self.subscription_count())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

impl Effect {
    /// Create an effect that calls `run` whenever an observed signal changes.
    pub fn new(run: impl Fn() + 'static) -> Self {
        Self::build(run, false)
    }

    /// Effect that bypasses batching.
    pub(crate) fn immediate(run: impl Fn() + 'static) -> Self {
        Self::build(run, true)
    }

    fn build(run: impl Fn() + 'static, immediate: bool) -> Self {
        Self {
            inner: Rc::new(EffectInner {
                id: EffectId::next(),
                run: Box::new(run),
                immediate,
                subscriptions: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> EffectId {
        self.inner.id
    }

    #[inline]
    pub(crate) fn downgrade(&self) -> Weak<EffectInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn record_subscription(&self, source: Weak<dyn Observed>) {
        self.inner.disposed.set(false);
        self.inner.subscriptions.borrow_mut().push(source);
    }

    /// Number of live signals this effect is subscribed to.
    pub fn subscription_count(&self) -> usize {
        self.inner
            .subscriptions
            .borrow()
            .iter()
            .filter(|source| source.strong_count() > 0)
            .count()
    }

    /// Remove this effect from every signal it observes.
    ///
    /// Called before each recomputation so that only the signals read during
    /// the new pass stay subscribed.
    pub fn unsubscribe(&self) {
        let sources: Vec<Weak<dyn Observed>> = self.inner.subscriptions.borrow_mut().drain(..).collect();
        for source in sources {
            if let Some(source) = source.upgrade() {
                source.remove_observer(self.inner.id);
            }
        }
    }

    /// Unsubscribe and ignore any notification still in flight.
    pub fn dispose(&self) {
        self.unsubscribe();
        self.inner.disposed.set(true);
        trace!("Effect {:?} disposed", self.inner.id);
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Invoke the callback now.
    pub fn run(&self) {
        if self.inner.disposed.get() {
            return;
        }
        (self.inner.run)();
    }

    /// Deliver a change notification, deferring it when a batch is open.
    pub(crate) fn notify(&self) {
        if self.inner.immediate || !batch::defer(self) {
            self.run();
        }
    }
}

impl EffectInner {
    pub(crate) fn handle(self: Rc<Self>) -> Effect {
        Effect { inner: self }
    }
}
