//! Keyed signal caches.
//!
//! A family lazily creates one signal per key (class name, container name,
//! variable name) and keeps it until it is explicitly deleted or evicted
//! because nothing observes it anymore.

use crate::signal::Signal;
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;
use log::trace;
use rustc_hash::FxHashMap;

/// Memoized signal factory keyed by `K`.
pub struct Family<K, T> {
    signals: RefCell<FxHashMap<K, Signal<T>>>,
    factory: Box<dyn Fn(&K) -> Signal<T>>,
}

impl<K: fmt::Debug, T> fmt::Debug for Family<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f
            .debug_struct("Family")
            .field("len", &self.signals.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<K, T> Family<K, T>
where
    K: Clone + Eq + Hash + fmt::Debug,
    T: Clone + 'static,
{
    /// Create a family whose signals are built by `factory` on first access.
    pub fn new(factory: impl Fn(&K) -> Signal<T> + 'static) -> Self {
        Self {
            signals: RefCell::new(FxHashMap::default()),
            factory: Box::new(factory),
        }
    }

    /// Signal for `key`, created on first access.
    pub fn get(&self, key: &K) -> Signal<T> {
        if let Some(signal) = self.signals.borrow().get(key) {
            trace!("Family hit: {key:?}");
            return signal.clone();
        }
        trace!("Family miss: {key:?}");
        let signal = (self.factory)(key);
        self.signals.borrow_mut().insert(key.clone(), signal.clone());
        signal
    }

    /// Signal for `key` only if it already exists.
    pub fn existing(&self, key: &K) -> Option<Signal<T>> {
        self.signals.borrow().get(key).cloned()
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.signals.borrow().contains_key(key)
    }

    /// Remove the signal for `key`.
    pub fn delete(&self, key: &K) -> Option<Signal<T>> {
        self.signals.borrow_mut().remove(key)
    }

    /// Drop every signal that has no observers left. Returns how many were removed.
    pub fn evict_unobserved(&self) -> usize {
        let mut signals = self.signals.borrow_mut();
        let before = signals.len();
        signals.retain(|_, signal| signal.observer_count() > 0);
        let evicted = before - signals.len();
        if evicted > 0 {
            trace!("Family evicted {evicted} unobserved signal(s)");
        }
        evicted
    }

    /// Snapshot of the current keys.
    pub fn keys(&self) -> Vec<K> {
        self.signals.borrow().keys().cloned().collect()
    }

    /// Remove every signal.
    pub fn clear(&self) {
        self.signals.borrow_mut().clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.signals.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.signals.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Effect;

    #[test]
    fn memoizes_by_key() {
        let family: Family<String, u32> = Family::new(|key: &String| Signal::new(key.len() as u32));
        let first = family.get(&"abc".to_owned());
        let second = family.get(&"abc".to_owned());
        assert!(first.ptr_eq(&second));
        assert_eq!(first.peek(), 3);
        assert_eq!(family.len(), 1);
    }

    #[test]
    fn evicts_only_unobserved_signals() {
        let family: Family<&'static str, u32> = Family::new(|_key: &&str| Signal::new(0));
        let effect = Effect::new(|| {});
        family.get(&"kept").get(Some(&effect));
        family.get(&"dropped");
        assert_eq!(family.evict_unobserved(), 1);
        assert!(family.contains(&"kept"));
        effect.dispose();
        assert_eq!(family.evict_unobserved(), 1);
        assert!(family.is_empty());
    }
}
