//! Revision tracking for injected style data.
//!
//! Every stylesheet injection or reset bumps the store revision, which
//! is reported in injection logs and by `StyleStore::revision`.

use core::cell::Cell;

/// A point in time of the style store.
///
/// Revisions only grow: a higher revision means a more recent injection.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Revision(u64);

impl Revision {
    /// The revision before anything was injected.
    pub const INITIAL: Self = Self(0);

    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_newer_than(self, other: Self) -> bool {
        self.0 > other.0
    }
}

/// Single-threaded revision counter.
#[derive(Debug, Default)]
pub struct RevisionCounter {
    current: Cell<u64>,
}

impl RevisionCounter {
    #[inline]
    pub const fn new() -> Self {
        Self {
            current: Cell::new(Revision::INITIAL.0),
        }
    }

    #[inline]
    pub fn current(&self) -> Revision {
        Revision(self.current.get())
    }

    /// Advance and return the new revision.
    #[inline]
    pub fn increment(&self) -> Revision {
        let next = self.current.get() + 1;
        self.current.set(next);
        Revision(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_monotonically() {
        let counter = RevisionCounter::new();
        let first = counter.increment();
        let second = counter.increment();
        assert!(second.is_newer_than(first));
        assert_eq!(counter.current(), second);
        assert_eq!(second.get(), 2);
    }
}
