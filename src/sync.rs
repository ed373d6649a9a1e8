//! Synchronization primitives shared by the search threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shareable boolean flag used for the abort and search-stopped signals.
///
/// The abort signal is written with release ordering and read with acquire
/// ordering so that a thread observing the flag also observes everything the
/// setter did before raising it.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    #[must_use]
    pub fn new() -> Self {
        StopFlag(Arc::new(AtomicBool::new(false)))
    }

    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_lifecycle() {
        let flag = StopFlag::new();
        assert!(!flag.is_set());
        flag.set();
        assert!(flag.is_set());
        flag.clear();
        assert!(!flag.is_set());
    }

    #[test]
    fn flag_shared_between_clones() {
        let a = StopFlag::new();
        let b = a.clone();
        a.set();
        assert!(b.is_set());
    }
}
