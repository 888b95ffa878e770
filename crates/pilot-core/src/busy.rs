//! In-flight flags released on every exit path

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts outstanding requests of one kind.
///
/// The flag is raised by [`BusyFlag::enter`] / [`BusyFlag::try_enter`] and
/// lowered when the returned guard drops, so success, API failure, transport
/// failure and early `?` returns all clear it.
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicUsize);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire) > 0
    }

    /// Raise the flag unconditionally (several holders allowed)
    pub fn enter(&self) -> BusyGuard<'_> {
        self.0.fetch_add(1, Ordering::AcqRel);
        BusyGuard(&self.0)
    }

    /// Raise the flag only if nobody holds it
    pub fn try_enter(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }
}

#[must_use = "the flag is lowered as soon as the guard is dropped"]
pub struct BusyGuard<'a>(&'a AtomicUsize);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
