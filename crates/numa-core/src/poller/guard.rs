//! RAII guard that marks a poll cycle as in flight.

use std::sync::atomic::{AtomicBool, Ordering};

/// Clears the in-flight flag when dropped.
pub(super) struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    /// `None` if another cycle already holds the flag.
    pub(super) fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let flag = AtomicBool::new(false);
        let g = InFlightGuard::try_acquire(&flag).unwrap();
        assert!(InFlightGuard::try_acquire(&flag).is_none());
        drop(g);
        assert!(InFlightGuard::try_acquire(&flag).is_some());
    }
}
