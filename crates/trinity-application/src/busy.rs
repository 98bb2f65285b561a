//! Re-entrancy flags held for the duration of an operation.

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds a flag raised; lowers it on drop, whatever path the holder takes.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Raises the flag, or returns `None` when it is already raised.
    pub(crate) fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_drop() {
        let flag = AtomicBool::new(false);
        let guard = BusyGuard::try_acquire(&flag);
        assert!(guard.is_some());
        assert!(BusyGuard::try_acquire(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(BusyGuard::try_acquire(&flag).is_some());
    }
}
