//! Debug-only reentrancy guard.
//!
//! Tracks, per thread, which maps currently hold a stripe lock. Entering
//! the same map twice from one thread (a `compute` remap calling back into
//! the map) would either deadlock on the non-reentrant stripe lock or hold
//! two stripes at once. In debug builds that panics instead. In release
//! builds this compiles to a zero-cost no-op.

use core::marker::PhantomData;
#[cfg(debug_assertions)]
use core::sync::atomic::{AtomicUsize, Ordering};
#[cfg(debug_assertions)]
use std::cell::RefCell;

#[cfg(debug_assertions)]
static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

#[cfg(debug_assertions)]
thread_local! {
    static HELD: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Per-map reentrancy tracker. Guard every stripe acquisition with
/// `let _g = self.reentrancy.enter();` before taking the lock.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    id: usize,
}

impl DebugReentrancy {
    pub(crate) fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Enter a guarded section on the current thread. In debug builds,
    /// panics if this thread is already inside the same map.
    #[inline]
    pub(crate) fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            let nested = HELD.with(|held| {
                let mut held = held.borrow_mut();
                if held.contains(&self.id) {
                    true
                } else {
                    held.push(self.id);
                    false
                }
            });
            assert!(
                !nested,
                "reentrancy detected: nested entry into map while a stripe lock is held"
            );
            return ReentrancyGuard {
                owner: self,
                _nosend: PhantomData,
            };
        }

        #[cfg(not(debug_assertions))]
        {
            return ReentrancyGuard {
                _z: PhantomData,
                _nosend: PhantomData,
            };
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`. Bound to the entering
/// thread, so it is `!Send`.
pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
    _nosend: PhantomData<*mut ()>,
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let id = self.owner.id;
            let _ = HELD.try_with(|held| {
                let mut held = held.borrow_mut();
                let pos = held.iter().rposition(|&h| h == id);
                debug_assert!(pos.is_some());
                if let Some(pos) = pos {
                    held.swap_remove(pos);
                }
            });
        }
    }
}
