//! Per-thread partial nesting depth.
//!
//! Every partial runs as its own render, so the template engine's recursion
//! limit never sees the chain of partials that led to it. The count lives
//! here instead: a partial executing on a thread holds a [`DepthGuard`], and
//! a call made while `limit` guards are alive is refused.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// One active partial execution on the current thread.
#[derive(Debug)]
pub(crate) struct DepthGuard {
    // Must be dropped on the thread that entered.
    _not_send: PhantomData<*const ()>,
}

impl DepthGuard {
    /// Enters one level, or returns `None` when `limit` levels are already
    /// active on this thread.
    pub(crate) fn enter(limit: usize) -> Option<Self> {
        DEPTH.with(|depth| {
            let current = depth.get();
            if current >= limit {
                return None;
            }
            depth.set(current + 1);
            Some(Self {
                _not_send: PhantomData,
            })
        })
    }

    /// Levels active on the current thread.
    pub(crate) fn current() -> usize {
        DEPTH.with(Cell::get)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
