//! handle::pin
//!
//! Thread pinning for native call sequences.
//!
//! libgit2 keeps its last-error slot (and some option state) per OS thread.
//! A call and the error read that follows it must therefore run on the same
//! thread with nothing in between. [`ThreadPin`] marks such a span: it is
//! `!Send`, so it cannot be held across an `.await` in a `Send` future and the
//! span can never migrate to another worker thread.
//!
//! Synchronous code never changes threads mid-call, so the pin adds no
//! scheduling constraint of its own. It is a checked marker: the error reader
//! asserts (in debug builds) that it runs inside one, which catches any path
//! that reads the error slot without going through `ffi::call`.
//!
//! # Invariants
//!
//! - The pin is released on every exit path, including unwinding
//! - Pins nest; the thread stays pinned until the outermost guard drops

use std::cell::Cell;
use std::marker::PhantomData;
use std::thread::{self, ThreadId};

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Guard that keeps the current call sequence on one OS thread.
///
/// # Example
///
/// ```
/// use gitbind::handle::ThreadPin;
///
/// assert!(!ThreadPin::is_pinned());
/// {
///     let _pin = ThreadPin::acquire();
///     assert!(ThreadPin::is_pinned());
/// }
/// assert!(!ThreadPin::is_pinned());
/// ```
#[derive(Debug)]
pub struct ThreadPin {
    thread: ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl ThreadPin {
    /// Pin the current thread until the guard drops.
    pub fn acquire() -> Self {
        DEPTH.with(|d| d.set(d.get() + 1));
        Self {
            thread: thread::current().id(),
            _not_send: PhantomData,
        }
    }

    /// The thread this pin was taken on.
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// Whether the current thread holds at least one pin.
    pub fn is_pinned() -> bool {
        DEPTH.with(|d| d.get() > 0)
    }
}

impl Drop for ThreadPin {
    fn drop(&mut self) {
        debug_assert_eq!(thread::current().id(), self.thread);
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Run `f` with the current thread pinned.
pub fn pinned<T>(f: impl FnOnce() -> T) -> T {
    let _pin = ThreadPin::acquire();
    f()
}
