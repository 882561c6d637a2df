//! handle
//!
//! Ownership of native libgit2 pointers.
//!
//! # Architecture
//!
//! Every wrapper type in this crate (patches, credentials, repositories,
//! references, ...) stores its pointer in a [`NativeHandle`]. The handle is
//! the single place that knows how a pointer is released:
//!
//! - [`NativeHandle::release`] frees the pointer explicitly and leaves the
//!   released sentinel behind; a second release is [`Error::Invalid`]
//! - `Drop` frees a pointer that was never released and logs that it did so
//! - [`NativeHandle::get`] refuses to hand out a released pointer, so no
//!   native call is made on freed memory
//!
//! Release takes `&mut self`, so it cannot overlap any in-flight `&self`
//! operation on the same wrapper. Handles are `Send` but not `Sync`: a
//! wrapper may move between threads but is used from one thread at a time.
//!
//! # Example
//!
//! ```ignore
//! struct RawPatch;
//!
//! impl NativeResource for RawPatch {
//!     type Raw = raw::git_patch;
//!     const KIND: &'static str = "patch";
//!
//!     unsafe fn free(raw: *mut raw::git_patch) {
//!         raw::git_patch_free(raw)
//!     }
//! }
//!
//! let mut handle = unsafe { NativeHandle::<RawPatch>::from_raw(ptr) }.unwrap();
//! handle.release()?;
//! assert!(handle.release().is_err());
//! ```

mod pin;

pub use pin::{pinned, ThreadPin};

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use tracing::debug;

use crate::error::Error;

/// A kind of native object and the function that frees it.
pub trait NativeResource {
    /// The opaque libgit2 type.
    type Raw;

    /// Name used in errors and log events.
    const KIND: &'static str;

    /// Free a pointer previously produced by libgit2.
    ///
    /// # Safety
    ///
    /// `raw` must be a live pointer of this kind that nothing else frees.
    unsafe fn free(raw: *mut Self::Raw);
}

/// Exactly one owned native pointer, or the released sentinel.
pub struct NativeHandle<R: NativeResource> {
    ptr: Option<NonNull<R::Raw>>,
    _kind: PhantomData<fn() -> R>,
}

impl<R: NativeResource> NativeHandle<R> {
    /// Take ownership of a pointer returned by a libgit2 factory.
    ///
    /// A null pointer produces no handle.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a live pointer of kind `R` whose ownership
    /// passes to the returned handle.
    pub unsafe fn from_raw(raw: *mut R::Raw) -> Option<Self> {
        NonNull::new(raw).map(|ptr| Self {
            ptr: Some(ptr),
            _kind: PhantomData,
        })
    }

    /// The live pointer, or [`Error::Invalid`] once released.
    pub fn get(&self) -> Result<*mut R::Raw, Error> {
        self.ptr
            .map(NonNull::as_ptr)
            .ok_or(Error::Invalid { kind: R::KIND })
    }

    /// Whether the pointer has been released or handed off.
    pub fn is_released(&self) -> bool {
        self.ptr.is_none()
    }

    /// Free the pointer now.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the handle was already released.
    pub fn release(&mut self) -> Result<(), Error> {
        let ptr = self.ptr.take().ok_or(Error::Invalid { kind: R::KIND })?;
        unsafe { R::free(ptr.as_ptr()) };
        debug!(kind = R::KIND, "released native handle");
        Ok(())
    }

    /// Give up ownership without freeing.
    ///
    /// Used when libgit2 itself takes over the pointer. The handle is left
    /// in the released state.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the handle was already released.
    pub fn take(&mut self) -> Result<*mut R::Raw, Error> {
        self.ptr
            .take()
            .map(NonNull::as_ptr)
            .ok_or(Error::Invalid { kind: R::KIND })
    }
}

impl<R: NativeResource> Drop for NativeHandle<R> {
    fn drop(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            debug!(kind = R::KIND, "finalizing native handle that was never released");
            unsafe { R::free(ptr.as_ptr()) };
        }
    }
}

impl<R: NativeResource> fmt::Debug for NativeHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("kind", &R::KIND)
            .field("ptr", &self.ptr)
            .finish()
    }
}

// libgit2 objects carry no thread affinity of their own; only the error slot
// does, and that is handled by `ThreadPin` around each call.
unsafe impl<R: NativeResource> Send for NativeHandle<R> {}
