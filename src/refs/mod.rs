//! refs
//!
//! Reference handles and reference iteration.
//!
//! # Iteration
//!
//! libgit2 signals the end of a reference walk with the "iteration over"
//! status code. [`ReferenceIterator::next_reference`] turns that code into
//! `Ok(None)` and passes every other failure through, so a loop can stop on
//! exhaustion without mistaking it for an error. The [`Iterator`] impl is
//! built on top and fuses after the first error.
//!
//! # Example
//!
//! ```no_run
//! use gitbind::Repository;
//!
//! let repo = Repository::open(".")?;
//! for reference in repo.references()? {
//!     let reference = reference?;
//!     println!("{} -> {:?}", reference.name()?, reference.target()?);
//! }
//! # Ok::<(), gitbind::Error>(())
//! ```

mod iter;
mod namespace;

pub use iter::ReferenceIterator;
pub use namespace::{namespace_prefix, split_namespace};

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use libc::{c_char, c_int};
use libgit2_sys as raw;

use crate::error::Error;
use crate::ffi;
use crate::handle::{NativeHandle, NativeResource};
use crate::oid::Oid;
use crate::repo::Repository;

/// How a reference points at its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Points directly at an object id.
    Direct,
    /// Points at another reference by name.
    Symbolic,
}

impl ReferenceKind {
    fn from_raw(raw: raw::git_reference_t) -> Option<Self> {
        match raw {
            raw::GIT_REFERENCE_DIRECT => Some(ReferenceKind::Direct),
            raw::GIT_REFERENCE_SYMBOLIC => Some(ReferenceKind::Symbolic),
            _ => None,
        }
    }
}

struct RawReference;

impl NativeResource for RawReference {
    type Raw = raw::git_reference;
    const KIND: &'static str = "reference";

    unsafe fn free(raw: *mut raw::git_reference) {
        raw::git_reference_free(raw)
    }
}

/// A reference (branch, tag, HEAD, ...) in a [`Repository`].
pub struct Reference<'repo> {
    handle: NativeHandle<RawReference>,
    _repo: PhantomData<&'repo Repository>,
}

impl<'repo> Reference<'repo> {
    /// Wrap the result of a factory that fills a `git_reference` out-param.
    fn construct(f: impl FnOnce(*mut *mut raw::git_reference) -> c_int) -> Result<Self, Error> {
        let mut out: *mut raw::git_reference = ptr::null_mut();
        let out_ptr: *mut *mut raw::git_reference = &mut out;
        ffi::call(|| f(out_ptr))?;
        unsafe { Self::from_raw(out) }
    }

    /// # Safety
    ///
    /// `raw` must be a live reference owned by the caller, belonging to a
    /// repository that outlives `'repo`.
    unsafe fn from_raw(raw: *mut raw::git_reference) -> Result<Self, Error> {
        let handle = NativeHandle::from_raw(raw).ok_or(Error::Invalid {
            kind: RawReference::KIND,
        })?;
        Ok(Self {
            handle,
            _repo: PhantomData,
        })
    }

    /// Full name, e.g. `refs/heads/main`.
    pub fn name(&self) -> Result<String, Error> {
        let reference = self.handle.get()?;
        let name = unsafe { ffi::copy_cstr("reference name", raw::git_reference_name(reference))? };
        Ok(name.unwrap_or_default())
    }

    /// Direct or symbolic.
    pub fn kind(&self) -> Result<ReferenceKind, Error> {
        let reference = self.handle.get()?;
        ReferenceKind::from_raw(unsafe { raw::git_reference_type(reference) }).ok_or(
            Error::Invalid {
                kind: RawReference::KIND,
            },
        )
    }

    /// Target id of a direct reference; `None` for symbolic ones.
    pub fn target(&self) -> Result<Option<Oid>, Error> {
        let reference = self.handle.get()?;
        Ok(unsafe { Oid::from_raw(raw::git_reference_target(reference)) })
    }

    /// Target name of a symbolic reference; `None` for direct ones.
    pub fn symbolic_target(&self) -> Result<Option<String>, Error> {
        let reference = self.handle.get()?;
        unsafe { ffi::copy_cstr("symbolic target", raw::git_reference_symbolic_target(reference)) }
    }

    /// The human-readable short form of the name: `main` for
    /// `refs/heads/main`, `origin/main` for `refs/remotes/origin/main`.
    pub fn shorthand(&self) -> Result<String, Error> {
        let reference = self.handle.get()?;
        let short = unsafe { raw::git_reference_shorthand(reference) };
        Ok(unsafe { ffi::copy_cstr("shorthand", short)? }.unwrap_or_default())
    }

    /// Order two references by kind and then by target.
    ///
    /// `Equal` means both point at the same object or the same reference
    /// name, regardless of their own names.
    pub fn compare(&self, other: &Reference<'_>) -> Result<Ordering, Error> {
        let this = self.handle.get()?;
        let other = other.handle.get()?;
        Ok(unsafe { raw::git_reference_cmp(this, other) }.cmp(&0))
    }

    /// Whether the reference lives under `refs/heads/`.
    pub fn is_branch(&self) -> Result<bool, Error> {
        let reference = self.handle.get()?;
        Ok(unsafe { raw::git_reference_is_branch(reference) } == 1)
    }

    /// Whether the reference lives under `refs/tags/`.
    pub fn is_tag(&self) -> Result<bool, Error> {
        let reference = self.handle.get()?;
        Ok(unsafe { raw::git_reference_is_tag(reference) } == 1)
    }

    /// Whether the reference lives under `refs/remotes/`.
    pub fn is_remote(&self) -> Result<bool, Error> {
        let reference = self.handle.get()?;
        Ok(unsafe { raw::git_reference_is_remote(reference) } == 1)
    }

    /// Whether the reference lives under `refs/notes/`.
    pub fn is_note(&self) -> Result<bool, Error> {
        let reference = self.handle.get()?;
        Ok(unsafe { raw::git_reference_is_note(reference) } == 1)
    }

    /// Follow symbolic references until a direct one is reached.
    pub fn resolve(&self) -> Result<Reference<'repo>, Error> {
        let reference = self.handle.get()?;
        Self::construct(|out| unsafe { raw::git_reference_resolve(out, reference) })
    }

    /// Rename the reference, returning the renamed reference.
    ///
    /// This handle keeps describing the old name.
    pub fn rename(
        &self,
        new_name: &str,
        force: bool,
        log_message: &str,
    ) -> Result<Reference<'repo>, Error> {
        let reference = self.handle.get()?;
        let new_name = ffi::cstring("new_name", new_name)?;
        let log_message = ffi::cstring("log_message", log_message)?;
        Self::construct(|out| unsafe {
            raw::git_reference_rename(
                out,
                reference,
                new_name.as_ptr(),
                force as c_int,
                log_message.as_ptr(),
            )
        })
    }

    /// Delete the reference from the repository.
    ///
    /// The handle stays valid (and must still be freed); only the on-disk
    /// reference is removed.
    pub fn delete(&self) -> Result<(), Error> {
        let reference = self.handle.get()?;
        ffi::call(|| unsafe { raw::git_reference_delete(reference) })?;
        Ok(())
    }

    /// Whether the reference was freed.
    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    /// Free the reference now.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if already freed.
    pub fn free(&mut self) -> Result<(), Error> {
        self.handle.release()
    }
}

/// Whether `name` is a well-formed reference name.
///
/// Top-level names must be all caps with underscores (`HEAD`,
/// `FETCH_HEAD`); everything else must sit under `refs/`.
///
/// # Errors
///
/// [`Error::InteriorNul`] if `name` contains a NUL byte.
pub fn is_valid_name(name: &str) -> Result<bool, Error> {
    let name = ffi::cstring("name", name)?;
    let mut valid: c_int = 0;
    ffi::call(|| unsafe { raw::git_reference_name_is_valid(&mut valid, name.as_ptr()) })?;
    Ok(valid == 1)
}

impl fmt::Debug for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("name", &self.name().ok())
            .field("released", &self.handle.is_released())
            .finish()
    }
}

impl Repository {
    /// Look up a reference by full name.
    pub fn find_reference(&self, name: &str) -> Result<Reference<'_>, Error> {
        let repo = self.raw()?;
        let name = ffi::cstring("name", name)?;
        Reference::construct(|out| unsafe {
            raw::git_reference_lookup(out, repo, name.as_ptr())
        })
    }

    /// Look up a reference by the short name a user would type, trying the
    /// same rules as `git rev-parse` (`foo` finds `refs/heads/foo`,
    /// `refs/tags/foo`, ...).
    pub fn find_reference_dwim(&self, short_name: &str) -> Result<Reference<'_>, Error> {
        let repo = self.raw()?;
        let short_name = ffi::cstring("short_name", short_name)?;
        Reference::construct(|out| unsafe {
            raw::git_reference_dwim(out, repo, short_name.as_ptr())
        })
    }

    /// Whether the reference `name` has a reflog.
    pub fn reference_has_log(&self, name: &str) -> Result<bool, Error> {
        let repo = self.raw()?;
        let name = ffi::cstring("name", name)?;
        let rc = ffi::call(|| unsafe { raw::git_reference_has_log(repo, name.as_ptr()) })?;
        Ok(rc == 1)
    }

    /// Create a direct reference pointing at `oid`.
    ///
    /// With `force`, an existing reference of the same name is overwritten.
    pub fn reference(
        &self,
        name: &str,
        oid: &Oid,
        force: bool,
        log_message: &str,
    ) -> Result<Reference<'_>, Error> {
        let repo = self.raw()?;
        let name = ffi::cstring("name", name)?;
        let log_message = ffi::cstring("log_message", log_message)?;
        let id = oid.to_raw();
        Reference::construct(|out| unsafe {
            raw::git_reference_create(
                out,
                repo,
                name.as_ptr(),
                &id,
                force as c_int,
                log_message.as_ptr(),
            )
        })
    }

    /// Create a symbolic reference pointing at the reference named `target`.
    pub fn reference_symbolic(
        &self,
        name: &str,
        target: &str,
        force: bool,
        log_message: &str,
    ) -> Result<Reference<'_>, Error> {
        let repo = self.raw()?;
        let name = ffi::cstring("name", name)?;
        let target = ffi::cstring("target", target)?;
        let log_message = ffi::cstring("log_message", log_message)?;
        Reference::construct(|out| unsafe {
            raw::git_reference_symbolic_create(
                out,
                repo,
                name.as_ptr(),
                target.as_ptr(),
                force as c_int,
                log_message.as_ptr(),
            )
        })
    }

    /// Iterate over every reference in the repository.
    pub fn references(&self) -> Result<ReferenceIterator<'_>, Error> {
        let repo = self.raw()?;
        ReferenceIterator::construct(|out| unsafe { raw::git_reference_iterator_new(out, repo) })
    }

    /// Iterate over references whose names match a glob such as
    /// `refs/tags/*`.
    pub fn references_glob(&self, glob: &str) -> Result<ReferenceIterator<'_>, Error> {
        let repo = self.raw()?;
        let glob = ffi::cstring("glob", glob)?;
        let glob_ptr: *const c_char = glob.as_ptr();
        ReferenceIterator::construct(|out| unsafe {
            raw::git_reference_iterator_glob_new(out, repo, glob_ptr)
        })
    }
}
