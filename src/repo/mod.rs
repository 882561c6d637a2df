//! repo
//!
//! Repository handles.
//!
//! A [`Repository`] owns one `git_repository`. Objects looked up through it
//! ([`Blob`], [`Reference`](crate::refs::Reference)) borrow the repository,
//! so the borrow checker rejects freeing or dropping the repository while
//! any of them are alive.
//!
//! # Example
//!
//! ```no_run
//! use gitbind::Repository;
//!
//! let repo = Repository::init("/tmp/example")?;
//! let oid = repo.blob(b"hello\n")?;
//! let blob = repo.find_blob(&oid)?;
//! assert_eq!(blob.content()?, b"hello\n");
//! # Ok::<(), gitbind::Error>(())
//! ```

mod blob;

pub use blob::Blob;

use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr;

use libc::c_int;
use libgit2_sys as raw;
use tracing::debug;

use crate::error::Error;
use crate::ffi;
use crate::handle::{NativeHandle, NativeResource};
use crate::oid::Oid;

struct RawRepository;

impl NativeResource for RawRepository {
    type Raw = raw::git_repository;
    const KIND: &'static str = "repository";

    unsafe fn free(raw: *mut raw::git_repository) {
        raw::git_repository_free(raw)
    }
}

/// An open git repository.
pub struct Repository {
    handle: NativeHandle<RawRepository>,
}

impl Repository {
    /// Create a new repository with a working directory at `path`.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::init_impl(path.as_ref(), false)
    }

    /// Create a new bare repository at `path`.
    pub fn init_bare(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::init_impl(path.as_ref(), true)
    }

    fn init_impl(path: &Path, bare: bool) -> Result<Self, Error> {
        let cpath = ffi::path_cstring("path", path)?;
        debug!(path = %path.display(), bare, "initializing repository");
        Self::construct(|out| unsafe {
            raw::git_repository_init(out, cpath.as_ptr(), bare as libc::c_uint)
        })
    }

    /// Open an existing repository at `path` (working directory or `.git`).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let cpath = ffi::path_cstring("path", path.as_ref())?;
        Self::construct(|out| unsafe { raw::git_repository_open(out, cpath.as_ptr()) })
    }

    fn construct(f: impl FnOnce(*mut *mut raw::git_repository) -> c_int) -> Result<Self, Error> {
        let mut out: *mut raw::git_repository = ptr::null_mut();
        let out_ptr: *mut *mut raw::git_repository = &mut out;
        ffi::call(|| f(out_ptr))?;
        let handle = unsafe { NativeHandle::from_raw(out) }.ok_or(Error::Invalid {
            kind: RawRepository::KIND,
        })?;
        Ok(Self { handle })
    }

    pub(crate) fn raw(&self) -> Result<*mut raw::git_repository, Error> {
        self.handle.get()
    }

    /// Path to the repository's git directory.
    pub fn path(&self) -> Result<PathBuf, Error> {
        let repo = self.raw()?;
        let path = unsafe { ffi::copy_cpath("repository path", raw::git_repository_path(repo))? };
        Ok(path.unwrap_or_default())
    }

    /// Whether the repository has no working directory.
    pub fn is_bare(&self) -> Result<bool, Error> {
        let repo = self.raw()?;
        Ok(unsafe { raw::git_repository_is_bare(repo) } == 1)
    }

    /// Write `data` to the object database as a blob.
    pub fn blob(&self, data: &[u8]) -> Result<Oid, Error> {
        let repo = self.raw()?;
        let (ptr, len) = ffi::raw_parts(data);
        let mut oid = Oid::ZERO.to_raw();
        ffi::call(|| unsafe { raw::git_blob_create_frombuffer(&mut oid, repo, ptr, len) })?;
        Ok(Oid::from_bytes(oid.id))
    }

    /// Look up a blob by id.
    pub fn find_blob(&self, oid: &Oid) -> Result<Blob<'_>, Error> {
        let repo = self.raw()?;
        let id = oid.to_raw();
        let mut out: *mut raw::git_blob = ptr::null_mut();
        ffi::call(|| unsafe { raw::git_blob_lookup(&mut out, repo, &id) })?;
        unsafe { Blob::from_raw(out) }
    }

    /// Whether the repository was freed.
    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    /// Close the repository now.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if already freed.
    pub fn free(&mut self) -> Result<(), Error> {
        self.handle.release()
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path().ok())
            .finish()
    }
}
