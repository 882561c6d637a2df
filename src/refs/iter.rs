//! refs::iter
//!
//! Reference iteration.

use std::marker::PhantomData;
use std::ptr;

use libc::c_int;
use libgit2_sys as raw;

use super::Reference;
use crate::error::Error;
use crate::ffi;
use crate::handle::{NativeHandle, NativeResource};
use crate::repo::Repository;

struct RawReferenceIterator;

impl NativeResource for RawReferenceIterator {
    type Raw = raw::git_reference_iterator;
    const KIND: &'static str = "reference iterator";

    unsafe fn free(raw: *mut raw::git_reference_iterator) {
        raw::git_reference_iterator_free(raw)
    }
}

/// Walks the references of a [`Repository`].
pub struct ReferenceIterator<'repo> {
    handle: NativeHandle<RawReferenceIterator>,
    fused: bool,
    _repo: PhantomData<&'repo Repository>,
}

impl<'repo> ReferenceIterator<'repo> {
    pub(super) fn construct(
        f: impl FnOnce(*mut *mut raw::git_reference_iterator) -> c_int,
    ) -> Result<Self, Error> {
        let mut out: *mut raw::git_reference_iterator = ptr::null_mut();
        let out_ptr: *mut *mut raw::git_reference_iterator = &mut out;
        ffi::call(|| f(out_ptr))?;
        let handle = unsafe { NativeHandle::from_raw(out) }.ok_or(Error::Invalid {
            kind: RawReferenceIterator::KIND,
        })?;
        Ok(Self {
            handle,
            fused: false,
            _repo: PhantomData,
        })
    }

    /// The next reference, `Ok(None)` once the walk is exhausted.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the iterator was freed; native errors other
    /// than "iteration over" are returned as-is.
    pub fn next_reference(&mut self) -> Result<Option<Reference<'repo>>, Error> {
        let iter = self.handle.get()?;
        let mut out: *mut raw::git_reference = ptr::null_mut();
        match ffi::call(|| unsafe { raw::git_reference_next(&mut out, iter) }) {
            Ok(_) => unsafe { Reference::from_raw(out) }.map(Some),
            Err(e) if e.is_iter_over() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether the iterator was freed.
    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    /// Free the iterator now.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if already freed.
    pub fn free(&mut self) -> Result<(), Error> {
        self.handle.release()
    }
}

impl<'repo> Iterator for ReferenceIterator<'repo> {
    type Item = Result<Reference<'repo>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        match self.next_reference() {
            Ok(Some(reference)) => Some(Ok(reference)),
            Ok(None) => {
                self.fused = true;
                None
            }
            Err(e) => {
                self.fused = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo_with_tags(names: &[&str]) -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let oid = repo.blob(b"tagged\n").unwrap();
        for name in names {
            repo.reference(name, &oid, false, "").unwrap();
        }
        (dir, repo)
    }

    #[test]
    fn iterates_all_references_then_stops() {
        let (_dir, repo) = repo_with_tags(&["refs/tags/a", "refs/tags/b", "refs/tags/c"]);

        let mut names: Vec<String> = repo
            .references()
            .unwrap()
            .map(|r| r.unwrap().name().unwrap())
            .collect();
        names.sort();

        assert_eq!(names, vec!["refs/tags/a", "refs/tags/b", "refs/tags/c"]);
    }

    #[test]
    fn exhaustion_is_ok_none_not_error() {
        let (_dir, repo) = repo_with_tags(&["refs/tags/only"]);
        let mut iter = repo.references().unwrap();

        assert!(iter.next_reference().unwrap().is_some());
        assert!(iter.next_reference().unwrap().is_none());
    }

    #[test]
    fn glob_filters() {
        let (_dir, repo) = repo_with_tags(&["refs/tags/v1", "refs/tags/v2", "refs/notes/x"]);
        let count = repo.references_glob("refs/tags/*").unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn empty_repository_yields_nothing() {
        let (_dir, repo) = repo_with_tags(&[]);
        // HEAD is unborn and therefore not a reference yet.
        assert_eq!(repo.references().unwrap().count(), 0);
    }

    #[test]
    fn freed_iterator_yields_one_error_then_fuses() {
        let (_dir, repo) = repo_with_tags(&["refs/tags/a"]);
        let mut iter = repo.references().unwrap();
        iter.free().unwrap();

        assert!(matches!(
            iter.next_reference(),
            Err(Error::Invalid { .. })
        ));
        assert!(matches!(iter.next(), Some(Err(Error::Invalid { .. }))));
        assert!(iter.next().is_none());
        assert!(matches!(iter.free(), Err(Error::Invalid { .. })));
    }
}
