//! repo::blob
//!
//! Blob handles.

use std::fmt;
use std::marker::PhantomData;
use std::slice;

use libgit2_sys as raw;

use super::Repository;
use crate::error::Error;
use crate::handle::{NativeHandle, NativeResource};
use crate::oid::Oid;

struct RawBlob;

impl NativeResource for RawBlob {
    type Raw = raw::git_blob;
    const KIND: &'static str = "blob";

    unsafe fn free(raw: *mut raw::git_blob) {
        raw::git_blob_free(raw)
    }
}

/// A blob looked up from a [`Repository`].
pub struct Blob<'repo> {
    handle: NativeHandle<RawBlob>,
    _repo: PhantomData<&'repo Repository>,
}

impl<'repo> Blob<'repo> {
    /// # Safety
    ///
    /// `raw` must be a live blob owned by the caller, belonging to a
    /// repository that outlives `'repo`.
    pub(crate) unsafe fn from_raw(raw: *mut raw::git_blob) -> Result<Self, Error> {
        let handle = NativeHandle::from_raw(raw).ok_or(Error::Invalid {
            kind: RawBlob::KIND,
        })?;
        Ok(Self {
            handle,
            _repo: PhantomData,
        })
    }

    pub(crate) fn raw(&self) -> Result<*mut raw::git_blob, Error> {
        self.handle.get()
    }

    /// The blob's object id.
    pub fn id(&self) -> Result<Oid, Error> {
        let blob = self.raw()?;
        unsafe { Oid::from_raw(raw::git_blob_id(blob)) }.ok_or(Error::Invalid {
            kind: RawBlob::KIND,
        })
    }

    /// Content size in bytes.
    pub fn size(&self) -> Result<usize, Error> {
        let blob = self.raw()?;
        Ok(unsafe { raw::git_blob_rawsize(blob) } as usize)
    }

    /// Whether libgit2's heuristics consider the content binary.
    pub fn is_binary(&self) -> Result<bool, Error> {
        let blob = self.raw()?;
        Ok(unsafe { raw::git_blob_is_binary(blob) } == 1)
    }

    /// A copy of the blob's content.
    pub fn content(&self) -> Result<Vec<u8>, Error> {
        let blob = self.raw()?;
        unsafe {
            let len = raw::git_blob_rawsize(blob) as usize;
            let data = raw::git_blob_rawcontent(blob) as *const u8;
            if data.is_null() || len == 0 {
                return Ok(Vec::new());
            }
            Ok(slice::from_raw_parts(data, len).to_vec())
        }
    }

    /// Whether the blob was freed.
    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    /// Free the blob now.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if already freed.
    pub fn free(&mut self) -> Result<(), Error> {
        self.handle.release()
    }
}

impl fmt::Debug for Blob<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob").field("id", &self.id().ok()).finish()
    }
}
