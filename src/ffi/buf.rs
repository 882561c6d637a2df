//! ffi::buf
//!
//! Owned `git_buf` staging buffer.

use std::mem;
use std::slice;

use libgit2_sys as raw;

use crate::error::Error;

/// A `git_buf` that libgit2 fills and that is disposed on drop.
pub(crate) struct NativeBuf {
    raw: raw::git_buf,
}

impl NativeBuf {
    pub(crate) fn new() -> Self {
        // An all-zero git_buf is the documented empty initializer.
        Self {
            raw: unsafe { mem::zeroed() },
        }
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut raw::git_buf {
        &mut self.raw
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        if self.raw.ptr.is_null() {
            &[]
        } else {
            unsafe { slice::from_raw_parts(self.raw.ptr as *const u8, self.raw.size) }
        }
    }

    pub(crate) fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Copy the contents into an owned string.
    ///
    /// # Errors
    ///
    /// [`Error::NotUtf8`] naming `what` if the bytes are not UTF-8.
    pub(crate) fn to_string(&self, what: &'static str) -> Result<String, Error> {
        std::str::from_utf8(self.as_bytes())
            .map(str::to_owned)
            .map_err(|err| Error::NotUtf8 {
                what,
                valid_up_to: err.valid_up_to(),
            })
    }
}

impl Drop for NativeBuf {
    fn drop(&mut self) {
        unsafe { raw::git_buf_dispose(&mut self.raw) }
    }
}
