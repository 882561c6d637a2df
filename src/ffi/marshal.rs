//! ffi::marshal
//!
//! Argument conversion for the C boundary.

use std::ffi::{CStr, CString};
use std::path::{Path, PathBuf};
use std::ptr;

use libc::{c_char, c_void, size_t};

use crate::error::Error;

/// Convert a string argument to a C string.
///
/// # Errors
///
/// [`Error::InteriorNul`] naming `argument` if `value` contains a NUL byte.
pub(crate) fn cstring(argument: &'static str, value: &str) -> Result<CString, Error> {
    CString::new(value).map_err(|_| Error::InteriorNul { argument })
}

/// Convert an optional string argument; `None` stays `None` (passed as NULL).
pub(crate) fn opt_cstring(
    argument: &'static str,
    value: Option<&str>,
) -> Result<Option<CString>, Error> {
    value.map(|v| cstring(argument, v)).transpose()
}

/// Pointer for an optional C string, NULL when absent.
pub(crate) fn opt_ptr(value: &Option<CString>) -> *const c_char {
    value.as_ref().map_or(ptr::null(), |s| s.as_ptr())
}

/// Convert a filesystem path to a C string.
#[cfg(unix)]
pub(crate) fn path_cstring(argument: &'static str, path: &Path) -> Result<CString, Error> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes()).map_err(|_| Error::InteriorNul { argument })
}

/// Convert a filesystem path to a C string.
#[cfg(not(unix))]
pub(crate) fn path_cstring(argument: &'static str, path: &Path) -> Result<CString, Error> {
    let value = path.to_str().ok_or(Error::NotUtf8 {
        what: argument,
        valid_up_to: 0,
    })?;
    cstring(argument, value)
}

/// Address and length of a byte buffer.
///
/// An empty buffer is passed as a NULL pointer with zero length rather than
/// the dangling address of an empty slice.
pub(crate) fn raw_parts(data: &[u8]) -> (*const c_void, size_t) {
    if data.is_empty() {
        (ptr::null(), 0)
    } else {
        (data.as_ptr().cast(), data.len())
    }
}

/// Copy a NUL-terminated native string into an owned `String`.
///
/// Returns `None` for a NULL pointer.
///
/// # Errors
///
/// [`Error::NotUtf8`] naming `what` if the string is not UTF-8.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of this call.
pub(crate) unsafe fn copy_cstr(
    what: &'static str,
    ptr: *const c_char,
) -> Result<Option<String>, Error> {
    if ptr.is_null() {
        return Ok(None);
    }
    let bytes = CStr::from_ptr(ptr).to_bytes();
    std::str::from_utf8(bytes)
        .map(|s| Some(s.to_owned()))
        .map_err(|err| Error::NotUtf8 {
            what,
            valid_up_to: err.valid_up_to(),
        })
}

/// Copy a NUL-terminated native path.
///
/// # Safety
///
/// Same contract as [`copy_cstr`].
#[cfg(unix)]
pub(crate) unsafe fn copy_cpath(
    _what: &'static str,
    ptr: *const c_char,
) -> Result<Option<PathBuf>, Error> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    if ptr.is_null() {
        return Ok(None);
    }
    let bytes = CStr::from_ptr(ptr).to_bytes();
    Ok(Some(PathBuf::from(OsStr::from_bytes(bytes))))
}

/// Copy a NUL-terminated native path.
///
/// # Safety
///
/// Same contract as [`copy_cstr`].
#[cfg(not(unix))]
pub(crate) unsafe fn copy_cpath(
    what: &'static str,
    ptr: *const c_char,
) -> Result<Option<PathBuf>, Error> {
    Ok(copy_cstr(what, ptr)?.map(PathBuf::from))
}
