//! opts::primitive
//!
//! `git_libgit2_opts` calls, one pair per value category.
//!
//! `git_libgit2_opts` is variadic, so the argument type must match what the
//! opcode expects exactly. Each opcode is only ever routed through the
//! primitive of its own category by the typed accessors in the parent
//! module.

use libc::{c_char, c_int, c_ulong, size_t, ssize_t};
use libgit2_sys as raw;
use tracing::trace;

use crate::error::Error;
use crate::ffi::{self, NativeBuf};

/// `git_libgit2_opt_t` values used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub(crate) enum Opcode {
    GetMwindowSize = raw::GIT_OPT_GET_MWINDOW_SIZE as i32,
    SetMwindowSize = raw::GIT_OPT_SET_MWINDOW_SIZE as i32,
    GetMwindowMappedLimit = raw::GIT_OPT_GET_MWINDOW_MAPPED_LIMIT as i32,
    SetMwindowMappedLimit = raw::GIT_OPT_SET_MWINDOW_MAPPED_LIMIT as i32,
    GetSearchPath = raw::GIT_OPT_GET_SEARCH_PATH as i32,
    SetSearchPath = raw::GIT_OPT_SET_SEARCH_PATH as i32,
    SetCacheMaxSize = raw::GIT_OPT_SET_CACHE_MAX_SIZE as i32,
    EnableCaching = raw::GIT_OPT_ENABLE_CACHING as i32,
    GetWindowsSharemode = raw::GIT_OPT_GET_WINDOWS_SHAREMODE as i32,
    SetWindowsSharemode = raw::GIT_OPT_SET_WINDOWS_SHAREMODE as i32,
    GetPackMaxObjects = raw::GIT_OPT_GET_PACK_MAX_OBJECTS as i32,
    SetPackMaxObjects = raw::GIT_OPT_SET_PACK_MAX_OBJECTS as i32,
    EnableHttpExpectContinue = raw::GIT_OPT_ENABLE_HTTP_EXPECT_CONTINUE as i32,
    GetMwindowFileLimit = raw::GIT_OPT_GET_MWINDOW_FILE_LIMIT as i32,
    SetMwindowFileLimit = raw::GIT_OPT_SET_MWINDOW_FILE_LIMIT as i32,
    GetOwnerValidation = raw::GIT_OPT_GET_OWNER_VALIDATION as i32,
    SetOwnerValidation = raw::GIT_OPT_SET_OWNER_VALIDATION as i32,
}

impl Opcode {
    fn raw(self) -> c_int {
        self as c_int
    }
}

pub(crate) fn get_size(op: Opcode) -> Result<usize, Error> {
    let mut out: size_t = 0;
    let out_ptr: *mut size_t = &mut out;
    ffi::call(|| unsafe { raw::git_libgit2_opts(op.raw(), out_ptr) })?;
    Ok(out)
}

pub(crate) fn set_size(op: Opcode, value: usize) -> Result<(), Error> {
    trace!(opcode = ?op, value, "setting global option");
    ffi::call(|| unsafe { raw::git_libgit2_opts(op.raw(), value as size_t) })?;
    Ok(())
}

pub(crate) fn set_ssize(op: Opcode, value: isize) -> Result<(), Error> {
    trace!(opcode = ?op, value, "setting global option");
    ffi::call(|| unsafe { raw::git_libgit2_opts(op.raw(), value as ssize_t) })?;
    Ok(())
}

pub(crate) fn get_int(op: Opcode) -> Result<i32, Error> {
    let mut out: c_int = 0;
    let out_ptr: *mut c_int = &mut out;
    ffi::call(|| unsafe { raw::git_libgit2_opts(op.raw(), out_ptr) })?;
    Ok(out)
}

pub(crate) fn set_int(op: Opcode, value: i32) -> Result<(), Error> {
    trace!(opcode = ?op, value, "setting global option");
    ffi::call(|| unsafe { raw::git_libgit2_opts(op.raw(), value as c_int) })?;
    Ok(())
}

pub(crate) fn get_ulong(op: Opcode) -> Result<u64, Error> {
    let mut out: c_ulong = 0;
    let out_ptr: *mut c_ulong = &mut out;
    ffi::call(|| unsafe { raw::git_libgit2_opts(op.raw(), out_ptr) })?;
    Ok(out as u64)
}

pub(crate) fn set_ulong(op: Opcode, value: u64) -> Result<(), Error> {
    trace!(opcode = ?op, value, "setting global option");
    ffi::call(|| unsafe { raw::git_libgit2_opts(op.raw(), value as c_ulong) })?;
    Ok(())
}

pub(crate) fn get_bool(op: Opcode) -> Result<bool, Error> {
    get_int(op).map(|v| v != 0)
}

pub(crate) fn set_bool(op: Opcode, value: bool) -> Result<(), Error> {
    set_int(op, value as i32)
}

/// Read a string option keyed by an int (the config level).
pub(crate) fn get_string(op: Opcode, key: c_int) -> Result<String, Error> {
    let mut buf = NativeBuf::new();
    let out = buf.as_mut_ptr();
    ffi::call(|| unsafe { raw::git_libgit2_opts(op.raw(), key, out) })?;
    buf.to_string("option value")
}

/// Write a string option keyed by an int; `None` passes NULL.
pub(crate) fn set_string(op: Opcode, key: c_int, value: Option<&str>) -> Result<(), Error> {
    let value = ffi::opt_cstring("value", value)?;
    trace!(opcode = ?op, key, value = ?value, "setting global option");
    let ptr: *const c_char = ffi::opt_ptr(&value);
    ffi::call(|| unsafe { raw::git_libgit2_opts(op.raw(), key, ptr) })?;
    Ok(())
}
