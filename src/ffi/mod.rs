//! ffi
//!
//! Marshaling between Rust values and the libgit2 C ABI.
//!
//! # Responsibilities
//!
//! - Calling into libgit2 and translating negative status codes ([`call`])
//! - Converting strings and paths to C strings, rejecting interior NULs
//!   before anything reaches libgit2 ([`cstring`], [`path_cstring`])
//! - Passing byte buffers by address, with empty buffers as `(NULL, 0)`
//!   ([`raw_parts`])
//! - Copying native strings into owned memory, refusing non-UTF-8 text
//!   ([`copy_cstr`], [`copy_cpath`])
//! - Owning the `git_buf` staging buffers libgit2 fills ([`NativeBuf`])
//!
//! Buffers and strings are borrowed for the duration of each call, so Rust's
//! borrow rules keep them alive and unmoved until the call returns.

mod buf;
mod call;
mod marshal;

pub(crate) use buf::NativeBuf;
pub(crate) use call::call;
pub(crate) use marshal::{
    copy_cpath, copy_cstr, cstring, opt_cstring, opt_ptr, path_cstring, raw_parts,
};
