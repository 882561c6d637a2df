//! gitbind - owned handles and error marshaling over libgit2
//!
//! gitbind wraps libgit2 objects (credentials, patches, repositories,
//! references) and the process-wide library options behind safe Rust types.
//! Every native pointer has exactly one owner, every native failure becomes
//! a [`Error`], and nothing is freed twice.
//!
//! # Architecture
//!
//! - [`handle`] - Owned native pointers, explicit release, thread pinning
//! - [`error`] - Native status codes and messages as typed errors
//! - [`credential`] - Authentication credentials
//! - [`patch`] - Patches between buffers or blobs
//! - [`repo`] - Repositories and blobs
//! - [`refs`] - References and reference iteration
//! - [`opts`] - Global library options
//! - [`config`] - TOML options profiles
//! - [`blocking`] - Native work from async code
//!
//! # Handle Lifecycle
//!
//! 1. Only factories construct wrappers; a null native result yields none
//! 2. `free()` releases explicitly; a second `free()` is [`Error::Invalid`]
//! 3. `Drop` releases whatever was never freed
//! 4. Every operation on a released wrapper fails without calling libgit2
//!
//! # Example
//!
//! ```
//! use gitbind::Patch;
//!
//! let patch = Patch::from_buffers("file", b"foo\n", "file", b"foo\nbar\n", None)?
//!     .expect("differing buffers produce a patch");
//! assert!(patch.to_text()?.contains("+bar"));
//! # Ok::<(), gitbind::Error>(())
//! ```

pub mod blocking;
pub mod config;
pub mod credential;
pub mod error;
mod ffi;
pub mod handle;
pub mod oid;
pub mod opts;
pub mod patch;
pub mod refs;
pub mod repo;

pub use credential::{Credential, CredentialKind};
pub use error::{Error, ErrorClass, ErrorCode, NativeError};
pub use oid::Oid;
pub use patch::{DiffFlags, DiffOptions, LineStats, Patch};
pub use refs::{Reference, ReferenceIterator, ReferenceKind};
pub use repo::{Blob, Repository};

/// Initialize libgit2.
///
/// Safe to call any number of times from any thread. Every constructor in
/// this crate calls it, so explicit calls are only needed before using
/// libgit2 directly.
pub fn init() {
    libgit2_sys::init();
}
