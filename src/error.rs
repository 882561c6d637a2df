//! error
//!
//! Translation of libgit2 status codes into structured errors.
//!
//! # Taxonomy
//!
//! - [`Error::Invalid`]: operation on a handle that was already released
//! - [`Error::Native`]: libgit2 returned a negative status code
//! - [`Error::InteriorNul`]: an argument could not be marshaled to a C string
//! - [`Error::NotUtf8`]: native output could not be returned as a string
//! - [`Error::Blocking`]: a call dispatched to the blocking pool did not finish
//!
//! Native errors carry the raw status code, the error class and the message
//! copied out of libgit2's thread-local last-error slot. The "iteration
//! exhausted" code is a native error like any other, but callers can test for
//! it with [`Error::is_iter_over`] and treat it as end-of-sequence.
//!
//! # Example
//!
//! ```
//! use gitbind::error::{ErrorClass, ErrorCode, NativeError};
//! use gitbind::Error;
//!
//! let err = Error::from(NativeError::new(-31, ErrorClass::None, "iteration over"));
//! assert!(err.is_iter_over());
//! assert_eq!(err.raw_code(), Some(-31));
//! assert_eq!(NativeError::new(-3, ErrorClass::Reference, "").code(), ErrorCode::NotFound);
//! ```

use std::ffi::CStr;
use std::fmt;

use libc::c_int;
use libgit2_sys as raw;
use thiserror::Error;

use crate::handle::ThreadPin;

/// Errors returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The handle was already released (or never held a pointer).
    #[error("invalid {kind}: handle has been released")]
    Invalid {
        /// Which kind of handle was used
        kind: &'static str,
    },

    /// libgit2 reported a failure.
    #[error(transparent)]
    Native(#[from] NativeError),

    /// A string argument contained a NUL byte and was never passed to libgit2.
    #[error("argument `{argument}` contains an interior NUL byte")]
    InteriorNul {
        /// Name of the offending argument
        argument: &'static str,
    },

    /// libgit2 produced bytes that are not UTF-8 where a string was asked for.
    #[error("{what} is not valid UTF-8 (valid up to byte {valid_up_to})")]
    NotUtf8 {
        /// What was being read
        what: &'static str,
        /// Length of the valid prefix
        valid_up_to: usize,
    },

    /// A native call dispatched to the blocking pool panicked or was cancelled.
    #[error("blocking task failed: {message}")]
    Blocking {
        /// Description of the join failure
        message: String,
    },
}

impl Error {
    /// True if this is the distinguished "no more items" code.
    pub fn is_iter_over(&self) -> bool {
        matches!(self, Error::Native(e) if e.code() == ErrorCode::IterOver)
    }

    /// True if libgit2 reported that the requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Native(e) if e.code() == ErrorCode::NotFound)
    }

    /// True if the operation was attempted on a released handle.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, Error::Invalid { .. })
    }

    /// The raw negative status code, for native errors.
    pub fn raw_code(&self) -> Option<i32> {
        match self {
            Error::Native(e) => Some(e.raw_code()),
            _ => None,
        }
    }

    /// The native error, if this is one.
    pub fn native(&self) -> Option<&NativeError> {
        match self {
            Error::Native(e) => Some(e),
            _ => None,
        }
    }
}

/// A failure reported by libgit2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    raw: c_int,
    class: ErrorClass,
    message: String,
}

impl NativeError {
    /// Build a native error from its parts.
    pub fn new(raw: i32, class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            raw,
            class,
            message: message.into(),
        }
    }

    /// Read libgit2's last-error slot for the status code `raw`.
    ///
    /// The slot is thread-local inside libgit2, so this must run on the
    /// thread that made the failing call, before any other libgit2 call.
    /// Debug builds check that the caller holds a [`ThreadPin`].
    ///
    /// [`ThreadPin`]: crate::handle::ThreadPin
    pub(crate) fn last(raw: c_int) -> Self {
        debug_assert!(
            ThreadPin::is_pinned(),
            "last-error slot read outside a pinned call"
        );
        unsafe {
            let err = raw::git_error_last();
            if err.is_null() || (*err).message.is_null() {
                return Self::new(raw, ErrorClass::None, "an unknown error occurred");
            }
            let message = CStr::from_ptr((*err).message)
                .to_string_lossy()
                .into_owned();
            Self::new(raw, ErrorClass::from_raw((*err).klass), message)
        }
    }

    /// The categorized status code.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::from_raw(self.raw)
    }

    /// The status code exactly as libgit2 returned it.
    pub fn raw_code(&self) -> i32 {
        self.raw
    }

    /// The subsystem that raised the error.
    pub fn class(&self) -> ErrorClass {
        self.class
    }

    /// The message copied out of libgit2.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (class: {:?}, code: {:?} [{}])",
            self.message,
            self.class,
            self.code(),
            self.raw
        )
    }
}

impl std::error::Error for NativeError {}

/// libgit2 status codes (`git_error_code`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    GenericError,
    NotFound,
    Exists,
    Ambiguous,
    BufSize,
    User,
    BareRepo,
    UnbornBranch,
    Unmerged,
    NotFastForward,
    InvalidSpec,
    Conflict,
    Locked,
    Modified,
    Auth,
    Certificate,
    Applied,
    Peel,
    Eof,
    Invalid,
    Uncommitted,
    Directory,
    MergeConflict,
    Passthrough,
    /// No more items in a sequence.
    IterOver,
    Retry,
    HashsumMismatch,
    IndexDirty,
    ApplyFail,
    Owner,
    Timeout,
    /// A code this crate does not know about.
    Other(i32),
}

impl ErrorCode {
    /// Map a raw status code.
    pub fn from_raw(code: c_int) -> Self {
        match code {
            raw::GIT_ERROR => ErrorCode::GenericError,
            raw::GIT_ENOTFOUND => ErrorCode::NotFound,
            raw::GIT_EEXISTS => ErrorCode::Exists,
            raw::GIT_EAMBIGUOUS => ErrorCode::Ambiguous,
            raw::GIT_EBUFS => ErrorCode::BufSize,
            raw::GIT_EUSER => ErrorCode::User,
            raw::GIT_EBAREREPO => ErrorCode::BareRepo,
            raw::GIT_EUNBORNBRANCH => ErrorCode::UnbornBranch,
            raw::GIT_EUNMERGED => ErrorCode::Unmerged,
            raw::GIT_ENONFASTFORWARD => ErrorCode::NotFastForward,
            raw::GIT_EINVALIDSPEC => ErrorCode::InvalidSpec,
            raw::GIT_ECONFLICT => ErrorCode::Conflict,
            raw::GIT_ELOCKED => ErrorCode::Locked,
            raw::GIT_EMODIFIED => ErrorCode::Modified,
            raw::GIT_EAUTH => ErrorCode::Auth,
            raw::GIT_ECERTIFICATE => ErrorCode::Certificate,
            raw::GIT_EAPPLIED => ErrorCode::Applied,
            raw::GIT_EPEEL => ErrorCode::Peel,
            raw::GIT_EEOF => ErrorCode::Eof,
            raw::GIT_EINVALID => ErrorCode::Invalid,
            raw::GIT_EUNCOMMITTED => ErrorCode::Uncommitted,
            raw::GIT_EDIRECTORY => ErrorCode::Directory,
            raw::GIT_EMERGECONFLICT => ErrorCode::MergeConflict,
            raw::GIT_PASSTHROUGH => ErrorCode::Passthrough,
            raw::GIT_ITEROVER => ErrorCode::IterOver,
            raw::GIT_RETRY => ErrorCode::Retry,
            raw::GIT_EMISMATCH => ErrorCode::HashsumMismatch,
            raw::GIT_EINDEXDIRTY => ErrorCode::IndexDirty,
            raw::GIT_EAPPLYFAIL => ErrorCode::ApplyFail,
            raw::GIT_EOWNER => ErrorCode::Owner,
            raw::GIT_TIMEOUT => ErrorCode::Timeout,
            other => ErrorCode::Other(other),
        }
    }
}

/// libgit2 error classes (`git_error_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    None,
    NoMemory,
    Os,
    Invalid,
    Reference,
    Zlib,
    Repository,
    Config,
    Regex,
    Odb,
    Index,
    Object,
    Net,
    Tag,
    Tree,
    Indexer,
    Ssl,
    Submodule,
    Thread,
    Stash,
    Checkout,
    FetchHead,
    Merge,
    Ssh,
    Filter,
    Revert,
    Callback,
    CherryPick,
    Describe,
    Rebase,
    Filesystem,
    Patch,
    Worktree,
    Sha,
    Http,
    Internal,
    Grafts,
    /// A class this crate does not know about.
    Other(i32),
}

impl ErrorClass {
    /// Map a raw `klass` value.
    pub fn from_raw(klass: c_int) -> Self {
        // Classes newer than the libgit2-sys table.
        const GIT_ERROR_INTERNAL: raw::git_error_t = 35;
        const GIT_ERROR_GRAFTS: raw::git_error_t = 36;

        let Ok(value) = raw::git_error_t::try_from(klass) else {
            return ErrorClass::Other(klass);
        };
        match value {
            raw::GIT_ERROR_NONE => ErrorClass::None,
            raw::GIT_ERROR_NOMEMORY => ErrorClass::NoMemory,
            raw::GIT_ERROR_OS => ErrorClass::Os,
            raw::GIT_ERROR_INVALID => ErrorClass::Invalid,
            raw::GIT_ERROR_REFERENCE => ErrorClass::Reference,
            raw::GIT_ERROR_ZLIB => ErrorClass::Zlib,
            raw::GIT_ERROR_REPOSITORY => ErrorClass::Repository,
            raw::GIT_ERROR_CONFIG => ErrorClass::Config,
            raw::GIT_ERROR_REGEX => ErrorClass::Regex,
            raw::GIT_ERROR_ODB => ErrorClass::Odb,
            raw::GIT_ERROR_INDEX => ErrorClass::Index,
            raw::GIT_ERROR_OBJECT => ErrorClass::Object,
            raw::GIT_ERROR_NET => ErrorClass::Net,
            raw::GIT_ERROR_TAG => ErrorClass::Tag,
            raw::GIT_ERROR_TREE => ErrorClass::Tree,
            raw::GIT_ERROR_INDEXER => ErrorClass::Indexer,
            raw::GIT_ERROR_SSL => ErrorClass::Ssl,
            raw::GIT_ERROR_SUBMODULE => ErrorClass::Submodule,
            raw::GIT_ERROR_THREAD => ErrorClass::Thread,
            raw::GIT_ERROR_STASH => ErrorClass::Stash,
            raw::GIT_ERROR_CHECKOUT => ErrorClass::Checkout,
            raw::GIT_ERROR_FETCHHEAD => ErrorClass::FetchHead,
            raw::GIT_ERROR_MERGE => ErrorClass::Merge,
            raw::GIT_ERROR_SSH => ErrorClass::Ssh,
            raw::GIT_ERROR_FILTER => ErrorClass::Filter,
            raw::GIT_ERROR_REVERT => ErrorClass::Revert,
            raw::GIT_ERROR_CALLBACK => ErrorClass::Callback,
            raw::GIT_ERROR_CHERRYPICK => ErrorClass::CherryPick,
            raw::GIT_ERROR_DESCRIBE => ErrorClass::Describe,
            raw::GIT_ERROR_REBASE => ErrorClass::Rebase,
            raw::GIT_ERROR_FILESYSTEM => ErrorClass::Filesystem,
            raw::GIT_ERROR_PATCH => ErrorClass::Patch,
            raw::GIT_ERROR_WORKTREE => ErrorClass::Worktree,
            raw::GIT_ERROR_SHA1 => ErrorClass::Sha,
            raw::GIT_ERROR_HTTP => ErrorClass::Http,
            GIT_ERROR_INTERNAL => ErrorClass::Internal,
            GIT_ERROR_GRAFTS => ErrorClass::Grafts,
            _ => ErrorClass::Other(klass),
        }
    }
}
