//! ffi::call
//!
//! The single path by which status-returning libgit2 functions are invoked.

use libc::c_int;

use crate::error::{Error, NativeError};
use crate::handle::pinned;

/// Invoke a libgit2 function and translate its status code.
///
/// The call and the read of libgit2's thread-local last-error slot happen
/// under one [`ThreadPin`](crate::handle::ThreadPin), so the error
/// describes this call and not one made by another task on the same thread.
/// Non-negative codes are returned as-is (some functions return counts).
pub(crate) fn call(f: impl FnOnce() -> c_int) -> Result<c_int, Error> {
    crate::init();
    pinned(|| {
        let rc = f();
        if rc < 0 {
            Err(Error::Native(NativeError::last(rc)))
        } else {
            Ok(rc)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::handle::ThreadPin;

    #[test]
    fn non_negative_codes_pass_through() {
        assert_eq!(call(|| 0).unwrap(), 0);
        assert_eq!(call(|| 5).unwrap(), 5);
    }

    #[test]
    fn negative_code_becomes_native_error() {
        let err = call(|| -3).unwrap_err();
        assert_eq!(err.native().unwrap().code(), ErrorCode::NotFound);
        assert_eq!(err.raw_code(), Some(-3));
    }

    #[test]
    fn call_runs_pinned() {
        let mut seen = false;
        call(|| {
            seen = ThreadPin::is_pinned();
            0
        })
        .unwrap();
        assert!(seen);
        assert!(!ThreadPin::is_pinned());
    }
}
