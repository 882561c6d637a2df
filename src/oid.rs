//! oid
//!
//! Object identifiers.
//!
//! [`Oid`] is a plain value copied out of native memory, so it has no
//! lifetime ties to the handle it came from.
//!
//! # Example
//!
//! ```
//! use gitbind::Oid;
//!
//! let oid: Oid = "257cc5642cb1a054f08cc83f2d943e56fd3ebe99".parse().unwrap();
//! assert_eq!(oid.to_string(), "257cc5642cb1a054f08cc83f2d943e56fd3ebe99");
//! assert!("not-a-sha".parse::<Oid>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use libgit2_sys as raw;
use thiserror::Error;

/// Length of a raw SHA-1 object id in bytes.
pub const OID_RAW_LEN: usize = 20;

/// Errors from parsing an object id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OidError {
    #[error("object id must be {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("object id is not valid hex: {0}")]
    InvalidHex(String),
}

/// A 20-byte git object id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid([u8; OID_RAW_LEN]);

impl Oid {
    /// The all-zero id.
    pub const ZERO: Oid = Oid([0; OID_RAW_LEN]);

    /// Build an id from raw bytes.
    pub fn from_bytes(bytes: [u8; OID_RAW_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; OID_RAW_LEN] {
        &self.0
    }

    /// Whether this is the all-zero id.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; OID_RAW_LEN]
    }

    /// Abbreviated hex form.
    pub fn short(&self, len: usize) -> String {
        let mut hex = self.to_string();
        hex.truncate(len);
        hex
    }

    /// Copy an id out of native memory.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a valid `git_oid`.
    pub(crate) unsafe fn from_raw(ptr: *const raw::git_oid) -> Option<Self> {
        ptr.as_ref().map(|oid| Self(oid.id))
    }

    pub(crate) fn to_raw(self) -> raw::git_oid {
        raw::git_oid { id: self.0 }
    }
}

impl FromStr for Oid {
    type Err = OidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != OID_RAW_LEN * 2 {
            return Err(OidError::InvalidLength {
                expected: OID_RAW_LEN * 2,
                actual: s.len(),
            });
        }
        let mut bytes = [0u8; OID_RAW_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| OidError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}
