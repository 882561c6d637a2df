//! credential
//!
//! Authentication credentials handed to libgit2 transports.
//!
//! # Ownership
//!
//! A credential is normally built inside an authentication callback and
//! returned to libgit2 with [`Credential::into_raw`], after which libgit2
//! owns and frees it. A credential that is never handed off is freed on drop
//! (or earlier with [`Credential::free`]).
//!
//! # Kind
//!
//! libgit2 no longer exposes the credential type on the public struct, so
//! the wrapper records which constructor built it; see [`Credential::kind`].
//!
//! # Example
//!
//! ```
//! use gitbind::credential::{Credential, CredentialKind};
//!
//! let cred = Credential::userpass_plaintext("git", "s3cret").unwrap();
//! assert_eq!(cred.kind(), CredentialKind::UserPassPlaintext);
//! assert!(cred.has_username().unwrap());
//! ```

use std::fmt;
use std::path::Path;
use std::ptr;

use libc::{c_char, c_int};
use libgit2_sys as raw;

use crate::error::Error;
use crate::ffi;
use crate::handle::{NativeHandle, NativeResource};

// Not exported by libgit2-sys.
extern "C" {
    fn git_credential_free(cred: *mut raw::git_cred);
    fn git_credential_get_username(cred: *mut raw::git_cred) -> *const c_char;
}

/// Free a credential that libgit2 never took over.
///
/// # Safety
///
/// `cred` must be a live credential pointer that nothing else frees.
pub unsafe fn free_raw(cred: *mut raw::git_cred) {
    git_credential_free(cred)
}

/// Which constructor produced a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Username and plaintext password.
    UserPassPlaintext,
    /// SSH key pair read from files.
    SshKey,
    /// SSH key pair held in memory.
    SshMemory,
    /// SSH key resolved through a running agent.
    SshAgent,
    /// Negotiated default credentials (NTLM/Kerberos).
    Default,
}

impl CredentialKind {
    /// The libgit2 credential type bit this kind is offered as.
    ///
    /// Agent keys travel as plain SSH keys.
    pub fn native_type(&self) -> u32 {
        match self {
            CredentialKind::UserPassPlaintext => raw::GIT_CREDTYPE_USERPASS_PLAINTEXT as u32,
            CredentialKind::SshKey | CredentialKind::SshAgent => raw::GIT_CREDTYPE_SSH_KEY as u32,
            CredentialKind::Default => raw::GIT_CREDTYPE_DEFAULT as u32,
            CredentialKind::SshMemory => raw::GIT_CREDTYPE_SSH_MEMORY as u32,
        }
    }

    /// Whether a transport asking for `allowed` (a bit set of native types)
    /// would accept this credential.
    pub fn is_allowed(&self, allowed: u32) -> bool {
        // In-memory keys are also acceptable wherever a plain SSH key is.
        let mut bits = self.native_type();
        if *self == CredentialKind::SshMemory {
            bits |= CredentialKind::SshKey.native_type();
        }
        allowed & bits != 0
    }
}

struct RawCredential;

impl NativeResource for RawCredential {
    type Raw = raw::git_cred;
    const KIND: &'static str = "credential";

    unsafe fn free(raw: *mut raw::git_cred) {
        git_credential_free(raw)
    }
}

/// An authentication credential.
pub struct Credential {
    handle: NativeHandle<RawCredential>,
    kind: CredentialKind,
}

impl Credential {
    /// Username and password.
    ///
    /// # Errors
    ///
    /// [`Error::InteriorNul`] if either argument contains a NUL byte.
    pub fn userpass_plaintext(username: &str, password: &str) -> Result<Self, Error> {
        let username = ffi::cstring("username", username)?;
        let password = ffi::cstring("password", password)?;
        Self::construct(CredentialKind::UserPassPlaintext, |out| unsafe {
            raw::git_cred_userpass_plaintext_new(out, username.as_ptr(), password.as_ptr())
        })
    }

    /// SSH key pair read from the filesystem.
    ///
    /// The public key path and passphrase are optional. Key files are read
    /// when the transport authenticates, not here.
    pub fn ssh_key(
        username: &str,
        public_key: Option<&Path>,
        private_key: &Path,
        passphrase: Option<&str>,
    ) -> Result<Self, Error> {
        let username = ffi::cstring("username", username)?;
        let public_key = public_key
            .map(|p| ffi::path_cstring("public_key", p))
            .transpose()?;
        let private_key = ffi::path_cstring("private_key", private_key)?;
        let passphrase = ffi::opt_cstring("passphrase", passphrase)?;
        Self::construct(CredentialKind::SshKey, |out| unsafe {
            raw::git_cred_ssh_key_new(
                out,
                username.as_ptr(),
                ffi::opt_ptr(&public_key),
                private_key.as_ptr(),
                ffi::opt_ptr(&passphrase),
            )
        })
    }

    /// SSH key pair supplied as in-memory key material.
    ///
    /// libgit2 parses the key material during the SSH handshake; a
    /// malformed key is accepted here and rejected at authentication time.
    ///
    /// # Errors
    ///
    /// A native error if libgit2 was built without in-memory SSH key
    /// support (enable the `ssh` feature).
    pub fn ssh_key_from_memory(
        username: &str,
        public_key: Option<&str>,
        private_key: &str,
        passphrase: Option<&str>,
    ) -> Result<Self, Error> {
        let username = ffi::cstring("username", username)?;
        let public_key = ffi::opt_cstring("public_key", public_key)?;
        let private_key = ffi::cstring("private_key", private_key)?;
        let passphrase = ffi::opt_cstring("passphrase", passphrase)?;
        Self::construct(CredentialKind::SshMemory, |out| unsafe {
            raw::git_cred_ssh_key_memory_new(
                out,
                username.as_ptr(),
                ffi::opt_ptr(&public_key),
                private_key.as_ptr(),
                ffi::opt_ptr(&passphrase),
            )
        })
    }

    /// SSH key resolved through the user's SSH agent.
    pub fn ssh_key_from_agent(username: &str) -> Result<Self, Error> {
        let username = ffi::cstring("username", username)?;
        Self::construct(CredentialKind::SshAgent, |out| unsafe {
            raw::git_cred_ssh_key_from_agent(out, username.as_ptr())
        })
    }

    /// Default negotiated credentials (NTLM/Kerberos).
    pub fn default_credential() -> Result<Self, Error> {
        Self::construct(CredentialKind::Default, |out| unsafe {
            raw::git_cred_default_new(out)
        })
    }

    fn construct(
        kind: CredentialKind,
        f: impl FnOnce(*mut *mut raw::git_cred) -> c_int,
    ) -> Result<Self, Error> {
        let mut out: *mut raw::git_cred = ptr::null_mut();
        let out_ptr: *mut *mut raw::git_cred = &mut out;
        ffi::call(|| f(out_ptr))?;
        let handle = unsafe { NativeHandle::from_raw(out) }.ok_or(Error::Invalid {
            kind: RawCredential::KIND,
        })?;
        Ok(Self { handle, kind })
    }

    /// Which constructor built this credential.
    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    /// Whether the credential carries a username.
    pub fn has_username(&self) -> Result<bool, Error> {
        let ptr = self.handle.get()?;
        Ok(unsafe { raw::git_cred_has_username(ptr) } == 1)
    }

    /// The username carried by the credential, if any.
    pub fn username(&self) -> Result<Option<String>, Error> {
        let ptr = self.handle.get()?;
        unsafe { ffi::copy_cstr("username", git_credential_get_username(ptr)) }
    }

    /// Whether the credential was freed or handed off.
    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    /// Free the credential without handing it to libgit2.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if already freed or handed off.
    pub fn free(&mut self) -> Result<(), Error> {
        self.handle.release()
    }

    /// Hand the credential to libgit2, typically as the out-value of a
    /// credential-acquire callback. libgit2 frees it from then on.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if already freed or handed off.
    pub fn into_raw(mut self) -> Result<*mut raw::git_cred, Error> {
        self.handle.take()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("released", &self.handle.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod credential_kind {
        use super::*;

        #[test]
        fn native_type_bits() {
            assert_eq!(CredentialKind::UserPassPlaintext.native_type(), 1);
            assert_eq!(CredentialKind::SshKey.native_type(), 2);
            assert_eq!(CredentialKind::SshAgent.native_type(), 2);
            assert_eq!(CredentialKind::Default.native_type(), 8);
            assert_eq!(CredentialKind::SshMemory.native_type(), 64);
            assert_eq!(
                CredentialKind::SshKey.native_type(),
                raw::GIT_CREDTYPE_SSH_KEY as u32
            );
        }

        #[test]
        fn allowed_masks() {
            assert!(CredentialKind::UserPassPlaintext.is_allowed(1 | 2));
            assert!(!CredentialKind::UserPassPlaintext.is_allowed(2));
            assert!(CredentialKind::SshMemory.is_allowed(2));
            assert!(CredentialKind::SshAgent.is_allowed(2));
            assert!(!CredentialKind::Default.is_allowed(1 | 2));
        }
    }

    mod construction {
        use super::*;

        #[test]
        fn userpass_has_username() {
            let cred = Credential::userpass_plaintext("alice", "pw").unwrap();
            assert_eq!(cred.kind(), CredentialKind::UserPassPlaintext);
            assert!(cred.has_username().unwrap());
            assert_eq!(cred.username().unwrap().as_deref(), Some("alice"));
        }

        #[test]
        fn default_has_no_username() {
            let cred = Credential::default_credential().unwrap();
            assert_eq!(cred.kind(), CredentialKind::Default);
            assert!(!cred.has_username().unwrap());
            assert_eq!(cred.username().unwrap(), None);
        }

        #[test]
        fn agent_records_kind() {
            let cred = Credential::ssh_key_from_agent("git").unwrap();
            assert_eq!(cred.kind(), CredentialKind::SshAgent);
            assert!(cred.has_username().unwrap());
        }

        #[test]
        fn nul_in_username_rejected_before_native_call() {
            let err = Credential::userpass_plaintext("al\0ice", "pw").unwrap_err();
            assert!(matches!(
                err,
                Error::InteriorNul {
                    argument: "username"
                }
            ));
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn free_twice_is_invalid() {
            let mut cred = Credential::userpass_plaintext("u", "p").unwrap();
            assert!(cred.free().is_ok());
            assert!(cred.is_released());
            assert!(matches!(cred.free(), Err(Error::Invalid { .. })));
        }

        #[test]
        fn accessors_fail_after_free() {
            let mut cred = Credential::userpass_plaintext("u", "p").unwrap();
            cred.free().unwrap();
            assert!(matches!(cred.has_username(), Err(Error::Invalid { .. })));
            assert!(matches!(cred.username(), Err(Error::Invalid { .. })));
            // Kind is wrapper state and survives release.
            assert_eq!(cred.kind(), CredentialKind::UserPassPlaintext);
        }

        #[test]
        fn into_raw_after_free_is_invalid() {
            let mut cred = Credential::default_credential().unwrap();
            cred.free().unwrap();
            assert!(cred.into_raw().is_err());
        }

        #[test]
        fn into_raw_transfers_ownership() {
            let cred = Credential::userpass_plaintext("u", "p").unwrap();
            let ptr = cred.into_raw().unwrap();
            assert!(!ptr.is_null());
            // Stand in for libgit2 consuming it.
            unsafe { free_raw(ptr) };
        }
    }
}
