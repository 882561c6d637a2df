//! opts
//!
//! Process-wide libgit2 tunables.
//!
//! Every setting here is global to the process: the last writer wins and
//! writes are not synchronized. Callers that change options from several
//! threads must serialize the writes themselves; [`crate::config`] applies a
//! whole profile in one step.
//!
//! # Example
//!
//! ```
//! use gitbind::opts;
//!
//! let previous = opts::mwindow_size()?;
//! opts::set_mwindow_size(32 * 1024 * 1024)?;
//! assert_eq!(opts::mwindow_size()?, 32 * 1024 * 1024);
//! opts::set_mwindow_size(previous)?;
//! # Ok::<(), gitbind::Error>(())
//! ```

mod primitive;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use libc::c_int;
use libgit2_sys as raw;
use tracing::debug;

use crate::error::Error;
use primitive::Opcode;

/// A configuration file level with its own search path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigLevel {
    ProgramData,
    System,
    Xdg,
    Global,
}

impl ConfigLevel {
    pub const ALL: [ConfigLevel; 4] = [
        ConfigLevel::ProgramData,
        ConfigLevel::System,
        ConfigLevel::Xdg,
        ConfigLevel::Global,
    ];

    fn raw(self) -> c_int {
        match self {
            ConfigLevel::ProgramData => raw::GIT_CONFIG_LEVEL_PROGRAMDATA,
            ConfigLevel::System => raw::GIT_CONFIG_LEVEL_SYSTEM,
            ConfigLevel::Xdg => raw::GIT_CONFIG_LEVEL_XDG,
            ConfigLevel::Global => raw::GIT_CONFIG_LEVEL_GLOBAL,
        }
    }
}

impl fmt::Display for ConfigLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigLevel::ProgramData => "program_data",
            ConfigLevel::System => "system",
            ConfigLevel::Xdg => "xdg",
            ConfigLevel::Global => "global",
        };
        f.write_str(name)
    }
}

// libgit2 has no getter for this option.
static HTTP_EXPECT_CONTINUE: AtomicBool = AtomicBool::new(false);

/// Size of the memory window used to map pack files, in bytes.
pub fn mwindow_size() -> Result<usize, Error> {
    primitive::get_size(Opcode::GetMwindowSize)
}

pub fn set_mwindow_size(bytes: usize) -> Result<(), Error> {
    primitive::set_size(Opcode::SetMwindowSize, bytes)
}

/// Upper bound on memory mapped for pack files, in bytes.
pub fn mwindow_mapped_limit() -> Result<usize, Error> {
    primitive::get_size(Opcode::GetMwindowMappedLimit)
}

pub fn set_mwindow_mapped_limit(bytes: usize) -> Result<(), Error> {
    primitive::set_size(Opcode::SetMwindowMappedLimit, bytes)
}

/// Maximum number of pack files kept open at once. Zero means unlimited.
pub fn mwindow_file_limit() -> Result<usize, Error> {
    primitive::get_size(Opcode::GetMwindowFileLimit)
}

pub fn set_mwindow_file_limit(files: usize) -> Result<(), Error> {
    primitive::set_size(Opcode::SetMwindowFileLimit, files)
}

/// Whether HTTP requests send `Expect: 100-continue`.
///
/// libgit2 cannot report this setting, so the value last written through
/// [`set_http_expect_continue`] is returned (`false` until then).
pub fn http_expect_continue() -> Result<bool, Error> {
    Ok(HTTP_EXPECT_CONTINUE.load(Ordering::SeqCst))
}

pub fn set_http_expect_continue(enabled: bool) -> Result<(), Error> {
    primitive::set_bool(Opcode::EnableHttpExpectContinue, enabled)?;
    HTTP_EXPECT_CONTINUE.store(enabled, Ordering::SeqCst);
    Ok(())
}

/// Directories searched for configuration files of `level`, separated by
/// the platform path-list separator.
pub fn search_path(level: ConfigLevel) -> Result<String, Error> {
    primitive::get_string(Opcode::GetSearchPath, level.raw())
}

/// Replace the search path for `level`. `$PATH` inside `path` expands to
/// the current value.
pub fn set_search_path(level: ConfigLevel, path: &str) -> Result<(), Error> {
    primitive::set_string(Opcode::SetSearchPath, level.raw(), Some(path))
}

/// Restore the built-in search path for `level`.
pub fn reset_search_path(level: ConfigLevel) -> Result<(), Error> {
    debug!(%level, "resetting search path");
    primitive::set_string(Opcode::SetSearchPath, level.raw(), None)
}

/// Upper bound on memory used by the object cache, in bytes.
pub fn set_cache_max_size(bytes: isize) -> Result<(), Error> {
    primitive::set_ssize(Opcode::SetCacheMaxSize, bytes)
}

/// Turn the object cache on or off.
pub fn enable_caching(enabled: bool) -> Result<(), Error> {
    primitive::set_bool(Opcode::EnableCaching, enabled)
}

/// Maximum number of objects accepted in a fetched pack.
pub fn pack_max_objects() -> Result<usize, Error> {
    primitive::get_size(Opcode::GetPackMaxObjects)
}

pub fn set_pack_max_objects(objects: usize) -> Result<(), Error> {
    primitive::set_size(Opcode::SetPackMaxObjects, objects)
}

/// Whether repository ownership is checked against the current user.
pub fn owner_validation() -> Result<bool, Error> {
    primitive::get_bool(Opcode::GetOwnerValidation)
}

pub fn set_owner_validation(enabled: bool) -> Result<(), Error> {
    primitive::set_bool(Opcode::SetOwnerValidation, enabled)
}

/// File share mode used when opening files on Windows.
pub fn windows_sharemode() -> Result<u64, Error> {
    primitive::get_ulong(Opcode::GetWindowsSharemode)
}

pub fn set_windows_sharemode(mode: u64) -> Result<(), Error> {
    primitive::set_ulong(Opcode::SetWindowsSharemode, mode)
}

#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::Mutex;

    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mwindow_size_roundtrip() {
        let _guard = test_lock();
        let previous = mwindow_size().unwrap();

        set_mwindow_size(1024 * 1024).unwrap();
        assert_eq!(mwindow_size().unwrap(), 1024 * 1024);

        set_mwindow_size(0).unwrap();
        assert_eq!(mwindow_size().unwrap(), 0);

        set_mwindow_size(previous).unwrap();
    }

    #[test]
    fn mapped_and_file_limits_roundtrip() {
        let _guard = test_lock();
        let mapped = mwindow_mapped_limit().unwrap();
        let files = mwindow_file_limit().unwrap();

        set_mwindow_mapped_limit(64 * 1024 * 1024).unwrap();
        set_mwindow_file_limit(16).unwrap();
        assert_eq!(mwindow_mapped_limit().unwrap(), 64 * 1024 * 1024);
        assert_eq!(mwindow_file_limit().unwrap(), 16);

        set_mwindow_mapped_limit(mapped).unwrap();
        set_mwindow_file_limit(files).unwrap();
    }

    #[test]
    fn expect_continue_tracks_last_write() {
        let _guard = test_lock();

        set_http_expect_continue(true).unwrap();
        assert!(http_expect_continue().unwrap());
        set_http_expect_continue(false).unwrap();
        assert!(!http_expect_continue().unwrap());
    }

    #[test]
    fn search_path_set_and_reset() {
        let _guard = test_lock();

        set_search_path(ConfigLevel::Global, "/tmp/gitbind-search").unwrap();
        assert_eq!(
            search_path(ConfigLevel::Global).unwrap(),
            "/tmp/gitbind-search"
        );

        reset_search_path(ConfigLevel::Global).unwrap();
        assert_ne!(
            search_path(ConfigLevel::Global).unwrap(),
            "/tmp/gitbind-search"
        );
    }

    #[test]
    fn pack_and_owner_settings_roundtrip() {
        let _guard = test_lock();
        let objects = pack_max_objects().unwrap();
        let owner = owner_validation().unwrap();

        set_pack_max_objects(1000).unwrap();
        set_owner_validation(!owner).unwrap();
        assert_eq!(pack_max_objects().unwrap(), 1000);
        assert_eq!(owner_validation().unwrap(), !owner);

        set_pack_max_objects(objects).unwrap();
        set_owner_validation(owner).unwrap();
    }

    #[test]
    fn cache_settings_accepted() {
        let _guard = test_lock();
        set_cache_max_size(256 * 1024 * 1024).unwrap();
        enable_caching(false).unwrap();
        enable_caching(true).unwrap();
    }

    #[test]
    fn level_names() {
        assert_eq!(ConfigLevel::ProgramData.to_string(), "program_data");
        assert_eq!(ConfigLevel::ALL.map(ConfigLevel::raw), [1, 2, 3, 4]);
    }

    #[cfg(windows)]
    #[test]
    fn windows_sharemode_roundtrip() {
        let _guard = test_lock();
        let previous = windows_sharemode().unwrap();
        set_windows_sharemode(7).unwrap();
        assert_eq!(windows_sharemode().unwrap(), 7);
        set_windows_sharemode(previous).unwrap();
    }
}
