//! config
//!
//! Options profiles loaded from TOML and applied to libgit2 in one step.
//!
//! # Profile Locations
//!
//! When no path is given, searched in order:
//! 1. `$GITBIND_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitbind/options.toml`
//! 3. `~/.gitbind/options.toml`
//!
//! A missing profile is not an error; the empty profile changes nothing.
//!
//! # Example
//!
//! ```no_run
//! use gitbind::config::OptionsProfile;
//!
//! let loaded = OptionsProfile::load(None)?;
//! loaded.profile.apply()?;
//! # Ok::<(), gitbind::config::ConfigError>(())
//! ```

pub mod schema;

pub use schema::{OptionsProfile, SearchPaths};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::error::Error;
use crate::opts::{self, ConfigLevel};

/// Errors from loading or applying a profile.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read options profile '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse options profile '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid options value: {0}")]
    InvalidValue(String),

    #[error("failed to apply option: {0}")]
    Option(#[from] Error),
}

/// A profile and where it came from.
#[derive(Debug)]
pub struct ProfileLoadResult {
    pub profile: OptionsProfile,
    /// `None` when no profile file was found.
    pub path: Option<PathBuf>,
}

impl OptionsProfile {
    /// Load and validate a profile.
    ///
    /// An explicit `path` must exist. Without one, the standard locations
    /// are searched and the first existing file wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// validation.
    pub fn load(path: Option<&Path>) -> Result<ProfileLoadResult, ConfigError> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::locate(),
        };

        let profile = match &path {
            Some(path) => Self::read(path)?,
            None => OptionsProfile::default(),
        };
        profile.validate()?;

        debug!(path = ?path, "loaded options profile");
        Ok(ProfileLoadResult { profile, path })
    }

    /// First existing profile in the standard locations.
    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("GITBIND_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("gitbind/options.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".gitbind/options.toml"))
            .filter(|path| path.exists())
    }

    fn read(path: &Path) -> Result<OptionsProfile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&contents).map_err(|message| ConfigError::ParseError {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(contents: &str) -> Result<OptionsProfile, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Validate, then write every set option to libgit2.
    ///
    /// Options are written in a fixed order. A native failure stops the
    /// remaining writes; options already written keep their new values.
    pub fn apply(&self) -> Result<(), ConfigError> {
        self.validate()?;
        debug!(profile = ?self, "applying options profile");

        if let Some(bytes) = self.mwindow_mapped_limit {
            opts::set_mwindow_mapped_limit(bytes)?;
        }
        if let Some(bytes) = self.mwindow_size {
            opts::set_mwindow_size(bytes)?;
        }
        if let Some(files) = self.mwindow_file_limit {
            opts::set_mwindow_file_limit(files)?;
        }
        if let Some(enabled) = self.http_expect_continue {
            opts::set_http_expect_continue(enabled)?;
        }
        if let Some(enabled) = self.enable_caching {
            opts::enable_caching(enabled)?;
        }
        if let Some(bytes) = self.cache_max_size {
            let bytes = isize::try_from(bytes).map_err(|_| {
                ConfigError::InvalidValue(format!("cache_max_size out of range: {}", bytes))
            })?;
            opts::set_cache_max_size(bytes)?;
        }
        if let Some(objects) = self.pack_max_objects {
            opts::set_pack_max_objects(objects)?;
        }
        if let Some(enabled) = self.owner_validation {
            opts::set_owner_validation(enabled)?;
        }
        if let Some(paths) = &self.search_path {
            for (level, path) in paths.entries() {
                opts::set_search_path(level, path)?;
            }
        }

        Ok(())
    }

    /// Snapshot the current values of every readable option.
    ///
    /// Write-only options (`enable_caching`, `cache_max_size`) are left
    /// unset. A search path that is not UTF-8 fails the capture rather than
    /// being stored in altered form.
    pub fn capture() -> Result<OptionsProfile, ConfigError> {
        let mut search_path = SearchPaths::default();
        for level in ConfigLevel::ALL {
            search_path.set(level, opts::search_path(level)?);
        }

        Ok(OptionsProfile {
            mwindow_size: Some(opts::mwindow_size()?),
            mwindow_mapped_limit: Some(opts::mwindow_mapped_limit()?),
            mwindow_file_limit: Some(opts::mwindow_file_limit()?),
            http_expect_continue: Some(opts::http_expect_continue()?),
            enable_caching: None,
            cache_max_size: None,
            pack_max_objects: Some(opts::pack_max_objects()?),
            owner_validation: Some(opts::owner_validation()?),
            search_path: Some(search_path),
        })
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn profile_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_explicit_path() {
        let file = profile_file("mwindow_file_limit = 32\n");
        let loaded = OptionsProfile::load(Some(file.path())).unwrap();

        assert_eq!(loaded.path.as_deref(), Some(file.path()));
        assert_eq!(loaded.profile.mwindow_file_limit, Some(32));
    }

    #[test]
    fn missing_explicit_path_is_read_error() {
        let dir = TempDir::new().unwrap();
        let result = OptionsProfile::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn malformed_profile_is_parse_error() {
        let file = profile_file("mwindow_size = \"big\"\n");
        let result = OptionsProfile::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_profile_fails_load() {
        let file = profile_file("cache_max_size = -5\n");
        let result = OptionsProfile::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn apply_writes_options() {
        let _guard = opts::test_lock();
        let before = OptionsProfile::capture().unwrap();

        let profile = OptionsProfile {
            mwindow_file_limit: Some(48),
            pack_max_objects: Some(4242),
            http_expect_continue: Some(true),
            ..Default::default()
        };
        profile.apply().unwrap();

        assert_eq!(opts::mwindow_file_limit().unwrap(), 48);
        assert_eq!(opts::pack_max_objects().unwrap(), 4242);
        assert!(opts::http_expect_continue().unwrap());

        before.apply().unwrap();
        assert_eq!(
            opts::mwindow_file_limit().unwrap(),
            before.mwindow_file_limit.unwrap()
        );
    }

    #[test]
    fn invalid_profile_writes_nothing() {
        let _guard = opts::test_lock();
        let limit = opts::mwindow_file_limit().unwrap();

        let profile = OptionsProfile {
            mwindow_file_limit: Some(limit + 1),
            cache_max_size: Some(-1),
            ..Default::default()
        };
        assert!(profile.apply().is_err());
        assert_eq!(opts::mwindow_file_limit().unwrap(), limit);
    }

    #[test]
    fn captured_profile_serializes() {
        let _guard = opts::test_lock();
        let captured = OptionsProfile::capture().unwrap();
        let text = captured.to_toml().unwrap();

        let parsed: OptionsProfile = toml::from_str(&text).unwrap();
        assert_eq!(parsed, captured);
    }
}
