//! config::schema
//!
//! Options profile schema.
//!
//! # Validation
//!
//! Values are checked after parsing and before anything is written to
//! libgit2, so a rejected profile leaves the process options untouched.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::opts::ConfigLevel;

/// A set of libgit2 global options to apply together.
///
/// Absent keys leave the corresponding option at its current value.
///
/// # Example
///
/// ```toml
/// mwindow_size = 33554432
/// mwindow_mapped_limit = 268435456
/// mwindow_file_limit = 128
/// http_expect_continue = true
/// enable_caching = true
/// cache_max_size = 268435456
/// pack_max_objects = 1000000
/// owner_validation = true
///
/// [search_path]
/// global = "/etc/gitbind/home"
/// xdg = "$PATH:/opt/git/xdg"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsProfile {
    /// Pack memory window size in bytes
    pub mwindow_size: Option<usize>,

    /// Total mapped pack memory limit in bytes
    pub mwindow_mapped_limit: Option<usize>,

    /// Open pack file limit (0 for unlimited)
    pub mwindow_file_limit: Option<usize>,

    pub http_expect_continue: Option<bool>,

    pub enable_caching: Option<bool>,

    /// Object cache limit in bytes
    pub cache_max_size: Option<i64>,

    pub pack_max_objects: Option<usize>,

    pub owner_validation: Option<bool>,

    /// Config search paths per level
    pub search_path: Option<SearchPaths>,
}

impl OptionsProfile {
    /// Validate the profile.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(window), Some(limit)) = (self.mwindow_size, self.mwindow_mapped_limit) {
            if limit != 0 && window > limit {
                return Err(ConfigError::InvalidValue(format!(
                    "mwindow_size ({}) exceeds mwindow_mapped_limit ({})",
                    window, limit
                )));
            }
        }

        if let Some(size) = self.cache_max_size {
            if size < 0 {
                return Err(ConfigError::InvalidValue(format!(
                    "cache_max_size cannot be negative: {}",
                    size
                )));
            }
            if isize::try_from(size).is_err() {
                return Err(ConfigError::InvalidValue(format!(
                    "cache_max_size too large for this platform: {}",
                    size
                )));
            }
        }

        if let Some(paths) = &self.search_path {
            paths.validate()?;
        }

        Ok(())
    }
}

/// Search path overrides keyed by config level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SearchPaths {
    pub program_data: Option<String>,
    pub system: Option<String>,
    pub xdg: Option<String>,
    pub global: Option<String>,
}

impl SearchPaths {
    /// The configured entries, in level order.
    pub fn entries(&self) -> Vec<(ConfigLevel, &str)> {
        [
            (ConfigLevel::ProgramData, &self.program_data),
            (ConfigLevel::System, &self.system),
            (ConfigLevel::Xdg, &self.xdg),
            (ConfigLevel::Global, &self.global),
        ]
        .into_iter()
        .filter_map(|(level, path)| path.as_deref().map(|p| (level, p)))
        .collect()
    }

    /// Set the entry for `level`.
    pub fn set(&mut self, level: ConfigLevel, path: String) {
        let slot = match level {
            ConfigLevel::ProgramData => &mut self.program_data,
            ConfigLevel::System => &mut self.system,
            ConfigLevel::Xdg => &mut self.xdg,
            ConfigLevel::Global => &mut self.global,
        };
        *slot = Some(path);
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (level, path) in self.entries() {
            if path.contains('\0') {
                return Err(ConfigError::InvalidValue(format!(
                    "search_path.{} contains a NUL byte",
                    level
                )));
            }
        }
        Ok(())
    }
}
