//! patch::options
//!
//! Diff options for patch generation.

use std::ffi::CString;
use std::mem;
use std::ops::{BitOr, BitOrAssign};

use libc::c_uint;
use libgit2_sys as raw;

use crate::error::Error;
use crate::ffi;

// libgit2-sys exports no constant for this struct version.
const DIFF_OPTIONS_VERSION: c_uint = 1;

/// Diff behavior flags (`git_diff_option_t`) relevant to buffer and blob
/// patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DiffFlags(u32);

impl DiffFlags {
    pub const NORMAL: DiffFlags = DiffFlags(raw::GIT_DIFF_NORMAL as u32);
    pub const REVERSE: DiffFlags = DiffFlags(raw::GIT_DIFF_REVERSE as u32);
    pub const INDENT_HEURISTIC: DiffFlags = DiffFlags(raw::GIT_DIFF_INDENT_HEURISTIC as u32);
    pub const IGNORE_BLANK_LINES: DiffFlags = DiffFlags(raw::GIT_DIFF_IGNORE_BLANK_LINES as u32);
    pub const FORCE_TEXT: DiffFlags = DiffFlags(raw::GIT_DIFF_FORCE_TEXT as u32);
    pub const FORCE_BINARY: DiffFlags = DiffFlags(raw::GIT_DIFF_FORCE_BINARY as u32);
    pub const IGNORE_WHITESPACE: DiffFlags = DiffFlags(raw::GIT_DIFF_IGNORE_WHITESPACE as u32);
    pub const IGNORE_WHITESPACE_CHANGE: DiffFlags =
        DiffFlags(raw::GIT_DIFF_IGNORE_WHITESPACE_CHANGE as u32);
    pub const IGNORE_WHITESPACE_EOL: DiffFlags =
        DiffFlags(raw::GIT_DIFF_IGNORE_WHITESPACE_EOL as u32);
    pub const PATIENCE: DiffFlags = DiffFlags(raw::GIT_DIFF_PATIENCE as u32);
    pub const MINIMAL: DiffFlags = DiffFlags(raw::GIT_DIFF_MINIMAL as u32);
    pub const SHOW_BINARY: DiffFlags = DiffFlags(raw::GIT_DIFF_SHOW_BINARY as u32);

    /// The raw bit set.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub fn contains(&self, other: DiffFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DiffFlags {
    type Output = DiffFlags;

    fn bitor(self, rhs: DiffFlags) -> DiffFlags {
        DiffFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for DiffFlags {
    fn bitor_assign(&mut self, rhs: DiffFlags) {
        self.0 |= rhs.0;
    }
}

/// Options controlling how a patch is generated.
///
/// Unset fields keep libgit2's defaults (3 context lines, `a/` and `b/`
/// prefixes).
///
/// # Example
///
/// ```
/// use gitbind::patch::{DiffFlags, DiffOptions};
///
/// let mut opts = DiffOptions::new();
/// opts.context_lines(0).flags(DiffFlags::IGNORE_WHITESPACE);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    flags: DiffFlags,
    context_lines: Option<u32>,
    interhunk_lines: Option<u32>,
    id_abbrev: Option<u16>,
    max_size: Option<i64>,
    old_prefix: Option<String>,
    new_prefix: Option<String>,
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the flag set.
    pub fn flags(&mut self, flags: DiffFlags) -> &mut Self {
        self.flags = flags;
        self
    }

    /// Number of unchanged lines shown around each change.
    pub fn context_lines(&mut self, lines: u32) -> &mut Self {
        self.context_lines = Some(lines);
        self
    }

    /// Maximum gap between changes before hunks are split.
    pub fn interhunk_lines(&mut self, lines: u32) -> &mut Self {
        self.interhunk_lines = Some(lines);
        self
    }

    /// Abbreviation length for object ids in the patch header.
    pub fn id_abbrev(&mut self, len: u16) -> &mut Self {
        self.id_abbrev = Some(len);
        self
    }

    /// Size above which content is treated as binary; negative disables.
    pub fn max_size(&mut self, bytes: i64) -> &mut Self {
        self.max_size = Some(bytes);
        self
    }

    /// Prefix for old-side paths in the rendered patch.
    pub fn old_prefix(&mut self, prefix: &str) -> &mut Self {
        self.old_prefix = Some(prefix.to_string());
        self
    }

    /// Prefix for new-side paths in the rendered patch.
    pub fn new_prefix(&mut self, prefix: &str) -> &mut Self {
        self.new_prefix = Some(prefix.to_string());
        self
    }

    /// Marshal into a native options struct.
    ///
    /// The returned value owns the prefix strings the struct points at and
    /// must outlive the native call it is passed to.
    pub(crate) fn to_raw(&self) -> Result<RawDiffOptions, Error> {
        let old_prefix = ffi::opt_cstring("old_prefix", self.old_prefix.as_deref())?;
        let new_prefix = ffi::opt_cstring("new_prefix", self.new_prefix.as_deref())?;

        let mut opts: raw::git_diff_options = unsafe { mem::zeroed() };
        ffi::call(|| unsafe { raw::git_diff_init_options(&mut opts, DIFF_OPTIONS_VERSION) })?;

        opts.flags = self.flags.bits();
        if let Some(lines) = self.context_lines {
            opts.context_lines = lines;
        }
        if let Some(lines) = self.interhunk_lines {
            opts.interhunk_lines = lines;
        }
        if let Some(len) = self.id_abbrev {
            opts.id_abbrev = len;
        }
        if let Some(bytes) = self.max_size {
            opts.max_size = bytes;
        }
        if old_prefix.is_some() {
            opts.old_prefix = ffi::opt_ptr(&old_prefix);
        }
        if new_prefix.is_some() {
            opts.new_prefix = ffi::opt_ptr(&new_prefix);
        }

        Ok(RawDiffOptions {
            raw: opts,
            _old_prefix: old_prefix,
            _new_prefix: new_prefix,
        })
    }
}

/// A `git_diff_options` together with the strings it borrows.
pub(crate) struct RawDiffOptions {
    raw: raw::git_diff_options,
    _old_prefix: Option<CString>,
    _new_prefix: Option<CString>,
}

impl RawDiffOptions {
    pub(crate) fn as_ptr(&self) -> *const raw::git_diff_options {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine() {
        let flags = DiffFlags::IGNORE_WHITESPACE | DiffFlags::PATIENCE;
        assert!(flags.contains(DiffFlags::PATIENCE));
        assert!(!flags.contains(DiffFlags::MINIMAL));
        assert_eq!(flags.bits(), (1 << 22) | (1 << 28));

        let mut more = DiffFlags::NORMAL;
        more |= DiffFlags::REVERSE;
        assert_eq!(more, DiffFlags::REVERSE);
    }

    #[test]
    fn defaults_come_from_libgit2() {
        let raw = DiffOptions::new().to_raw().unwrap();
        assert_eq!(raw.raw.context_lines, 3);
        assert_eq!(raw.raw.flags, 0);
    }

    #[test]
    fn overrides_are_applied() {
        let mut opts = DiffOptions::new();
        opts.context_lines(0)
            .interhunk_lines(2)
            .flags(DiffFlags::REVERSE);
        let raw = opts.to_raw().unwrap();

        assert_eq!(raw.raw.context_lines, 0);
        assert_eq!(raw.raw.interhunk_lines, 2);
        assert_eq!(raw.raw.flags, DiffFlags::REVERSE.bits());
    }

    #[test]
    fn prefix_with_nul_rejected() {
        let mut opts = DiffOptions::new();
        opts.old_prefix("a\0/");
        assert!(matches!(
            opts.to_raw(),
            Err(Error::InteriorNul {
                argument: "old_prefix"
            })
        ));
    }
}
