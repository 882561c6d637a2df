//! patch
//!
//! Unified diffs between two buffers or two blobs.
//!
//! libgit2 keeps pointers into the old and new content for the whole life of
//! a `git_patch`, so [`Patch`] borrows its inputs for `'a`. The inputs cannot
//! be dropped or mutated while the patch exists.
//!
//! # Example
//!
//! ```
//! use gitbind::patch::{DiffOptions, Patch};
//!
//! let old = b"foo\n";
//! let new = b"foo\nbar\n";
//! let patch = Patch::from_buffers("file", old, "file", new, None)?
//!     .expect("patch for differing buffers");
//!
//! let stats = patch.line_stats()?;
//! assert_eq!((stats.context, stats.additions, stats.deletions), (1, 1, 0));
//! # Ok::<(), gitbind::Error>(())
//! ```

mod options;

pub use options::{DiffFlags, DiffOptions};

use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use libc::{c_int, size_t};
use libgit2_sys as raw;

use crate::error::Error;
use crate::ffi::{self, NativeBuf};
use crate::handle::{NativeHandle, NativeResource};
use crate::repo::Blob;
use options::RawDiffOptions;

struct RawPatch;

impl NativeResource for RawPatch {
    type Raw = raw::git_patch;
    const KIND: &'static str = "patch";

    unsafe fn free(raw: *mut raw::git_patch) {
        raw::git_patch_free(raw)
    }
}

/// Line counts over every hunk of a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineStats {
    pub context: usize,
    pub additions: usize,
    pub deletions: usize,
}

/// A generated patch.
pub struct Patch<'a> {
    handle: NativeHandle<RawPatch>,
    _inputs: PhantomData<&'a [u8]>,
}

impl<'a> Patch<'a> {
    /// Diff two in-memory buffers.
    ///
    /// The paths only label the patch header. Empty buffers are valid and
    /// stand for a missing side (file added or deleted). `None` means
    /// libgit2 produced no patch object.
    ///
    /// # Errors
    ///
    /// [`Error::InteriorNul`] for a path containing NUL, or the native
    /// error from `git_patch_from_buffers`.
    pub fn from_buffers(
        old_path: &str,
        old: &'a [u8],
        new_path: &str,
        new: &'a [u8],
        opts: Option<&DiffOptions>,
    ) -> Result<Option<Patch<'a>>, Error> {
        let old_path = ffi::cstring("old_path", old_path)?;
        let new_path = ffi::cstring("new_path", new_path)?;
        let opts = opts.map(DiffOptions::to_raw).transpose()?;
        let (old_ptr, old_len) = ffi::raw_parts(old);
        let (new_ptr, new_len) = ffi::raw_parts(new);

        Self::construct(|out| unsafe {
            raw::git_patch_from_buffers(
                out,
                old_ptr,
                old_len,
                old_path.as_ptr(),
                new_ptr,
                new_len,
                new_path.as_ptr(),
                raw_opts(&opts),
            )
        })
    }

    /// Diff two repository blobs. A missing side diffs against empty.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if either blob was freed, [`Error::InteriorNul`]
    /// for a bad path, or the native error from `git_patch_from_blobs`.
    pub fn from_blobs(
        old: Option<&'a Blob<'_>>,
        old_path: Option<&str>,
        new: Option<&'a Blob<'_>>,
        new_path: Option<&str>,
        opts: Option<&DiffOptions>,
    ) -> Result<Option<Patch<'a>>, Error> {
        let old_blob = old.map(Blob::raw).transpose()?.unwrap_or(ptr::null_mut());
        let new_blob = new.map(Blob::raw).transpose()?.unwrap_or(ptr::null_mut());
        let old_path = ffi::opt_cstring("old_path", old_path)?;
        let new_path = ffi::opt_cstring("new_path", new_path)?;
        let opts = opts.map(DiffOptions::to_raw).transpose()?;

        Self::construct(|out| unsafe {
            raw::git_patch_from_blobs(
                out,
                old_blob,
                ffi::opt_ptr(&old_path),
                new_blob,
                ffi::opt_ptr(&new_path),
                raw_opts(&opts),
            )
        })
    }

    fn construct(
        f: impl FnOnce(*mut *mut raw::git_patch) -> c_int,
    ) -> Result<Option<Patch<'a>>, Error> {
        let mut out: *mut raw::git_patch = ptr::null_mut();
        let out_ptr: *mut *mut raw::git_patch = &mut out;
        ffi::call(|| f(out_ptr))?;
        Ok(unsafe { NativeHandle::from_raw(out) }.map(|handle| Patch {
            handle,
            _inputs: PhantomData,
        }))
    }

    /// Render the patch as unified diff text.
    ///
    /// # Errors
    ///
    /// [`Error::NotUtf8`] if either side holds text that is not UTF-8; use
    /// [`Patch::to_bytes`] for such content.
    pub fn to_text(&self) -> Result<String, Error> {
        self.render()?.to_string("patch text")
    }

    /// Render the patch as unified diff bytes, exactly as libgit2 wrote them.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(self.render()?.to_vec())
    }

    fn render(&self) -> Result<NativeBuf, Error> {
        let patch = self.handle.get()?;
        let mut buf = NativeBuf::new();
        let out = buf.as_mut_ptr();
        ffi::call(|| unsafe { raw::git_patch_to_buf(out, patch) })?;
        Ok(buf)
    }

    /// Context, added and deleted line counts.
    pub fn line_stats(&self) -> Result<LineStats, Error> {
        let patch = self.handle.get()?;
        let mut context: size_t = 0;
        let mut additions: size_t = 0;
        let mut deletions: size_t = 0;
        ffi::call(|| unsafe {
            raw::git_patch_line_stats(&mut context, &mut additions, &mut deletions, patch)
        })?;
        Ok(LineStats {
            context,
            additions,
            deletions,
        })
    }

    /// Number of hunks.
    pub fn num_hunks(&self) -> Result<usize, Error> {
        let patch = self.handle.get()?;
        Ok(unsafe { raw::git_patch_num_hunks(patch) })
    }

    /// Number of lines in hunk `index`, headers excluded.
    ///
    /// # Errors
    ///
    /// A not-found native error when `index` is out of range.
    pub fn num_lines_in_hunk(&self, index: usize) -> Result<usize, Error> {
        let patch = self.handle.get()?;
        let lines = ffi::call(|| unsafe { raw::git_patch_num_lines_in_hunk(patch, index) })?;
        Ok(lines as usize)
    }

    /// Byte size of the rendered patch, optionally counting context lines,
    /// hunk headers and file headers.
    pub fn size(
        &self,
        include_context: bool,
        include_hunk_headers: bool,
        include_file_headers: bool,
    ) -> Result<usize, Error> {
        let patch = self.handle.get()?;
        Ok(unsafe {
            raw::git_patch_size(
                patch,
                include_context as c_int,
                include_hunk_headers as c_int,
                include_file_headers as c_int,
            )
        })
    }

    /// Whether the patch was freed.
    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    /// Free the patch now.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if already freed.
    pub fn free(&mut self) -> Result<(), Error> {
        self.handle.release()
    }
}

fn raw_opts(opts: &Option<RawDiffOptions>) -> *const raw::git_diff_options {
    opts.as_ref().map_or(ptr::null(), RawDiffOptions::as_ptr)
}

impl fmt::Debug for Patch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patch")
            .field("released", &self.is_released())
            .field("hunks", &self.num_hunks().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::Repository;
    use tempfile::TempDir;

    fn patch<'a>(old: &'a [u8], new: &'a [u8], opts: Option<&DiffOptions>) -> Patch<'a> {
        Patch::from_buffers("file", old, "file", new, opts)
            .unwrap()
            .expect("patch")
    }

    #[test]
    fn appended_line_with_default_context() {
        let p = patch(b"foo\n", b"foo\nbar\n", None);
        assert_eq!(
            p.line_stats().unwrap(),
            LineStats {
                context: 1,
                additions: 1,
                deletions: 0
            }
        );
        assert_eq!(p.num_hunks().unwrap(), 1);
        assert_eq!(p.num_lines_in_hunk(0).unwrap(), 2);
    }

    #[test]
    fn zero_context_lines() {
        let mut opts = DiffOptions::new();
        opts.context_lines(0);
        let p = patch(b"foo\n", b"foo\nbar\n", Some(&opts));

        let stats = p.line_stats().unwrap();
        assert_eq!(stats.context, 0);
        assert_eq!(stats.additions, 1);
        assert_eq!(p.num_lines_in_hunk(0).unwrap(), 1);
    }

    #[test]
    fn text_has_headers_and_hunk() {
        let p = patch(b"foo\n", b"foo\nbar\n", None);
        let text = p.to_text().unwrap();

        assert!(text.starts_with("diff --git a/file b/file\n"));
        assert!(text.contains("--- a/file\n+++ b/file\n"));
        assert!(text.contains("@@ -1 +1,2 @@\n foo\n+bar\n"));
    }

    #[test]
    fn latin1_content_survives_as_bytes() {
        let p = patch(b"caf\xe9\n", b"caf\xe9\nbar\n", None);

        let bytes = p.to_bytes().unwrap();
        let hunk = b"@@ -1 +1,2 @@\n caf\xe9\n+bar\n";
        assert!(bytes.windows(hunk.len()).any(|w| w == hunk));

        let err = p.to_text().unwrap_err();
        assert!(matches!(err, Error::NotUtf8 { what: "patch text", .. }));
    }

    #[test]
    fn utf8_text_matches_bytes() {
        let p = patch(b"foo\n", b"foo\nbar\n", None);
        assert_eq!(p.to_text().unwrap().into_bytes(), p.to_bytes().unwrap());
    }

    #[test]
    fn custom_prefixes() {
        let mut opts = DiffOptions::new();
        opts.old_prefix("old/").new_prefix("new/");
        let p = patch(b"a\n", b"b\n", Some(&opts));
        let text = p.to_text().unwrap();

        assert!(text.contains("--- old/file\n+++ new/file\n"));
    }

    #[test]
    fn reverse_flag_swaps_sides() {
        let mut opts = DiffOptions::new();
        opts.flags(DiffFlags::REVERSE);
        let p = patch(b"foo\n", b"foo\nbar\n", Some(&opts));

        let stats = p.line_stats().unwrap();
        assert_eq!((stats.additions, stats.deletions), (0, 1));
    }

    #[test]
    fn empty_old_side_is_an_addition() {
        let p = patch(b"", b"one\ntwo\n", None);
        let stats = p.line_stats().unwrap();
        assert_eq!((stats.context, stats.additions, stats.deletions), (0, 2, 0));
    }

    #[test]
    fn both_sides_empty() {
        if let Some(p) = Patch::from_buffers("file", b"", "file", b"", None).unwrap() {
            assert_eq!(p.num_hunks().unwrap(), 0);
            assert_eq!(p.line_stats().unwrap(), LineStats::default());
        }
    }

    #[test]
    fn hunk_index_out_of_range() {
        let p = patch(b"foo\n", b"bar\n", None);
        let err = p.num_lines_in_hunk(7).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn size_counts_selected_parts() {
        let p = patch(b"foo\n", b"foo\nbar\n", None);
        let bare = p.size(false, false, false).unwrap();
        let with_context = p.size(true, false, false).unwrap();
        let full = p.size(true, true, true).unwrap();

        assert_eq!(bare, "+bar\n".len());
        assert_eq!(with_context, " foo\n+bar\n".len());
        assert!(full > with_context);
    }

    #[test]
    fn path_with_nul_rejected() {
        let err = Patch::from_buffers("a\0b", b"x", "b", b"y", None).unwrap_err();
        assert!(matches!(err, Error::InteriorNul { argument: "old_path" }));
    }

    #[test]
    fn operations_fail_after_free() {
        let mut p = patch(b"foo\n", b"bar\n", None);
        p.free().unwrap();

        assert!(p.is_released());
        assert!(matches!(p.to_text(), Err(Error::Invalid { kind: "patch" })));
        assert!(matches!(p.line_stats(), Err(Error::Invalid { .. })));
        assert!(matches!(p.num_hunks(), Err(Error::Invalid { .. })));
        assert!(matches!(p.free(), Err(Error::Invalid { .. })));
    }

    #[test]
    fn blobs_diff_like_buffers() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let old = repo.find_blob(&repo.blob(b"foo\n").unwrap()).unwrap();
        let new = repo.find_blob(&repo.blob(b"foo\nbar\n").unwrap()).unwrap();

        let p = Patch::from_blobs(Some(&old), Some("file"), Some(&new), Some("file"), None)
            .unwrap()
            .expect("patch");
        let stats = p.line_stats().unwrap();
        assert_eq!((stats.context, stats.additions, stats.deletions), (1, 1, 0));
    }

    #[test]
    fn blob_against_nothing_is_a_deletion() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let old = repo.find_blob(&repo.blob(b"gone\n").unwrap()).unwrap();

        let p = Patch::from_blobs(Some(&old), Some("file"), None, None, None)
            .unwrap()
            .expect("patch");
        assert_eq!(p.line_stats().unwrap().deletions, 1);
    }

    #[test]
    fn freed_blob_is_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut old = repo.find_blob(&repo.blob(b"x\n").unwrap()).unwrap();
        old.free().unwrap();

        let result = Patch::from_blobs(Some(&old), None, None, None, None);
        assert!(matches!(result, Err(Error::Invalid { kind: "blob" })));
    }
}
