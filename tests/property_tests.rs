//! Property-based tests for marshaling, patches, namespaces and handle
//! release.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use gitbind::refs::{namespace_prefix, split_namespace};
use gitbind::{Credential, DiffFlags, DiffOptions, Error, Patch};

/// Strategy for single text lines without newlines.
fn text_line() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.-]{0,24}"
}

fn join_lines(lines: &[String]) -> Vec<u8> {
    lines
        .iter()
        .flat_map(|line| format!("{}\n", line).into_bytes())
        .collect()
}

/// Count context, added and deleted lines in rendered hunks.
fn count_hunk_lines(text: &str) -> (usize, usize, usize) {
    let mut counts = (0, 0, 0);
    let mut in_hunk = false;
    for line in text.lines() {
        if line.starts_with("@@") {
            in_hunk = true;
            continue;
        }
        if line.starts_with("diff --git") {
            in_hunk = false;
        }
        if !in_hunk {
            continue;
        }
        match line.as_bytes().first().copied() {
            Some(b' ') => counts.0 += 1,
            Some(b'+') => counts.1 += 1,
            Some(b'-') => counts.2 += 1,
            _ => {}
        }
    }
    counts
}

/// Namespace levels: non-empty and slash-free.
fn namespace() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9_]{1,8}", 0..4).prop_map(|levels| levels.join("/"))
}

proptest! {
    /// A NUL byte anywhere in an argument is rejected before libgit2 runs.
    #[test]
    fn interior_nul_always_rejected(
        prefix in "[a-z]{0,8}",
        suffix in "[a-z]{0,8}",
    ) {
        let username = format!("{}\0{}", prefix, suffix);
        let err = Credential::userpass_plaintext(&username, "pw").unwrap_err();

        prop_assert!(
            matches!(err, Error::InteriorNul { argument: "username" }),
            "unexpected error: {:?}",
            err
        );
        prop_assert_eq!(err.raw_code(), None);
    }

    /// Appending lines is counted as exactly that many additions.
    #[test]
    fn appended_lines_are_additions(
        base in prop::collection::vec(text_line(), 0..20),
        extra in prop::collection::vec(text_line(), 1..10),
    ) {
        let old = join_lines(&base);
        let mut all = base.clone();
        all.extend(extra.iter().cloned());
        let new = join_lines(&all);
        let mut minimal = DiffOptions::new();
        minimal.flags(DiffFlags::MINIMAL);

        let patch = Patch::from_buffers("f", &old, "f", &new, Some(&minimal))
            .unwrap()
            .expect("differing buffers produce a patch");
        let stats = patch.line_stats().unwrap();

        prop_assert_eq!(stats.additions, extra.len());
        prop_assert_eq!(stats.deletions, 0);
    }

    /// Reversing a patch swaps additions and deletions.
    #[test]
    fn reverse_swaps_counts(
        old_lines in prop::collection::vec(text_line(), 0..15),
        new_lines in prop::collection::vec(text_line(), 0..15),
    ) {
        let old = join_lines(&old_lines);
        let new = join_lines(&new_lines);
        let mut minimal = DiffOptions::new();
        minimal.flags(DiffFlags::MINIMAL);
        let mut reverse = DiffOptions::new();
        reverse.flags(DiffFlags::MINIMAL | DiffFlags::REVERSE);

        let forward = Patch::from_buffers("f", &old, "f", &new, Some(&minimal)).unwrap();
        let backward = Patch::from_buffers("f", &old, "f", &new, Some(&reverse)).unwrap();

        if let (Some(forward), Some(backward)) = (forward, backward) {
            let f = forward.line_stats().unwrap();
            let b = backward.line_stats().unwrap();
            prop_assert_eq!(f.additions, b.deletions);
            prop_assert_eq!(f.deletions, b.additions);
        }
    }

    /// Only the first release succeeds, however many follow.
    #[test]
    fn release_is_idempotent(extra_frees in 1usize..5) {
        let mut patch = Patch::from_buffers("f", b"a\n", "f", b"b\n", None)
            .unwrap()
            .expect("patch");

        prop_assert!(patch.free().is_ok());
        for _ in 0..extra_frees {
            prop_assert!(patch.free().unwrap_err().is_invalid_handle());
        }
        prop_assert!(patch.is_released());
    }

    /// Line stats agree with the lines printed under the hunk headers.
    #[test]
    fn line_stats_match_rendered_hunks(
        old_lines in prop::collection::vec(text_line(), 0..15),
        new_lines in prop::collection::vec(text_line(), 0..15),
        context_lines in 0u32..4,
    ) {
        let old = join_lines(&old_lines);
        let new = join_lines(&new_lines);
        let mut opts = DiffOptions::new();
        opts.context_lines(context_lines);

        if let Some(patch) = Patch::from_buffers("f", &old, "f", &new, Some(&opts)).unwrap() {
            let stats = patch.line_stats().unwrap();
            let (context, additions, deletions) = count_hunk_lines(&patch.to_text().unwrap());

            prop_assert_eq!(stats.context, context);
            prop_assert_eq!(stats.additions, additions);
            prop_assert_eq!(stats.deletions, deletions);

            let per_hunk: usize = (0..patch.num_hunks().unwrap())
                .map(|hunk| patch.num_lines_in_hunk(hunk).unwrap())
                .sum();
            prop_assert_eq!(per_hunk, context + additions + deletions);
        }
    }

    /// Any name rebuilds from its namespace prefix and remainder.
    #[test]
    fn namespace_split_rebuilds_name(
        name in "(refs/namespaces/[a-z/]{0,6}){0,3}[a-z/]{0,12}",
    ) {
        let (ns, rest) = split_namespace(&name);
        prop_assert_eq!(format!("{}{}", namespace_prefix(&ns), rest), name);
    }

    /// A prefixed name splits back into the same namespace and suffix.
    #[test]
    fn namespace_prefix_splits_back(ns in namespace(), suffix in "[a-z][a-z/]{0,12}") {
        let name = format!("{}{}", namespace_prefix(&ns), suffix);
        let (parsed, rest) = split_namespace(&name);
        prop_assert_eq!(parsed, ns);
        prop_assert_eq!(rest, suffix.as_str());
    }
}
