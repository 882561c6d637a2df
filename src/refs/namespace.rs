//! refs::namespace
//!
//! Splitting and building `refs/namespaces/` prefixes.
//!
//! A namespaced reference name nests one `refs/namespaces/<ns>/` segment per
//! namespace level, so `a/b` lives under
//! `refs/namespaces/a/refs/namespaces/b/`. Both helpers are pure string
//! operations and never touch libgit2.

const NAMESPACE_SEGMENT: &str = "refs/namespaces/";

/// Split `name` into its namespace (levels joined with `/`) and the rest.
///
/// A name outside any namespace yields an empty namespace and the name
/// unchanged. A segment with no closing `/` or an empty level is not a
/// namespace and stays in the rest.
///
/// # Example
///
/// ```
/// use gitbind::refs::split_namespace;
///
/// assert_eq!(
///     split_namespace("refs/namespaces/ns/refs/namespaces/nested/b"),
///     ("ns/nested".to_string(), "b")
/// );
/// assert_eq!(split_namespace("refs/heads/main"), (String::new(), "refs/heads/main"));
/// ```
pub fn split_namespace(name: &str) -> (String, &str) {
    let mut levels: Vec<&str> = Vec::new();
    let mut rest = name;

    while let Some(after) = rest.strip_prefix(NAMESPACE_SEGMENT) {
        match after.split_once('/') {
            Some((level, tail)) if !level.is_empty() => {
                levels.push(level);
                rest = tail;
            }
            _ => break,
        }
    }

    (levels.join("/"), rest)
}

/// The reference-name prefix for `namespace`.
///
/// Empty levels are skipped, so `""` yields `""` and `"a/"` is the same as
/// `"a"`.
pub fn namespace_prefix(namespace: &str) -> String {
    namespace
        .split('/')
        .filter(|level| !level.is_empty())
        .map(|level| format!("{}{}/", NAMESPACE_SEGMENT, level))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_plain_names() {
        assert_eq!(split_namespace("b"), (String::new(), "b"));
        assert_eq!(split_namespace("b/c/d"), (String::new(), "b/c/d"));
    }

    #[test]
    fn split_single_and_nested() {
        assert_eq!(split_namespace("refs/namespaces/ns/b"), ("ns".into(), "b"));
        assert_eq!(
            split_namespace("refs/namespaces/ns/b/c/d"),
            ("ns".into(), "b/c/d")
        );
        assert_eq!(
            split_namespace("refs/namespaces/ns/refs/head"),
            ("ns".into(), "refs/head")
        );
        assert_eq!(
            split_namespace("refs/namespaces/ns/refs/namespaces/nested/refs/namespaces/three/b"),
            ("ns/nested/three".into(), "b")
        );
    }

    #[test]
    fn split_corner_cases() {
        assert_eq!(split_namespace("refs/namespaces/ns/"), ("ns".into(), ""));
        assert_eq!(
            split_namespace("refs/namespaces/ns"),
            (String::new(), "refs/namespaces/ns")
        );
        assert_eq!(
            split_namespace("refs/namespaces//b"),
            (String::new(), "refs/namespaces//b")
        );
    }

    #[test]
    fn prefixes() {
        assert_eq!(namespace_prefix("ns"), "refs/namespaces/ns/");
        assert_eq!(
            namespace_prefix("1/2"),
            "refs/namespaces/1/refs/namespaces/2/"
        );
        assert_eq!(namespace_prefix(""), "");
        assert_eq!(namespace_prefix("1/"), "refs/namespaces/1/");
    }
}
