//! String-level helpers for tree paths.
//!
//! Paths handled here are plain `/`-separated strings, never `std::path::Path`:
//! the folder tree is virtual and must behave identically on every platform.

pub const SEPARATOR: char = '/';
pub const ROOT_PATH: &str = "/";
pub const PARENT_DIR: &str = "..";
pub const CURRENT_DIR: &str = ".";
pub const WILDCARD: &str = "*";
/// Marker the renderer prints for empty directories, so no node may carry it as a name.
pub const EMPTY_PLACEHOLDER: &str = "(empty)";

/// Collapses every run of separators into one and strips a trailing separator,
/// unless the whole path is the root.
pub fn normalize(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut previous_was_separator = false;

    for c in path.chars() {
        let is_separator = c == SEPARATOR;
        if !(is_separator && previous_was_separator) {
            normalized.push(c);
        }
        previous_was_separator = is_separator;
    }

    if normalized.len() > 1 && normalized.ends_with(SEPARATOR) {
        normalized.pop();
    }
    normalized
}

pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Non-empty segments of `path`.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|segment| !segment.is_empty())
}

/// Builds an absolute path out of segments. No segments means the root.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let mut path = String::from(ROOT_PATH);
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            path.push(SEPARATOR);
        }
        path.push_str(segment.as_ref());
    }
    path
}

/// Splits a normalized path into its parent part and final name.
///
/// `"/a/b"` gives `("/a", "b")`, `"/a"` gives `("", "a")` and a bare `"a"`
/// gives `("", "a")`; an empty parent part means the root.
pub fn split_parent(path: &str) -> (&str, &str) {
    match path.rsplit_once(SEPARATOR) {
        Some((parent, name)) => (parent, name),
        None => ("", path),
    }
}

/// Depth of a path counted in segments, used to order creations shallowest first.
pub fn depth_of(path: &str) -> usize {
    segments(path).count()
}
