//! Separator handling for paths declared inside documents.
//!
//! Documents may come from any platform, so declared paths can use `\`
//! or `/`. Everything here splits on both.

use std::path::{Component, Path, PathBuf};

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Convert a declared path into a native path.
///
/// Empty and `.` segments are dropped, so `a\b\c.txt`, `a/b/c.txt` and
/// `./a//b/c.txt` all produce the same key.
pub fn normalize_separators(raw: &str) -> PathBuf {
    raw.trim()
        .split(is_separator)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

/// First segment of a declared path.
pub fn first_component(raw: &str) -> Option<&str> {
    raw.trim()
        .split(is_separator)
        .find(|segment| !segment.is_empty() && *segment != ".")
}

/// Last segment of a declared path, accepting either separator.
pub fn basename(raw: &str) -> Option<&str> {
    raw.trim()
        .trim_end_matches(is_separator)
        .rsplit(is_separator)
        .next()
        .filter(|segment| !segment.is_empty())
}

/// Render a relative path with `/` separators for a document.
pub fn document_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Check that a path stays inside whatever directory it is joined onto.
pub fn is_safe_relative(path: &Path) -> bool {
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mixed_separators() {
        let windows = normalize_separators(r"a\b\c.txt");
        let unix = normalize_separators("a/b/c.txt");
        assert_eq!(windows, unix);
        assert_eq!(normalize_separators("./a//b/c.txt"), unix);
        assert_eq!(windows.components().count(), 3);
    }

    #[test]
    fn test_first_component_and_basename() {
        assert_eq!(first_component(r"proj\sub\b.txt"), Some("proj"));
        assert_eq!(first_component("/proj/a.txt"), Some("proj"));
        assert_eq!(first_component(""), None);

        assert_eq!(basename(r"C:\Users\me\proj"), Some("proj"));
        assert_eq!(basename("/home/me/proj/"), Some("proj"));
        assert_eq!(basename("/"), None);
    }

    #[test]
    fn test_document_path_uses_forward_slashes() {
        let path: PathBuf = ["proj", "sub", "b.txt"].iter().collect();
        assert_eq!(document_path(&path), "proj/sub/b.txt");
    }

    #[test]
    fn test_is_safe_relative() {
        assert!(is_safe_relative(Path::new("a/b.txt")));
        assert!(!is_safe_relative(Path::new("../b.txt")));
        assert!(!is_safe_relative(Path::new("a/../../b.txt")));
        assert!(!is_safe_relative(Path::new("/etc/passwd")));
        assert!(!is_safe_relative(Path::new("")));
    }
}
