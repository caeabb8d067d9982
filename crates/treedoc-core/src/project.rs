//! Projects recovered from a document.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::node::is_placeholder;
use crate::path::normalize_separators;

/// Root name plus every recovered file, keyed by native relative path.
///
/// Paths keep the order in which they were first declared. Declaring the
/// same path again replaces the content in place (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProject {
    /// Name of the original root directory.
    pub root_name: String,
    /// Relative path to content.
    pub files: IndexMap<PathBuf, String>,
}

impl ParsedProject {
    /// Create an empty project.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            files: IndexMap::new(),
        }
    }

    /// Insert a file under its declared path, returning any content it replaced.
    pub fn insert(&mut self, declared_path: &str, content: impl Into<String>) -> Option<String> {
        self.files
            .insert(normalize_separators(declared_path), content.into())
    }

    /// Look up content by declared path, with either separator.
    pub fn get(&self, declared_path: &str) -> Option<&str> {
        self.files
            .get(&normalize_separators(declared_path))
            .map(String::as_str)
    }

    /// Number of recovered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if no files were recovered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over paths and contents in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }

    /// Number of files whose content is a binary or read-error placeholder.
    pub fn placeholder_count(&self) -> usize {
        self.files.values().filter(|c| is_placeholder(c)).count()
    }

    /// Summary for display.
    pub fn stats(&self, sample_size: usize) -> ProjectStats {
        ProjectStats {
            root_name: self.root_name.clone(),
            files_parsed: self.len(),
            placeholders: self.placeholder_count(),
            total_bytes: self.files.values().map(|c| c.len() as u64).sum(),
            sample_paths: self.files.keys().take(sample_size).cloned().collect(),
        }
    }
}

/// Summary of a recovered project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStats {
    /// Recovered root name.
    pub root_name: String,
    /// Number of files recovered.
    pub files_parsed: usize,
    /// Files that only carry a placeholder.
    pub placeholders: usize,
    /// Total content size in bytes.
    pub total_bytes: u64,
    /// The first few file paths.
    pub sample_paths: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::BINARY_PLACEHOLDER;

    #[test]
    fn test_last_write_wins() {
        let mut project = ParsedProject::new("proj");
        assert!(project.insert("proj/a.txt", "first").is_none());
        project.insert("proj/b.txt", "other");
        let replaced = project.insert(r"proj\a.txt", "second");

        assert_eq!(replaced.as_deref(), Some("first"));
        assert_eq!(project.len(), 2);
        assert_eq!(project.get("proj/a.txt"), Some("second"));
        // Original position is kept
        let (first, _) = project.iter().next().unwrap();
        assert_eq!(first, normalize_separators("proj/a.txt"));
    }

    #[test]
    fn test_stats_sample() {
        let mut project = ParsedProject::new("proj");
        for i in 0..12 {
            project.insert(&format!("proj/f{i}.txt"), "x");
        }
        project.insert("proj/img.png", BINARY_PLACEHOLDER);

        let stats = project.stats(10);
        assert_eq!(stats.files_parsed, 13);
        assert_eq!(stats.placeholders, 1);
        assert_eq!(stats.sample_paths.len(), 10);
        assert_eq!(stats.root_name, "proj");
    }
}
