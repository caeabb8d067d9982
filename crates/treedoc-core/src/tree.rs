//! Walked source tree container and statistics.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WalkWarning;
use crate::node::{FileContent, TreeNode};

/// Summary statistics for a walked tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total text bytes captured.
    pub total_bytes: u64,
    /// Total number of files included.
    pub total_files: u64,
    /// Files carried as text.
    pub text_files: u64,
    /// Files replaced by the binary placeholder.
    pub binary_files: u64,
    /// Files replaced by a read-error placeholder.
    pub unreadable_files: u64,
    /// Total number of directories included (root excluded).
    pub total_dirs: u64,
    /// Directories that could not be listed.
    pub denied_dirs: u64,
    /// Maximum depth reached.
    pub max_depth: u32,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a file entry.
    pub fn record_file(&mut self, content: &FileContent, depth: u32) {
        self.total_files += 1;
        self.max_depth = self.max_depth.max(depth);
        match content {
            FileContent::Text(text) => {
                self.text_files += 1;
                self.total_bytes += text.len() as u64;
            }
            FileContent::Binary => self.binary_files += 1,
            FileContent::Unreadable { .. } => self.unreadable_files += 1,
        }
    }

    /// Record a directory.
    pub fn record_dir(&mut self, depth: u32) {
        self.total_dirs += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Record a directory whose listing was denied.
    pub fn record_denied(&mut self) {
        self.denied_dirs += 1;
    }
}

/// A walked directory tree with file contents, ready to serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTree {
    /// Root node of the tree.
    pub root: TreeNode,

    /// Absolute root path that was walked.
    pub root_path: PathBuf,

    /// Duration of the walk.
    pub scan_duration: Duration,

    /// Summary statistics.
    pub stats: TreeStats,

    /// Warnings encountered during the walk.
    pub warnings: Vec<WalkWarning>,
}

impl SourceTree {
    /// Create a new source tree.
    pub fn new(
        root: TreeNode,
        root_path: PathBuf,
        stats: TreeStats,
        scan_duration: Duration,
        warnings: Vec<WalkWarning>,
    ) -> Self {
        Self {
            root,
            root_path,
            scan_duration,
            stats,
            warnings,
        }
    }

    /// Name of the root directory.
    pub fn root_name(&self) -> &str {
        self.root.name.as_str()
    }

    /// Get the total number of files.
    pub fn total_files(&self) -> u64 {
        self.stats.total_files
    }

    /// Check if there were any warnings during the walk.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_stats_default() {
        let stats = TreeStats::default();
        assert_eq!(stats.total_bytes, 0);
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_dirs, 0);
    }

    #[test]
    fn test_tree_stats_record_file() {
        let mut stats = TreeStats::new();

        stats.record_file(&FileContent::Text("hello".into()), 2);
        stats.record_file(&FileContent::Binary, 1);

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.text_files, 1);
        assert_eq!(stats.binary_files, 1);
        assert_eq!(stats.total_bytes, 5);
        assert_eq!(stats.max_depth, 2);
    }
}
