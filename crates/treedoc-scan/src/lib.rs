//! Directory walking for treedoc.
//!
//! # Overview
//!
//! `treedoc-scan` turns a directory on disk into the in-memory tree that
//! the serializer renders:
//!
//! - **Deterministic order**: directories before files, each sorted by name
//! - **Exact exclusions**: excluded directories are pruned, never descended
//! - **Lazy events** via [`TreeWalker::walk`]
//! - **Content snapshots** via [`TreeScanner::scan`], with binary and
//!   unreadable files replaced by placeholders
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use treedoc_scan::{TreeScanner, WalkConfig};
//!
//! let config = WalkConfig::new("/path/to/project");
//! let tree = TreeScanner::new().scan(&config).unwrap();
//!
//! println!("Captured {} files", tree.total_files());
//! ```
//!
//! Walk events can be consumed directly when contents are not needed:
//!
//! ```rust,no_run
//! use treedoc_scan::{TreeWalker, WalkConfig, WalkEvent};
//!
//! let walker = TreeWalker::new(&WalkConfig::new(".")).unwrap();
//! for event in walker.walk() {
//!     if let WalkEvent::File { path, .. } = event {
//!         println!("{}", path.display());
//!     }
//! }
//! ```

mod progress;
mod scanner;
mod walker;

pub use progress::ScanProgress;
pub use scanner::TreeScanner;
pub use walker::{TreeWalker, WalkEvent, WalkIter};

// Re-export core types for convenience
pub use treedoc_core::{
    ExclusionSet, FileContent, SourceTree, TreeNode, TreeStats, WalkConfig, WalkError,
    WalkWarning, WarningKind,
};
