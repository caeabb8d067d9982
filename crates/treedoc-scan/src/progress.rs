//! Scan progress reporting.

use std::path::PathBuf;
use std::time::Duration;

/// Progress information while a tree is walked and read.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of files captured so far.
    pub files_scanned: u64,
    /// Number of directories entered so far.
    pub dirs_scanned: u64,
    /// Text bytes captured so far.
    pub bytes_scanned: u64,
    /// Most recently captured path.
    pub current_path: PathBuf,
    /// Number of warnings recorded.
    pub warnings: u64,
    /// Time elapsed since the walk started.
    pub elapsed: Duration,
}
