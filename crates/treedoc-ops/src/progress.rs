//! Progress and result types for materialization.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::OperationError;

/// Phase of a materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterializeStage {
    CreateDirectories,
    WriteFiles,
}

impl std::fmt::Display for MaterializeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDirectories => write!(f, "Creating directories"),
            Self::WriteFiles => write!(f, "Writing files"),
        }
    }
}

/// Progress information for an ongoing materialization.
#[derive(Debug, Clone)]
pub struct MaterializeProgress {
    pub stage: MaterializeStage,
    /// Entries finished in this stage, failed ones included.
    pub completed: usize,
    /// Entries in this stage.
    pub total: usize,
    /// The entry currently being processed.
    pub current: Option<PathBuf>,
}

impl MaterializeProgress {
    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.completed as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Result of a completed materialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializeReport {
    /// The directory everything was written under.
    pub output_root: PathBuf,
    pub dirs_created: usize,
    pub dirs_failed: usize,
    pub files_created: usize,
    pub files_failed: usize,
    /// Files written with a binary or read-error placeholder as content.
    pub placeholders: usize,
    pub bytes_written: u64,
    pub errors: Vec<OperationError>,
    pub elapsed: Duration,
}

impl MaterializeReport {
    pub(crate) fn new(output_root: PathBuf) -> Self {
        Self {
            output_root,
            dirs_created: 0,
            dirs_failed: 0,
            files_created: 0,
            files_failed: 0,
            placeholders: 0,
            bytes_written: 0,
            errors: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// At least one file was written and verified.
    ///
    /// Individual failures do not change this; see [`Self::has_failures`].
    pub fn is_success(&self) -> bool {
        self.files_created > 0
    }

    /// Check if any directory or file failed.
    pub fn has_failures(&self) -> bool {
        self.dirs_failed > 0 || self.files_failed > 0
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Created {} files in {} directories",
            self.files_created, self.dirs_created
        );
        if self.has_failures() {
            summary.push_str(&format!(
                ", {} files and {} directories failed",
                self.files_failed, self.dirs_failed
            ));
        }
        if self.placeholders > 0 {
            summary.push_str(&format!(" ({} placeholders)", self.placeholders));
        }
        summary
    }
}
