//! Per-entry failures recorded while materializing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What went wrong for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// A directory could not be created.
    CreateDirectory,
    /// A file could not be written.
    Write,
    /// The file was written but reading it back failed or differed.
    Verify,
    /// The recovered path would escape the output root.
    UnsafePath,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDirectory => write!(f, "Create directory"),
            Self::Write => write!(f, "Write"),
            Self::Verify => write!(f, "Verify"),
            Self::UnsafePath => write!(f, "Unsafe path"),
        }
    }
}

/// A non-fatal error for a single directory or file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    /// The path that caused the error.
    pub path: PathBuf,
    pub kind: FailureKind,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    pub fn new(path: impl Into<PathBuf>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed for {}: {}", self.kind, self.path.display(), self.message)
    }
}
