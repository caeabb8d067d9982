//! Error and warning types for walking, parsing and materializing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MarkerSet;

/// Errors that abort a walk.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl WalkError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of walk warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A directory could not be listed; its subtree was skipped.
    PermissionDenied,
    /// Error reading a directory entry or file.
    ReadError,
    /// A symbolic link was skipped.
    Symlink,
    /// File content is not UTF-8 text.
    Unreadable,
}

/// Non-fatal warning encountered during a walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl WalkWarning {
    /// Create a new walk warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a permission denied warning.
    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Permission denied: {}", path.display()),
            path,
            kind: WarningKind::PermissionDenied,
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self {
            message: format!("Read error: {error}"),
            path: path.into(),
            kind: WarningKind::ReadError,
        }
    }
}

/// Errors that make a whole parse fail.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document file does not exist.
    #[error("Source document not found: {path}")]
    SourceMissing {
        path: PathBuf,
        /// Entries of the directory that was searched.
        listing: Vec<String>,
    },

    /// The document could not be read.
    #[error("Failed to read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No complete file section was found.
    #[error("No file sections found using {markers} markers ({skipped} incomplete sections skipped)")]
    NoSections { markers: MarkerSet, skipped: usize },
}

/// Kind of parse warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseWarningKind {
    /// A START header without an extractable `(path)`.
    MissingPath,
    /// A section with no END marker before the next START or end of document.
    MissingEnd,
    /// The closing END marker declares a different path than its START.
    PathMismatch,
    /// A later section replaced an earlier one with the same path.
    Overwritten,
    /// The declared path would escape the directory it is written into.
    UnsafePath,
}

/// Non-fatal problem with one section of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number of the header the warning refers to.
    pub line: usize,
    /// Kind of warning.
    pub kind: ParseWarningKind,
    /// Human-readable message.
    pub message: String,
}

impl ParseWarning {
    /// Create a new parse warning.
    pub fn new(line: usize, kind: ParseWarningKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
        }
    }

    /// Check whether the warning caused a section to be dropped.
    pub fn is_skip(&self) -> bool {
        matches!(
            self.kind,
            ParseWarningKind::MissingPath | ParseWarningKind::MissingEnd
        )
    }
}

/// Errors that prevent materialization from starting.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// The recovered project has no files.
    #[error("Nothing to create: the parsed project contains no files")]
    EmptyProject,

    /// The destination parent is missing or unusable.
    #[error("Destination is not a directory: {path}")]
    InvalidDestination { path: PathBuf },

    /// Could not create the output root.
    #[error("Failed to create output root {path}: {source}")]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every candidate output name was taken.
    #[error("No free output name for {base} after {attempts} attempts")]
    NamesExhausted { base: String, attempts: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_error_io() {
        let err = WalkError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, WalkError::PermissionDenied { .. }));

        let err = WalkError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, WalkError::NotFound { .. }));
    }

    #[test]
    fn test_walk_warning_creation() {
        let warning = WalkWarning::permission_denied("/test/path");
        assert_eq!(warning.kind, WarningKind::PermissionDenied);
        assert!(warning.message.contains("Permission denied"));
    }

    #[test]
    fn test_parse_warning_skip_kinds() {
        assert!(ParseWarning::new(3, ParseWarningKind::MissingEnd, "x").is_skip());
        assert!(ParseWarning::new(3, ParseWarningKind::MissingPath, "x").is_skip());
        assert!(!ParseWarning::new(3, ParseWarningKind::Overwritten, "x").is_skip());
    }

    #[test]
    fn test_no_sections_message() {
        let err = ParseError::NoSections {
            markers: MarkerSet::Legacy,
            skipped: 2,
        };
        let message = err.to_string();
        assert!(message.contains("legacy"));
        assert!(message.contains("2 incomplete"));
    }
}
