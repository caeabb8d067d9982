//! Core types for treedoc.
//!
//! This crate provides the data structures shared by the walker, the
//! document serializer/parser and the materializer: source tree nodes,
//! exclusion and parse configuration, recovered projects, and the error
//! and warning types each stage reports.

mod config;
mod error;
mod node;
mod path;
mod project;
mod tree;

pub use config::{
    BOOKKEEPING_DIR, ContentCleanup, DEFAULT_ROOT_NAME, ExclusionSet, MarkerSet, ParseOptions,
    ParseOptionsBuilder, WalkConfig, WalkConfigBuilder, parse_name_list,
};
pub use error::{
    MaterializeError, ParseError, ParseWarning, ParseWarningKind, WalkError, WalkWarning,
    WarningKind,
};
pub use node::{
    BINARY_PLACEHOLDER, FileContent, NodeKind, TreeNode, is_placeholder, read_error_placeholder,
};
pub use path::{basename, document_path, first_component, is_safe_relative, normalize_separators};
pub use project::{ParsedProject, ProjectStats};
pub use tree::{SourceTree, TreeStats};
