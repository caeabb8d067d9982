//! Walk and parse configuration types.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Directory name that is always skipped, regardless of user exclusions.
pub const BOOKKEEPING_DIR: &str = ".treedoc-cache";

/// Root name used when a document carries neither a root hint nor any file section.
pub const DEFAULT_ROOT_NAME: &str = "recreated_project";

/// Names and paths excluded from a walk.
///
/// Entries match exactly: against the bare entry name, the absolute path,
/// or the `/`-separated path relative to the walked root. Patterns such as
/// `*.log` are compared literally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet {
    /// Excluded directory names or paths.
    #[serde(default)]
    pub dirs: BTreeSet<String>,
    /// Excluded file names or paths.
    #[serde(default)]
    pub files: BTreeSet<String>,
}

impl ExclusionSet {
    /// Create an empty exclusion set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add excluded directory names or paths.
    pub fn with_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Add excluded file names or paths.
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Merge another set into this one.
    pub fn merge(&mut self, other: &ExclusionSet) {
        self.dirs.extend(other.dirs.iter().cloned());
        self.files.extend(other.files.iter().cloned());
    }

    /// Check if a directory should be skipped along with its whole subtree.
    pub fn excludes_dir(&self, name: &str, path: &Path, relative: &str) -> bool {
        name == BOOKKEEPING_DIR || matches_any(&self.dirs, name, path, relative)
    }

    /// Check if a file should be skipped.
    pub fn excludes_file(&self, name: &str, path: &Path, relative: &str) -> bool {
        matches_any(&self.files, name, path, relative)
    }

    /// Check if no user exclusions are configured.
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }
}

fn matches_any(set: &BTreeSet<String>, name: &str, path: &Path, relative: &str) -> bool {
    if set.is_empty() {
        return false;
    }
    set.contains(name)
        || set.contains(relative)
        || path.to_str().is_some_and(|p| set.contains(p))
}

/// Split a comma-separated list of names into a set, dropping blanks.
pub fn parse_name_list(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration for walking a source tree.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct WalkConfig {
    /// Root directory to walk.
    pub root: PathBuf,

    /// User exclusions.
    #[builder(default)]
    #[serde(default)]
    pub exclusions: ExclusionSet,

    /// Specific files to leave out (e.g. the document being written).
    #[builder(default)]
    #[serde(default)]
    pub skip_paths: Vec<PathBuf>,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,
}

fn default_true() -> bool {
    true
}

impl WalkConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                Err("Root path cannot be empty".to_string())
            }
            Some(_) => Ok(()),
            None => Err("Root path is required".to_string()),
        }
    }
}

impl WalkConfig {
    /// Create a new walk config builder.
    pub fn builder() -> WalkConfigBuilder {
        WalkConfigBuilder::default()
    }

    /// Create a config that walks a path with no exclusions.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclusions: ExclusionSet::default(),
            skip_paths: Vec::new(),
            include_hidden: true,
        }
    }

    /// Check if a file path was explicitly skipped.
    pub fn is_skipped(&self, path: &Path) -> bool {
        self.skip_paths.iter().any(|p| p == path)
    }
}

/// Which marker spelling a document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSet {
    /// `────── FILE START: ...` with box-drawing rules.
    #[default]
    Current,
    /// `------ FILE START: ...` written by older serializers.
    Legacy,
}

impl std::fmt::Display for MarkerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// How captured section content is cleaned before it is stored.
///
/// `Trim` reproduces what earlier tools did: surrounding whitespace is
/// removed and a trailing `( ... )` fragment is stripped. It loses
/// meaningful leading/trailing whitespace, including a final newline.
/// `Verbatim` only drops the single line break that separates content from
/// each marker and recovers serialized content byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCleanup {
    #[default]
    Trim,
    Verbatim,
}

/// Options controlling how a document is parsed.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ParseOptions {
    /// Marker spelling to look for.
    #[builder(default)]
    #[serde(default)]
    pub markers: MarkerSet,

    /// Content cleanup policy.
    #[builder(default)]
    #[serde(default)]
    pub cleanup: ContentCleanup,

    /// Root name used when nothing in the document names one.
    #[builder(default = "DEFAULT_ROOT_NAME.to_string()")]
    #[serde(default = "default_root_name")]
    pub default_root_name: String,
}

fn default_root_name() -> String {
    DEFAULT_ROOT_NAME.to_string()
}

impl ParseOptions {
    /// Create a new parse options builder.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }

    /// Options that recover content byte for byte.
    pub fn verbatim() -> Self {
        Self {
            cleanup: ContentCleanup::Verbatim,
            ..Self::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            markers: MarkerSet::Current,
            cleanup: ContentCleanup::Trim,
            default_root_name: default_root_name(),
        }
    }
}
