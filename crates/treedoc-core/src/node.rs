//! Source tree node types.

use std::borrow::Cow;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Placeholder written in place of content that is not UTF-8 text.
pub const BINARY_PLACEHOLDER: &str = "[BINARY FILE - CONTENTS NOT SHOWN]";

const READ_ERROR_PREFIX: &str = "[ERROR READING FILE: ";

/// Placeholder written in place of content that could not be read.
pub fn read_error_placeholder(reason: &str) -> String {
    format!("{READ_ERROR_PREFIX}{reason}]")
}

/// Check whether recovered content is one of the placeholders rather than real text.
pub fn is_placeholder(content: &str) -> bool {
    let content = content.trim();
    content == BINARY_PLACEHOLDER || (content.starts_with(READ_ERROR_PREFIX) && content.ends_with(']'))
}

/// Content of a walked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileContent {
    /// Valid UTF-8 text, verbatim.
    Text(String),
    /// Bytes that do not decode as UTF-8.
    Binary,
    /// The file could not be read.
    Unreadable {
        /// Reason reported by the OS.
        reason: String,
    },
}

impl FileContent {
    /// Decode raw bytes, falling back to [`FileContent::Binary`].
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(_) => Self::Binary,
        }
    }

    /// Check if this is real text that survives a round trip.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Text emitted into a document for this content.
    pub fn document_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Binary => Cow::Borrowed(BINARY_PLACEHOLDER),
            Self::Unreadable { reason } => Cow::Owned(read_error_placeholder(reason)),
        }
    }

    /// Size of the text content in bytes (0 for placeholders).
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            _ => 0,
        }
    }

    /// Check if there is no text content.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Type of tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Regular file.
    File {
        /// Path relative to the parent of the walked root, `/`-separated,
        /// so the root name is its first component.
        relative_path: String,
        /// File content or placeholder.
        content: FileContent,
    },
    /// Directory.
    Directory {
        /// Listing the directory was denied; it has no children.
        denied: bool,
    },
}

/// A single file or directory in a walked tree.
///
/// Children are kept in walk order: subdirectories first, then files,
/// each group sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// File/directory name (not full path).
    pub name: CompactString,

    /// Node type and associated data.
    pub kind: NodeKind,

    /// Children nodes (directories only).
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a new file node.
    pub fn new_file(
        name: impl Into<CompactString>,
        relative_path: impl Into<String>,
        content: FileContent,
    ) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File {
                relative_path: relative_path.into(),
                content,
            },
            children: Vec::new(),
        }
    }

    /// Create a new directory node.
    pub fn new_directory(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory { denied: false },
            children: Vec::new(),
        }
    }

    /// Create a directory node whose listing was denied.
    pub fn denied_directory(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory { denied: true },
            children: Vec::new(),
        }
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    /// Check if this directory could not be listed.
    pub fn is_denied(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { denied: true })
    }

    /// Relative path and content for file nodes.
    pub fn as_file(&self) -> Option<(&str, &FileContent)> {
        match &self.kind {
            NodeKind::File {
                relative_path,
                content,
            } => Some((relative_path, content)),
            NodeKind::Directory { .. } => None,
        }
    }

    /// Direct subdirectories, in order.
    pub fn subdirectories(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.iter().filter(|c| c.is_dir())
    }

    /// Direct files, in order.
    pub fn files(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.iter().filter(|c| c.is_file())
    }

    /// Total number of files in this subtree.
    pub fn file_count(&self) -> usize {
        if self.is_file() {
            return 1;
        }
        self.children.iter().map(TreeNode::file_count).sum()
    }

    /// Total number of directories below this node.
    pub fn dir_count(&self) -> usize {
        self.subdirectories().map(|d| d.dir_count() + 1).sum()
    }

    /// Order children: directories before files, each sorted by name.
    pub fn sort_children(&mut self) {
        self.children
            .sort_by(|a, b| b.is_dir().cmp(&a.is_dir()).then_with(|| a.name.cmp(&b.name)));
        for child in &mut self.children {
            child.sort_children();
        }
    }

    /// Visit every file in walk order: a directory's subdirectories are
    /// fully visited before its own files.
    pub fn visit_files<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode)) {
        for child in &self.children {
            if child.is_dir() {
                child.visit_files(visit);
            } else {
                visit(child);
            }
        }
    }
}
