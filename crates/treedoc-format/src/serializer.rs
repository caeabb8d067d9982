//! Render a [`SourceTree`] into a document.

use std::path::{Path, PathBuf};

use tracing::{Span, debug, info};
use treedoc_core::{MarkerSet, SourceTree, TreeNode};

use crate::grammar::{
    BLOCK_SEPARATOR_WIDTH, CONTENTS_LABEL, DENIED_SUFFIX, Grammar, ROOT_HINT_PREFIX,
};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_PREFIX: &str = "│   ";
const SPACE_PREFIX: &str = "    ";

/// Renders source trees as documents.
///
/// Each section's content sits between exactly one line break after its
/// START marker and one before its END marker, so a verbatim parse
/// recovers it unchanged.
pub struct Serializer {
    grammar: Grammar,
    span: Span,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            grammar: Grammar::new(MarkerSet::Current),
            span: Span::none(),
        }
    }

    /// Write markers in another spelling.
    pub fn with_markers(mut self, markers: MarkerSet) -> Self {
        self.grammar = Grammar::new(markers);
        self
    }

    /// Log inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Render the full document: root hint, structure block, contents block.
    pub fn render(&self, tree: &SourceTree) -> String {
        let _entered = self.span.enter();

        let mut out = String::new();
        out.push_str(&format!("{ROOT_HINT_PREFIX} {}\n\n", tree.root_path.display()));
        out.push_str(&self.render_structure(&tree.root));
        out.push_str("\n\n");
        out.push_str(&"=".repeat(BLOCK_SEPARATOR_WIDTH));
        out.push_str("\n\n");
        out.push_str(CONTENTS_LABEL);
        out.push('\n');
        out.push_str(&self.render_contents(&tree.root, &tree.root_path));
        out.push('\n');

        info!(
            root = %tree.root_path.display(),
            files = tree.stats.total_files,
            bytes = out.len(),
            "Rendered document"
        );
        out
    }

    /// Draw the tree: directories first, then files, with box connectors.
    pub fn render_structure(&self, root: &TreeNode) -> String {
        let mut lines = Vec::new();
        if root.is_denied() {
            lines.push(format!("{}/{DENIED_SUFFIX}", root.name));
        } else {
            lines.push(format!("{}/", root.name));
            draw_children(root, "", &mut lines);
        }
        lines.join("\n")
    }

    /// Render every file section, grouped by directory in walk order.
    pub fn render_contents(&self, root: &TreeNode, root_path: &Path) -> String {
        let mut lines = Vec::new();
        self.render_group(root, root_path.to_path_buf(), &mut lines);
        lines.join("\n")
    }

    fn render_group(&self, dir: &TreeNode, dir_path: PathBuf, lines: &mut Vec<String>) {
        for sub in dir.subdirectories() {
            self.render_group(sub, dir_path.join(sub.name.as_str()), lines);
        }

        let mut files = dir.files().filter_map(|node| {
            node.as_file()
                .map(|(relative, content)| (node.name.as_str(), relative, content))
        });
        let Some(first) = files.next() else {
            return;
        };

        lines.push(String::new());
        lines.push(format!("=== Directory: {} ===", dir_path.display()));
        for (name, relative, content) in std::iter::once(first).chain(files) {
            debug!(path = relative, "Rendering section");
            lines.push(String::new());
            lines.push(self.grammar.start_line(name, relative));
            lines.push(content.document_text().into_owned());
            lines.push(self.grammar.end_line(name, relative));
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_children(dir: &TreeNode, prefix: &str, lines: &mut Vec<String>) {
    let dirs: Vec<&TreeNode> = dir.subdirectories().collect();
    let files: Vec<&TreeNode> = dir.files().collect();

    for (i, sub) in dirs.iter().enumerate() {
        // A directory only closes the level when no files follow it
        let last = i == dirs.len() - 1 && files.is_empty();
        let (connector, extension) = if last {
            (LAST_BRANCH, SPACE_PREFIX)
        } else {
            (BRANCH, PIPE_PREFIX)
        };

        if sub.is_denied() {
            lines.push(format!("{prefix}{connector}{}/{DENIED_SUFFIX}", sub.name));
            continue;
        }
        lines.push(format!("{prefix}{connector}{}/", sub.name));
        draw_children(sub, &format!("{prefix}{extension}"), lines);
    }

    for (i, file) in files.iter().enumerate() {
        let connector = if i == files.len() - 1 { LAST_BRANCH } else { BRANCH };
        lines.push(format!("{prefix}{connector}{}", file.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treedoc_core::FileContent;

    fn sample_tree() -> TreeNode {
        let mut root = TreeNode::new_directory("proj");
        let mut sub = TreeNode::new_directory("sub");
        sub.children.push(TreeNode::new_file(
            "b.txt",
            "proj/sub/b.txt",
            FileContent::Text("world".into()),
        ));
        root.children.push(sub);
        root.children.push(TreeNode::denied_directory("vault"));
        root.children.push(TreeNode::new_file(
            "a.txt",
            "proj/a.txt",
            FileContent::Text("hello".into()),
        ));
        root.children.push(TreeNode::new_file("logo.png", "proj/logo.png", FileContent::Binary));
        root.sort_children();
        root
    }

    #[test]
    fn test_structure_drawing() {
        let drawing = Serializer::new().render_structure(&sample_tree());
        let expected = [
            "proj/",
            "├── sub/",
            "│   └── b.txt",
            "├── vault/ [Permission Denied]",
            "├── a.txt",
            "└── logo.png",
        ]
        .join("\n");
        assert_eq!(drawing, expected);
    }

    #[test]
    fn test_last_directory_without_files() {
        let mut root = TreeNode::new_directory("proj");
        let mut only = TreeNode::new_directory("only");
        only.children.push(TreeNode::new_file(
            "x.txt",
            "proj/only/x.txt",
            FileContent::Text(String::new()),
        ));
        root.children.push(only);

        let drawing = Serializer::new().render_structure(&root);
        assert_eq!(drawing, "proj/\n└── only/\n    └── x.txt");
    }

    #[test]
    fn test_contents_grouped_by_directory() {
        let contents = Serializer::new().render_contents(&sample_tree(), Path::new("/work/proj"));
        let sub_group = contents
            .find(&format!("=== Directory: {} ===", Path::new("/work/proj/sub").display()))
            .unwrap();
        let root_group = contents.find("=== Directory: /work/proj ===").unwrap();
        assert!(sub_group < root_group);

        assert!(contents.contains(
            "────── FILE START: a.txt (proj/a.txt) ──────\nhello\n────── FILE END: a.txt (proj/a.txt) ──────"
        ));
        assert!(contents.contains("[BINARY FILE - CONTENTS NOT SHOWN]"));
    }

    #[test]
    fn test_legacy_markers() {
        let contents = Serializer::new()
            .with_markers(MarkerSet::Legacy)
            .render_contents(&sample_tree(), Path::new("/work/proj"));
        assert!(contents.contains("------ FILE START: b.txt (proj/sub/b.txt) ------"));
        assert!(!contents.contains("──────"));
    }
}
