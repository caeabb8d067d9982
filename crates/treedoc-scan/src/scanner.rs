//! Snapshot a directory tree, file contents included.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use compact_str::CompactString;
use tokio::sync::broadcast;
use tracing::{Span, debug, info, warn};

use treedoc_core::{
    FileContent, SourceTree, TreeNode, TreeStats, WalkConfig, WalkError, WalkWarning,
    WarningKind,
};

use crate::progress::ScanProgress;
use crate::walker::{TreeWalker, WalkEvent};

/// Progress is broadcast once per this many files.
const PROGRESS_INTERVAL: u64 = 100;

/// Walks a root and reads every included file into a [`SourceTree`].
pub struct TreeScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
    span: Span,
}

/// Directory being filled while its subtree is walked.
struct OpenDir {
    depth: usize,
    path: PathBuf,
    node: TreeNode,
}

/// Folds walk events into a node tree.
struct Assembly {
    root_path: PathBuf,
    // Relative paths start at the root's own name
    base: PathBuf,
    stack: Vec<OpenDir>,
    stats: TreeStats,
    warnings: Vec<WalkWarning>,
}

impl Assembly {
    fn new(root_path: &Path) -> Self {
        Self {
            root_path: root_path.to_path_buf(),
            base: root_path.parent().map(Path::to_path_buf).unwrap_or_default(),
            stack: Vec::new(),
            stats: TreeStats::new(),
            warnings: Vec::new(),
        }
    }

    /// Apply one event; returns the path of a captured file.
    fn apply(&mut self, event: WalkEvent) -> Option<PathBuf> {
        match event {
            WalkEvent::EnterDir { path, name, depth } => {
                close_until(&mut self.stack, depth);
                if depth > 0 {
                    self.stats.record_dir(depth as u32);
                }
                self.stack.push(OpenDir {
                    depth,
                    path,
                    node: TreeNode::new_directory(name),
                });
                None
            }
            WalkEvent::File { path, name, depth } => {
                close_until(&mut self.stack, depth);
                let content = read_content(&path, &mut self.warnings);
                self.stats.record_file(&content, depth as u32);
                debug!(path = %path.display(), bytes = content.len(), "Captured file");

                let relative = relative_document_path(&self.base, &path);
                if let Some(parent) = self.stack.last_mut() {
                    parent
                        .node
                        .children
                        .push(TreeNode::new_file(name, relative, content));
                }
                Some(path)
            }
            WalkEvent::Denied { path, .. } => {
                self.stats.record_denied();
                if let Some(open) = self.stack.iter_mut().rev().find(|open| open.path == path) {
                    open.node = TreeNode::denied_directory(open.node.name.clone());
                }
                self.warnings.push(WalkWarning::permission_denied(path));
                None
            }
            WalkEvent::Skipped(warning) => {
                self.warnings.push(warning);
                None
            }
        }
    }

    fn finish(mut self) -> (TreeNode, TreeStats, Vec<WalkWarning>) {
        close_until(&mut self.stack, 1);
        let root = match self.stack.pop() {
            Some(open) => open.node,
            None => TreeNode::new_directory(root_name(&self.root_path)),
        };
        (root, self.stats, self.warnings)
    }
}

impl TreeScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            progress_tx,
            span: Span::none(),
        }
    }

    /// Log inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Walk `config.root` and read every included file.
    pub fn scan(&self, config: &WalkConfig) -> Result<SourceTree, WalkError> {
        let _entered = self.span.enter();
        let start = Instant::now();

        let walker = TreeWalker::new(config)?.with_span(self.span.clone());
        let root_path = walker.root().to_path_buf();

        info!(root = %root_path.display(), "Walking source tree");

        let mut assembly = Assembly::new(&root_path);
        for event in walker.walk() {
            if let Some(path) = assembly.apply(event) {
                if assembly.stats.total_files % PROGRESS_INTERVAL == 0 {
                    self.send_progress(&assembly, path, start);
                }
            }
        }
        let (root, stats, warnings) = assembly.finish();

        let scan_duration = start.elapsed();
        let _ = self.progress_tx.send(ScanProgress {
            files_scanned: stats.total_files,
            dirs_scanned: stats.total_dirs,
            bytes_scanned: stats.total_bytes,
            current_path: root_path.clone(),
            warnings: warnings.len() as u64,
            elapsed: scan_duration,
        });

        info!(
            files = stats.total_files,
            dirs = stats.total_dirs,
            warnings = warnings.len(),
            elapsed_ms = scan_duration.as_millis() as u64,
            "Walk complete"
        );

        Ok(SourceTree::new(root, root_path, stats, scan_duration, warnings))
    }

    fn send_progress(&self, assembly: &Assembly, current_path: PathBuf, start: Instant) {
        let _ = self.progress_tx.send(ScanProgress {
            files_scanned: assembly.stats.total_files,
            dirs_scanned: assembly.stats.total_dirs,
            bytes_scanned: assembly.stats.total_bytes,
            current_path,
            warnings: assembly.warnings.len() as u64,
            elapsed: start.elapsed(),
        });
    }
}

impl Default for TreeScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach every open directory at `depth` or deeper to its parent.
fn close_until(stack: &mut Vec<OpenDir>, depth: usize) {
    while stack.len() > 1 && stack.last().is_some_and(|open| open.depth >= depth) {
        if let Some(done) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.node.children.push(done.node);
            }
        }
    }
}

fn read_content(path: &Path, warnings: &mut Vec<WalkWarning>) -> FileContent {
    match fs::read(path) {
        Ok(bytes) => {
            let content = FileContent::from_bytes(bytes);
            if !content.is_text() {
                warnings.push(WalkWarning::new(
                    path,
                    "Not valid UTF-8, content replaced by placeholder",
                    WarningKind::Unreadable,
                ));
            }
            content
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to read file");
            warnings.push(WalkWarning::read_error(path, &err));
            FileContent::Unreadable {
                reason: err.to_string(),
            }
        }
    }
}

fn relative_document_path(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    treedoc_core::document_path(relative)
}

fn root_name(root: &Path) -> CompactString {
    root.file_name()
        .map(|n| CompactString::new(n.to_string_lossy()))
        .unwrap_or_else(|| CompactString::new(root.to_string_lossy()))
}
