//! Ordered, lazy directory walk with exclusions.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;
use jwalk::{DirEntry, Parallelism, WalkDirGeneric};
use tracing::{Span, debug, warn};

use treedoc_core::{ExclusionSet, WalkConfig, WalkError, WalkWarning, WarningKind, document_path};

type Entry = DirEntry<((), ())>;
type EntryResult = Result<Entry, jwalk::Error>;

/// One step of a walk, in depth-first pre-order.
#[derive(Debug, Clone)]
pub enum WalkEvent {
    /// A directory is entered; its children follow.
    EnterDir {
        path: PathBuf,
        name: CompactString,
        depth: usize,
    },
    /// A regular file inside the most recently entered directory at `depth - 1`.
    File {
        path: PathBuf,
        name: CompactString,
        depth: usize,
    },
    /// The directory at `path` could not be listed; its subtree is skipped.
    Denied { path: PathBuf, depth: usize },
    /// An entry that was skipped for another reason.
    Skipped(WalkWarning),
}

impl WalkEvent {
    /// Path the event refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::EnterDir { path, .. } | Self::File { path, .. } | Self::Denied { path, .. } => {
                path
            }
            Self::Skipped(warning) => &warning.path,
        }
    }
}

/// Exclusion checks applied while a directory is read.
struct EntryFilter {
    root: PathBuf,
    exclusions: ExclusionSet,
    skip_paths: Vec<PathBuf>,
}

impl EntryFilter {
    fn keep(&self, entry: &Entry) -> bool {
        let name = entry.file_name().to_string_lossy();
        let path = entry.path();
        let relative = path
            .strip_prefix(&self.root)
            .map(document_path)
            .unwrap_or_default();

        let excluded = if entry.file_type().is_dir() {
            self.exclusions.excludes_dir(&name, &path, &relative)
        } else {
            self.exclusions.excludes_file(&name, &path, &relative)
                || self.skip_paths.iter().any(|p| *p == path)
        };

        if excluded {
            debug!(path = %path.display(), "Excluded");
        }
        !excluded
    }
}

/// Directories before files, each group by name.
fn compare_entries(a: &EntryResult, b: &EntryResult) -> Ordering {
    match (a, b) {
        (Ok(a), Ok(b)) => b
            .file_type()
            .is_dir()
            .cmp(&a.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name())),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    }
}

/// Walks a root directory and yields [`WalkEvent`]s.
///
/// The walk is serial and sorted, so two walks of an unchanged tree yield
/// identical sequences. Excluded directories are pruned before they are
/// read, so nothing below them is ever visited.
pub struct TreeWalker {
    root: PathBuf,
    include_hidden: bool,
    filter: Arc<EntryFilter>,
    span: Span,
}

impl TreeWalker {
    /// Create a walker for a config, resolving the root to an absolute path.
    pub fn new(config: &WalkConfig) -> Result<Self, WalkError> {
        let root = config
            .root
            .canonicalize()
            .map_err(|e| WalkError::io(&config.root, e))?;

        if !root.is_dir() {
            return Err(WalkError::NotADirectory { path: root });
        }

        let skip_paths = config.skip_paths.iter().map(|p| resolve_skip_path(p)).collect();

        Ok(Self {
            filter: Arc::new(EntryFilter {
                root: root.clone(),
                exclusions: config.exclusions.clone(),
                skip_paths,
            }),
            root,
            include_hidden: config.include_hidden,
            span: Span::none(),
        })
    }

    /// Log walk events inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Absolute root path being walked.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start the walk.
    pub fn walk(&self) -> WalkIter {
        let filter = Arc::clone(&self.filter);
        let walker = WalkDirGeneric::<((), ())>::new(&self.root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(!self.include_hidden)
            .follow_links(false)
            .process_read_dir(move |depth, _path, _state, children| {
                // The root entry itself is read with no depth
                if depth.is_none() {
                    return;
                }
                children.retain(|child| child.as_ref().map_or(true, |entry| filter.keep(entry)));
                children.sort_by(compare_entries);
            });

        WalkIter {
            inner: Box::new(walker.into_iter()),
            pending: None,
            span: self.span.clone(),
        }
    }
}

/// Files that do not exist yet cannot be canonicalized; resolve their parent.
fn resolve_skip_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

/// Lazy iterator over walk events.
pub struct WalkIter {
    inner: Box<dyn Iterator<Item = EntryResult>>,
    pending: Option<WalkEvent>,
    span: Span,
}

impl Iterator for WalkIter {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        let _entered = self.span.enter();
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        let event = match self.inner.next()? {
            Ok(entry) => {
                // A directory whose listing failed still arrives as an entry
                self.pending = entry
                    .read_children_error
                    .as_ref()
                    .map(|err| listing_failed(&entry, err));
                classify(&entry)
            }
            Err(err) => classify_error(&err),
        };
        Some(event)
    }
}

fn classify(entry: &Entry) -> WalkEvent {
    let path = entry.path();
    let name = CompactString::new(entry.file_name().to_string_lossy());
    let depth = entry.depth();
    let file_type = entry.file_type();

    if file_type.is_dir() {
        WalkEvent::EnterDir { path, name, depth }
    } else if file_type.is_file() {
        WalkEvent::File { path, name, depth }
    } else if file_type.is_symlink() {
        debug!(path = %path.display(), "Skipping symlink");
        WalkEvent::Skipped(WalkWarning::new(
            path,
            "Symbolic links are not archived",
            WarningKind::Symlink,
        ))
    } else {
        WalkEvent::Skipped(WalkWarning::new(
            path,
            "Unsupported file type",
            WarningKind::ReadError,
        ))
    }
}

fn listing_failed(entry: &Entry, err: &jwalk::Error) -> WalkEvent {
    let path = entry.path();
    if is_permission_denied(err) {
        warn!(path = %path.display(), "Permission denied, skipping subtree");
        WalkEvent::Denied {
            path,
            depth: entry.depth(),
        }
    } else {
        warn!(path = %path.display(), error = %err, "Failed to list directory");
        WalkEvent::Skipped(WalkWarning::new(path, err.to_string(), WarningKind::ReadError))
    }
}

fn is_permission_denied(err: &jwalk::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
}

fn classify_error(err: &jwalk::Error) -> WalkEvent {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    if is_permission_denied(err) {
        warn!(path = %path.display(), "Permission denied, skipping subtree");
        WalkEvent::Denied {
            path,
            depth: err.depth(),
        }
    } else {
        warn!(path = %path.display(), error = %err, "Walk error");
        WalkEvent::Skipped(WalkWarning::new(path, err.to_string(), WarningKind::ReadError))
    }
}
