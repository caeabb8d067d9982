//! Write a recovered project back to disk.

use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{Span, debug, info, warn};
use treedoc_core::{MaterializeError, ParsedProject, is_placeholder, is_safe_relative};

use crate::naming::{DEFAULT_SUFFIX, claim_output_root};
use crate::progress::{MaterializeProgress, MaterializeReport, MaterializeStage};
use crate::{FailureKind, OPERATION_CHANNEL_SIZE, OperationError};

/// Where and how a project is materialized.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct MaterializeConfig {
    /// Parent directory the output root is created in.
    pub destination: PathBuf,

    /// Appended to the root name to form the output root name.
    #[builder(default = "DEFAULT_SUFFIX.to_string()")]
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Read every file back and compare it with the recovered content.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub verify: bool,

    /// Drop the leading root-name component from recovered paths, so
    /// `proj/a.txt` lands in `proj_copy/a.txt`.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub strip_root: bool,
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

fn default_true() -> bool {
    true
}

impl MaterializeConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref suffix) = self.suffix {
            if suffix.contains(['/', '\\']) {
                return Err("Suffix cannot contain path separators".to_string());
            }
        }
        match self.destination {
            Some(ref dest) if dest.as_os_str().is_empty() => {
                Err("Destination cannot be empty".to_string())
            }
            Some(_) => Ok(()),
            None => Err("Destination is required".to_string()),
        }
    }
}

impl MaterializeConfig {
    pub fn builder() -> MaterializeConfigBuilder {
        MaterializeConfigBuilder::default()
    }

    /// Materialize under `destination` with default settings.
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            suffix: default_suffix(),
            verify: true,
            strip_root: true,
        }
    }
}

/// Creates directories and files for a [`ParsedProject`].
///
/// Materialization is not transactional: failures are tallied per entry
/// and whatever was written stays on disk.
pub struct Materializer {
    config: MaterializeConfig,
    progress_tx: broadcast::Sender<MaterializeProgress>,
    span: Span,
}

impl Materializer {
    pub fn new(config: MaterializeConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(OPERATION_CHANNEL_SIZE);
        Self {
            config,
            progress_tx,
            span: Span::none(),
        }
    }

    /// Log inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Subscribe to progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<MaterializeProgress> {
        self.progress_tx.subscribe()
    }

    pub fn config(&self) -> &MaterializeConfig {
        &self.config
    }

    /// Create a fresh output root and write every file of `project` into it.
    pub fn materialize(&self, project: ParsedProject) -> Result<MaterializeReport, MaterializeError> {
        let _entered = self.span.enter();
        let start = Instant::now();

        if project.is_empty() {
            return Err(MaterializeError::EmptyProject);
        }
        let destination = &self.config.destination;
        if !destination.is_dir() {
            return Err(MaterializeError::InvalidDestination {
                path: destination.clone(),
            });
        }

        let output_root = claim_output_root(destination, &project.root_name, &self.config.suffix)?;
        info!(
            output = %output_root.display(),
            files = project.len(),
            "Materializing project"
        );

        let mut report = MaterializeReport::new(output_root.clone());
        let ParsedProject { root_name, files } = project;

        let mut planned = Vec::with_capacity(files.len());
        for (declared, content) in files {
            let relative = self.placement(&declared, &root_name);
            if !is_safe_relative(&relative) {
                warn!(path = %declared.display(), "Refusing path outside the output root");
                report.files_failed += 1;
                report.errors.push(OperationError::new(
                    declared,
                    FailureKind::UnsafePath,
                    "Path leaves the output root",
                ));
                continue;
            }
            planned.push((relative, content));
        }

        self.create_directories(&output_root, &planned, &mut report);
        self.write_files(&output_root, planned, &mut report);

        report.elapsed = start.elapsed();
        info!(
            output = %output_root.display(),
            dirs_created = report.dirs_created,
            dirs_failed = report.dirs_failed,
            files_created = report.files_created,
            files_failed = report.files_failed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Materialization complete"
        );
        Ok(report)
    }

    /// Path of a recovered file relative to the output root.
    fn placement(&self, declared: &Path, root_name: &str) -> PathBuf {
        if !self.config.strip_root {
            return declared.to_path_buf();
        }
        let mut components = declared.components();
        match components.next() {
            Some(Component::Normal(first))
                if first == OsStr::new(root_name) && components.clone().next().is_some() =>
            {
                components.as_path().to_path_buf()
            }
            _ => declared.to_path_buf(),
        }
    }

    /// Create every parent directory, shallowest first.
    fn create_directories(
        &self,
        output_root: &Path,
        planned: &[(PathBuf, String)],
        report: &mut MaterializeReport,
    ) {
        let mut dirs: Vec<&Path> = planned
            .iter()
            .filter_map(|(relative, _)| relative.parent())
            .filter(|parent| !parent.as_os_str().is_empty())
            .collect();
        dirs.sort_by(|a, b| {
            a.components()
                .count()
                .cmp(&b.components().count())
                .then_with(|| a.cmp(b))
        });
        dirs.dedup();

        let total = dirs.len();
        for (i, dir) in dirs.into_iter().enumerate() {
            let target = output_root.join(dir);
            self.send_progress(MaterializeStage::CreateDirectories, i, total, &target);

            match fs::create_dir_all(&target) {
                Ok(()) => {
                    debug!(path = %target.display(), "Created directory");
                    report.dirs_created += 1;
                }
                Err(e) => {
                    warn!(path = %target.display(), error = %e, "Failed to create directory");
                    report.dirs_failed += 1;
                    report.errors.push(OperationError::new(
                        target,
                        FailureKind::CreateDirectory,
                        e.to_string(),
                    ));
                }
            }
        }
    }

    fn write_files(
        &self,
        output_root: &Path,
        planned: Vec<(PathBuf, String)>,
        report: &mut MaterializeReport,
    ) {
        let total = planned.len();
        for (i, (relative, content)) in planned.into_iter().enumerate() {
            let target = output_root.join(&relative);
            self.send_progress(MaterializeStage::WriteFiles, i, total, &target);

            match self.write_one(&target, &content) {
                Ok(()) => {
                    debug!(path = %target.display(), bytes = content.len(), "Wrote file");
                    report.files_created += 1;
                    report.bytes_written += content.len() as u64;
                    if is_placeholder(&content) {
                        report.placeholders += 1;
                    }
                }
                Err(error) => {
                    warn!(path = %target.display(), "{}", error.message);
                    report.files_failed += 1;
                    report.errors.push(error);
                }
            }
        }
        self.send_progress(MaterializeStage::WriteFiles, total, total, output_root);
    }

    fn write_one(&self, target: &Path, content: &str) -> Result<(), OperationError> {
        // Idempotent; covers a parent whose creation failed earlier
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                OperationError::new(target, FailureKind::Write, format!("Parent directory: {e}"))
            })?;
        }
        fs::write(target, content)
            .map_err(|e| OperationError::new(target, FailureKind::Write, e.to_string()))?;

        if !self.config.verify {
            return Ok(());
        }
        let written = fs::read(target)
            .map_err(|e| OperationError::new(target, FailureKind::Verify, e.to_string()))?;
        if written != content.as_bytes() {
            return Err(OperationError::new(
                target,
                FailureKind::Verify,
                format!(
                    "Content differs after write ({} bytes expected, {} read)",
                    content.len(),
                    written.len()
                ),
            ));
        }
        Ok(())
    }

    fn send_progress(&self, stage: MaterializeStage, completed: usize, total: usize, current: &Path) {
        let _ = self.progress_tx.send(MaterializeProgress {
            stage,
            completed,
            total,
            current: Some(current.to_path_buf()),
        });
    }
}
