//! Materialization of recovered treedoc projects.
//!
//! A [`Materializer`] takes the [`ParsedProject`](treedoc_core::ParsedProject)
//! a document was parsed into and recreates it under a freshly allocated
//! output root (`<root>_copy`, `<root>_copy_1`, ...). Directories are created
//! shallowest first, every file is read back and compared after it is
//! written, and per-entry failures are tallied in a [`MaterializeReport`]
//! rather than aborting the run.

mod materialize;
mod naming;
mod operation;
mod progress;

pub use materialize::{MaterializeConfig, MaterializeConfigBuilder, Materializer};
pub use naming::{DEFAULT_SUFFIX, MAX_ATTEMPTS, candidate_name, claim_output_root};
pub use operation::{FailureKind, OperationError};
pub use progress::{MaterializeProgress, MaterializeReport, MaterializeStage};

/// Default channel buffer size for progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
