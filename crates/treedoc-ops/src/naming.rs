//! Output root allocation.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use treedoc_core::MaterializeError;

/// Suffix appended to the root name of a recreated project.
pub const DEFAULT_SUFFIX: &str = "_copy";

/// Highest numeric suffix tried before giving up.
pub const MAX_ATTEMPTS: usize = 1000;

/// Name tried on the given attempt: `proj_copy`, then `proj_copy_1`, `proj_copy_2`, ...
pub fn candidate_name(root_name: &str, suffix: &str, attempt: usize) -> String {
    if attempt == 0 {
        format!("{root_name}{suffix}")
    } else {
        format!("{root_name}{suffix}_{attempt}")
    }
}

/// Create the first free output root under `parent`.
///
/// Each candidate is claimed with a non-recursive `create_dir`, so an
/// existing directory (or file) of the same name is never reused.
pub fn claim_output_root(
    parent: &Path,
    root_name: &str,
    suffix: &str,
) -> Result<PathBuf, MaterializeError> {
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = parent.join(candidate_name(root_name, suffix, attempt));
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %candidate.display(), "Output name taken");
            }
            Err(source) => {
                return Err(MaterializeError::OutputRoot {
                    path: candidate,
                    source,
                });
            }
        }
    }

    Err(MaterializeError::NamesExhausted {
        base: candidate_name(root_name, suffix, 0),
        attempts: MAX_ATTEMPTS,
    })
}
