//! Optional TOML settings file.
//!
//! ```toml
//! [walk]
//! exclude_dirs = ["target", ".git"]
//! exclude_files = ["Cargo.lock"]
//!
//! [parse]
//! markers = "legacy"
//! cleanup = "verbatim"
//!
//! [log]
//! level = "debug"
//! ```

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use treedoc_core::{ExclusionSet, ParseOptions, parse_name_list};

use crate::logging::LogSettings;

/// `[walk]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkSettings {
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<String>,
    pub include_hidden: bool,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            exclude_dirs: Vec::new(),
            exclude_files: Vec::new(),
            include_hidden: true,
        }
    }
}

impl WalkSettings {
    /// Exclusions from the file merged with command-line values.
    ///
    /// Command-line values may be comma-separated lists.
    pub fn exclusions(&self, cli_dirs: &[String], cli_files: &[String]) -> ExclusionSet {
        let split = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .flat_map(|value| parse_name_list(value))
                .collect()
        };

        let mut exclusions = ExclusionSet::new()
            .with_dirs(self.exclude_dirs.iter().cloned())
            .with_files(self.exclude_files.iter().cloned());
        exclusions.merge(
            &ExclusionSet::new()
                .with_dirs(split(cli_dirs))
                .with_files(split(cli_files)),
        );
        exclusions
    }
}

/// Contents of a settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub walk: WalkSettings,
    pub parse: ParseOptions,
    pub log: LogSettings,
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treedoc_core::{ContentCleanup, MarkerSet};

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [parse]
            markers = "legacy"

            [walk]
            exclude_dirs = ["target"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.parse.markers, MarkerSet::Legacy);
        assert_eq!(settings.parse.cleanup, ContentCleanup::Trim);
        assert!(settings.walk.include_hidden);
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_exclusions_merge_cli_lists() {
        let walk = WalkSettings {
            exclude_dirs: vec!["target".to_string()],
            ..WalkSettings::default()
        };
        let exclusions = walk.exclusions(
            &["node_modules, .git".to_string()],
            &["Cargo.lock".to_string()],
        );

        assert!(exclusions.dirs.contains("target"));
        assert!(exclusions.dirs.contains("node_modules"));
        assert!(exclusions.dirs.contains(".git"));
        assert!(exclusions.files.contains("Cargo.lock"));
    }

    #[test]
    fn test_missing_path_is_default() {
        let settings = Settings::load(None).unwrap();
        assert!(settings.walk.exclude_dirs.is_empty());
    }
}
