//! Per-invocation logging.
//!
//! Nothing is installed globally: a [`LogContext`] owns a
//! [`Dispatch`] and commands run inside [`LogContext::run`].

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Dispatch;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

/// Environment variable holding a filter directive, e.g. `treedoc_format=debug`.
pub const LOG_ENV: &str = "TREEDOC_LOG";

/// Log file name used when none is configured.
pub const LOG_FILE_NAME: &str = "treedoc.log";

/// `[log]` section of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level: trace, debug, info, warn, error, off
    pub level: String,

    /// Explicit log file path.
    pub file: Option<PathBuf>,

    /// Write a log file at all.
    pub to_file: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            to_file: true,
        }
    }
}

/// Subscriber for one command: console on stderr plus an optional plain-text file.
pub struct LogContext {
    dispatch: Dispatch,
    file: Option<PathBuf>,
}

impl LogContext {
    /// Build the subscriber.
    ///
    /// Filter priority: `TREEDOC_LOG`, then `-v` flags, then the configured level.
    /// The log file goes to `settings.file`, else `treedoc.log` in `log_dir`.
    pub fn new(settings: &LogSettings, verbose: u8, log_dir: Option<&Path>) -> Result<Self> {
        let filter = build_filter(settings, verbose)?;

        let file = settings.to_file.then(|| resolve_log_file(settings, log_dir)).flatten();
        let file_layer = match &file {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create log directory {}", parent.display())
                    })?;
                }
                let writer = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file {}", path.display()))?;
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(true)
                        .with_writer(Mutex::new(writer)),
                )
            }
            None => None,
        };

        let subscriber = Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(file_layer);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            file,
        })
    }

    /// Path of the log file, if one is written.
    pub fn log_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Run `f` with this context as the current subscriber.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

fn build_filter(settings: &LogSettings, verbose: u8) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    let level = match verbose {
        0 => settings.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level: {level}"))
}

fn resolve_log_file(settings: &LogSettings, log_dir: Option<&Path>) -> Option<PathBuf> {
    settings
        .file
        .clone()
        .or_else(|| log_dir.map(|dir| dir.join(LOG_FILE_NAME)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = LogSettings::default();
        assert_eq!(settings.level, "info");
        assert!(settings.to_file);
        assert!(settings.file.is_none());
    }

    #[test]
    fn test_log_file_resolution() {
        let settings = LogSettings::default();
        assert_eq!(
            resolve_log_file(&settings, Some(Path::new("out"))),
            Some(PathBuf::from("out").join(LOG_FILE_NAME))
        );
        assert_eq!(resolve_log_file(&settings, None), None);

        let explicit = LogSettings {
            file: Some(PathBuf::from("/var/log/t.log")),
            ..LogSettings::default()
        };
        assert_eq!(
            resolve_log_file(&explicit, Some(Path::new("out"))),
            Some(PathBuf::from("/var/log/t.log"))
        );
    }

    #[test]
    fn test_context_writes_file() {
        let temp = TempDir::new().unwrap();
        let context = LogContext::new(&LogSettings::default(), 0, Some(temp.path())).unwrap();

        context.run(|| tracing::warn!("scoped message"));

        let log = fs::read_to_string(temp.path().join(LOG_FILE_NAME)).unwrap();
        assert!(log.contains("scoped message"));
    }

    #[test]
    fn test_no_file_when_disabled() {
        let temp = TempDir::new().unwrap();
        let settings = LogSettings {
            to_file: false,
            ..LogSettings::default()
        };
        let context = LogContext::new(&settings, 0, Some(temp.path())).unwrap();
        assert!(context.log_file().is_none());
        assert!(!temp.path().join(LOG_FILE_NAME).exists());
    }
}
