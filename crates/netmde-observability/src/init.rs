// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always; with the `file-logging` feature and
//! `file_logging = true`, additionally a timestamped run folder:
//!
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       ├── netmde-graph.log
//!       ├── netmde-embedding.log
//!       └── netmde.log (combined)
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, TimeZone, Utc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, ObservabilityConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Keeps file writers alive; logs are flushed when it is dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder of this process, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

fn env_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

fn console_layer(format: LogFormat, directives: &str) -> Result<BoxedLayer> {
    let filter = env_filter(directives)?;
    let layer = match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    };
    Ok(layer)
}

/// Install the global subscriber
///
/// # Arguments
/// * `debug_flags` - Crates raised to debug level
/// * `config` - Level, format and file logging settings
///
/// # Errors
/// Invalid level directives, log folder creation failures, or a global
/// subscriber that is already installed.
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    config: &ObservabilityConfig,
) -> Result<LoggingGuard> {
    let directives = debug_flags.to_filter_string(&config.level);
    #[cfg_attr(not(feature = "file-logging"), allow(unused_mut))]
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.format, &directives)?];

    #[cfg(feature = "file-logging")]
    let (guard, file_logging_unavailable) = if config.file_logging {
        let (file_layers, guard) = file_layers(config, &directives)?;
        layers.extend(file_layers);
        (guard, false)
    } else {
        (
            LoggingGuard {
                _file_guards: Vec::new(),
                log_dir: None,
            },
            false,
        )
    };
    #[cfg(not(feature = "file-logging"))]
    let (guard, file_logging_unavailable) = (LoggingGuard { log_dir: None }, config.file_logging);

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    if file_logging_unavailable {
        tracing::warn!("file logging requested but the `file-logging` feature is disabled");
    }
    if let Some(dir) = guard.log_dir() {
        tracing::info!("logging to {}", dir.display());
    }
    Ok(guard)
}

/// Initialize console logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &ObservabilityConfig::default())
}

#[cfg(feature = "file-logging")]
fn file_layers(
    config: &ObservabilityConfig,
    directives: &str,
) -> Result<(Vec<BoxedLayer>, LoggingGuard)> {
    use tracing_appender::rolling;

    let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT);
    let run_folder = config.log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
    cleanup_old_logs(&config.log_dir, config.retention_days, config.retention_runs)?;

    let mut layers = Vec::new();
    let mut guards = Vec::new();

    for crate_name in crate::KNOWN_CRATES {
        let appender = rolling::never(&run_folder, format!("{}.log", crate_name));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);
        let filter = env_filter(&format!("{}=debug,off", crate::crate_target(crate_name)))?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(filter)
                .boxed(),
        );
    }

    let combined = rolling::never(&run_folder, "netmde.log");
    let (writer, guard) = tracing_appender::non_blocking(combined);
    guards.push(guard);
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .json()
            .with_filter(env_filter(directives)?)
            .boxed(),
    );

    Ok((
        layers,
        LoggingGuard {
            _file_guards: guards,
            log_dir: Some(run_folder),
        },
    ))
}

/// Remove run folders older than `retention_days`, then all but the newest `retention_runs`
///
/// Entries that are not `run_YYYYmmdd_HHMMSS` folders are left alone.
/// Returns the number of removed folders.
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u64,
    retention_runs: usize,
) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }
    let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);

    let mut runs = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let started = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(RUN_PREFIX))
            .and_then(|stamp| NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP_FORMAT).ok())
            .map(|naive| Utc.from_utc_datetime(&naive));
        if let Some(started) = started {
            runs.push((path, started));
        }
    }
    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (rank, (path, started)) in runs.iter().enumerate() {
        if *started < cutoff || rank >= retention_runs {
            match std::fs::remove_dir_all(path) {
                Ok(()) => removed += 1,
                Err(e) => eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                ),
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run_dir(base: &Path, hours_ago: i64) -> PathBuf {
        let stamp = (Utc::now() - chrono::Duration::hours(hours_ago)).format(RUN_TIMESTAMP_FORMAT);
        let path = base.join(format!("{}{}", RUN_PREFIX, stamp));
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn test_cleanup_applies_age_then_count() {
        let dir = tempdir().unwrap();
        let ancient = run_dir(dir.path(), 24 * 90);
        let oldest_recent = run_dir(dir.path(), 3);
        let middle = run_dir(dir.path(), 2);
        let newest = run_dir(dir.path(), 1);
        let unrelated = dir.path().join("keep_me");
        std::fs::create_dir_all(&unrelated).unwrap();

        let removed = cleanup_old_logs(dir.path(), 30, 2).unwrap();

        assert_eq!(removed, 2);
        assert!(!ancient.exists());
        assert!(!oldest_recent.exists());
        assert!(middle.exists());
        assert!(newest.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_cleanup_of_missing_dir_is_noop() {
        let dir = tempdir().unwrap();
        assert_eq!(cleanup_old_logs(&dir.path().join("absent"), 1, 1).unwrap(), 0);
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        assert!(env_filter("netmde_graph=loudest").is_err());
        assert!(console_layer(LogFormat::Text, "info").is_ok());
    }
}
