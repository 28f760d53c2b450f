//! `tracing` subscriber setup for the binary.
//!
//! Events go to a per-session log file and to stderr; stdout is left to
//! command output that scripts parse. `RUST_LOG` overrides the level.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::config_directory;

/// Hold until exit; dropping it flushes the background file writer.
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether events also reach the log file.
    pub fn writes_file(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Installs the global subscriber writing to `log_dir/log_file` and stderr.
///
/// `debug` lowers this crate's default level to `debug`. Fails when the
/// directory cannot be created or the previous log cannot be truncated.
pub fn init_logging(log_dir: &Path, log_file: &str, debug: bool) -> Result<LoggingGuard, io::Error> {
    prepare_log_file(log_dir, log_file)?;

    let (writer, file_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, log_file));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter(debug))
        .with(file_layer)
        .with(stderr_layer())
        .init();

    Ok(LoggingGuard {
        file_guard: Some(file_guard),
    })
}

/// Like [`init_logging`], but an unusable log directory only costs the file
/// sink: events still go to stderr and the command carries on.
pub fn init_logging_or_stderr(log_dir: &Path, log_file: &str, debug: bool) -> LoggingGuard {
    match init_logging(log_dir, log_file, debug) {
        Ok(guard) => guard,
        Err(e) => {
            let _ = tracing_subscriber::registry()
                .with(env_filter(debug))
                .with(stderr_layer())
                .try_init();
            tracing::warn!(
                log_dir = %log_dir.display(),
                error = %e,
                "Log file unavailable, logging to stderr only"
            );
            LoggingGuard { file_guard: None }
        }
    }
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
}

/// One session per file: the previous run's log is truncated.
fn prepare_log_file(log_dir: &Path, log_file: &str) -> Result<PathBuf, io::Error> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file);
    fs::write(&path, "")?;
    Ok(path)
}

fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)))
}

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "aerotiles=debug,info"
    } else {
        "info"
    }
}

/// `~/.aerotiles/logs`
pub fn default_log_dir() -> PathBuf {
    config_directory().join("logs")
}

pub fn default_log_file() -> &'static str {
    "aerotiles.log"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_lives_under_config_directory() {
        assert!(default_log_dir().ends_with(".aerotiles/logs"));
        assert_eq!(default_log_file(), "aerotiles.log");
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "info");
        assert!(default_directive(true).contains("aerotiles=debug"));
    }

    #[test]
    fn test_unwritable_log_dir_falls_back_to_stderr() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let guard = init_logging_or_stderr(&blocker.join("logs"), "test.log", false);
        assert!(!guard.writes_file());
        tracing::info!("still reachable after fallback");
    }

    #[test]
    fn test_prepare_creates_directory_and_clears_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");

        let path = prepare_log_file(&log_dir, "test.log").unwrap();
        assert!(path.exists());

        fs::write(&path, "old log data").unwrap();
        prepare_log_file(&log_dir, "test.log").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
