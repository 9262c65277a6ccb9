//! Logging infrastructure.
//!
//! Structured logging with two outputs:
//! - the configured log file (cleared on each run, no ANSI colors)
//! - stderr, so that reports printed on stdout stay machine readable
//!
//! The level defaults to `info` (`debug` with `--debug`) and can be
//! overridden with the `RUST_LOG` environment variable.

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the global subscriber.
///
/// Creates the log file's directory if needed and truncates the file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be cleared.
pub fn init_logging(log_path: &Path, debug: bool) -> Result<LoggingGuard, io::Error> {
    let (log_dir, log_file) = split_log_path(log_path)?;
    fs::create_dir_all(log_dir)?;
    fs::write(log_path, "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(false);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

fn split_log_path(log_path: &Path) -> Result<(&Path, &std::ffi::OsStr), io::Error> {
    let file = log_path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path has no file name: {}", log_path.display()),
        )
    })?;
    let dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((dir, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "info");
        assert_eq!(default_filter(true), "debug");
    }

    #[test]
    fn test_split_log_path() {
        let (dir, file) = split_log_path(Path::new("/var/log/ipc/run.log")).unwrap();
        assert_eq!(dir, Path::new("/var/log/ipc"));
        assert_eq!(file, "run.log");

        let (dir, file) = split_log_path(Path::new("run.log")).unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(file, "run.log");
    }

    #[test]
    fn test_split_log_path_without_file_name() {
        let err = split_log_path(Path::new("/")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let _logging_guard = LoggingGuard { _file_guard: guard };
    }

    #[test]
    fn test_log_directory_preparation() {
        // The global subscriber can only be installed once per process, so
        // only the file preparation is exercised here.
        let temp = tempfile::TempDir::new().unwrap();
        let log_path: PathBuf = temp.path().join("nested").join("ipc-areas.log");
        let (dir, _) = split_log_path(&log_path).unwrap();

        fs::create_dir_all(dir).unwrap();
        fs::write(&log_path, "old").unwrap();
        fs::write(&log_path, "").unwrap();

        assert_eq!(fs::read_to_string(&log_path).unwrap(), "");
    }
}
