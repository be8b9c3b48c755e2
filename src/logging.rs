//! Logging setup.
//!
//! The overlay owns the terminal, so logs go to a file. Filter priority:
//!
//! 1. **`RENDER_VISUALIZER_LOG`** - a bare level (`debug`) applies to this
//!    crate, anything with `=`, `:` or `,` is used as a full directive
//! 2. **`RUST_LOG`** - standard tracing variable, used as-is
//! 3. **Default** - `warn` globally, `info` for this crate
//!
//! Default file: `<temp dir>/render-visualizer-<pid>.log`.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt};

pub const LOG_VAR: &str = "RENDER_VISUALIZER_LOG";

const CRATE_TARGET: &str = "spark_render_visualizer";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log directory {path}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] TryInitError),
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// File (with extension) or directory to log into.
    pub log_file_path: Option<PathBuf>,
}

/// Returned from [`init`]; hold it to keep the file writer flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

/// Install the file subscriber.
pub fn init(config: LogConfig) -> Result<LogGuard, LogError> {
    let (dir, filename) = resolve_log_path(config.log_file_path);
    std::fs::create_dir_all(&dir).map_err(|source| LogError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(&dir, &filename);
    let (writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(EnvFilter::new(filter_directives(|var| env::var(var).ok())));

    tracing_subscriber::registry().with(file_layer).try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: dir.join(filename),
    })
}

/// Stdout logging for tests. Safe to call repeatedly.
pub fn test() {
    let filter = EnvFilter::new(filter_directives(|var| env::var(var).ok()));
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("render-visualizer-{}.log", std::process::id());

    match override_path {
        Some(path) if path.extension().is_some() => {
            let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            (dir, name)
        }
        Some(dir) => (dir, filename),
        None => (env::temp_dir(), filename),
    }
}

/// Filter directives following the priority in the module docs.
fn filter_directives(lookup: impl Fn(&str) -> Option<String>) -> String {
    if let Some(level) = lookup(LOG_VAR) {
        if level.contains(['=', ':', ',']) {
            return level;
        }
        return format!("warn,{CRATE_TARGET}={level}");
    }
    if let Some(rust_log) = lookup("RUST_LOG") {
        return rust_log;
    }
    format!("warn,{CRATE_TARGET}=info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_priority() {
        let none = |_: &str| None;
        assert_eq!(filter_directives(none), "warn,spark_render_visualizer=info");

        let rust_log = |var: &str| (var == "RUST_LOG").then(|| "debug".to_string());
        assert_eq!(filter_directives(rust_log), "debug");

        let both = |var: &str| match var {
            LOG_VAR => Some("trace".to_string()),
            _ => Some("error".to_string()),
        };
        assert_eq!(filter_directives(both), "warn,spark_render_visualizer=trace");
    }

    #[test]
    fn test_full_directive_passthrough() {
        let lookup = |var: &str| (var == LOG_VAR).then(|| "spark_render_visualizer::sync=trace".to_string());
        assert_eq!(filter_directives(lookup), "spark_render_visualizer::sync=trace");
    }

    #[test]
    fn test_resolve_log_path() {
        let (dir, name) = resolve_log_path(Some(PathBuf::from("/tmp/viz/out.log")));
        assert_eq!(dir, PathBuf::from("/tmp/viz"));
        assert_eq!(name, "out.log");

        let (dir, name) = resolve_log_path(Some(PathBuf::from("/tmp/viz")));
        assert_eq!(dir, PathBuf::from("/tmp/viz"));
        assert!(name.starts_with("render-visualizer-"));

        let (dir, _) = resolve_log_path(None);
        assert_eq!(dir, env::temp_dir());
    }

    #[test]
    fn test_logging_test_is_reentrant() {
        test();
        test();
        tracing::info!("still alive");
    }
}
