use crate::constants::{DEFAULT_LOG_FILTER, LOG_FILE_PREFIX};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber: console on stdout plus a daily-rotated
/// JSON file under `log_dir`.
///
/// Hold the returned guard until the batch is done; dropping it flushes the
/// file writer. When `log_dir` cannot be created only the console is used.
pub fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stdout);

    let (file_layer, guard) = match fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        Err(e) => {
            eprintln!("log directory {} unavailable: {}", log_dir.display(), e);
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(filter_from(std::env::var("RUST_LOG").ok().as_deref()))
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}

/// `RUST_LOG` when it parses, otherwise info for this crate and warnings elsewhere.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}
