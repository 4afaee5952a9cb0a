//! Tracing subscriber setup.
//!
//! Diagnostics go to stderr so they never mix with the JSON-RPC stream on
//! stdout. An optional log file receives every tool call and result with a
//! timestamp, independent of `RUST_LOG`.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Level written to the log file.
const FILE_LOG_LEVEL: &str = "info";

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber.
///
/// A log file that cannot be opened is reported and skipped; the server
/// still starts.
pub fn init(log_file: Option<&Path>) {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    );

    let (file, open_error) = match log_file.map(|path| (path, open_append(path))) {
        Some((_, Ok(file))) => (Some(file), None),
        Some((path, Err(e))) => (None, Some((path, e))),
        None => (None, None),
    };
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_filter(EnvFilter::new(FILE_LOG_LEVEL))
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some((path, e)) = open_error {
        warn!(path = %path.display(), error = %e, "cannot open log file, logging to stderr only");
    }
}
