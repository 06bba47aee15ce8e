//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info".
//!   `RUST_LOG` takes precedence when set.
//! - LOG_FORMAT: "compact" (default), "pretty" or "json"
//! - LOG_DATA_DIR: when using file mode, the directory of the log file (default "./logs")

use chrono::Utc;
use std::{
    env,
    fs::{create_dir_all, File},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::constants::{
    DEFAULT_LOG_DIR, DEFAULT_LOG_FORMAT, DEFAULT_LOG_LEVEL, DEFAULT_LOG_MODE, LOG_FILE_NAME,
};

/// Computes the date-rolled log file path, e.g. `logs/gateway-2024-01-31.log`.
pub fn compute_rolled_file_path(base_dir: &str, file_name: &str, date_str: &str) -> PathBuf {
    let rolled_name = match file_name.strip_suffix(".log") {
        Some(trimmed) => format!("{trimmed}-{date_str}.log"),
        None => format!("{file_name}-{date_str}.log"),
    };
    Path::new(base_dir).join(rolled_name)
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name)
        .map(|v| v.trim().to_lowercase())
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Installs the global tracing subscriber.
///
/// Calling it more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn setup_logging() {
    let log_mode = env_or_default("LOG_MODE", DEFAULT_LOG_MODE);
    let log_level = env_or_default("LOG_LEVEL", DEFAULT_LOG_LEVEL);
    let log_format = env_or_default("LOG_FORMAT", DEFAULT_LOG_FORMAT);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.as_str()));

    let builder = fmt().with_env_filter(filter).with_target(true);

    let init_result = if log_mode == "file" {
        let base_dir = env::var("LOG_DATA_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
        let date_str = Utc::now().format("%Y-%m-%d").to_string();
        let path = compute_rolled_file_path(&base_dir, LOG_FILE_NAME, &date_str);

        let file = match open_log_file(&path) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("Unable to open log file {}: {}", path.display(), e);
                return;
            }
        };
        let builder = builder.with_ansi(false).with_writer(Mutex::new(file));
        match log_format.as_str() {
            "json" => builder.json().try_init(),
            "pretty" => builder.pretty().try_init(),
            _ => builder.compact().try_init(),
        }
    } else {
        match log_format.as_str() {
            "json" => builder.json().try_init(),
            "pretty" => builder.pretty().try_init(),
            _ => builder.compact().try_init(),
        }
    };

    match init_result {
        Ok(()) => info!(
            mode = %log_mode,
            level = %log_level,
            format = %log_format,
            "logging is successfully configured"
        ),
        Err(e) => warn!(error = %e, "logging was already configured"),
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}
