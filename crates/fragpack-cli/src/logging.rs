//! Tracing subscriber set-up for the binary.

use fragpack_highs::highs_version;
use std::env;
use std::fs::{File, OpenOptions};
use std::io;
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error>;

fn open_log_file(path: &str) -> Result<Arc<File>, BoxError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Arc::new)
        .map_err(|err| format!("Failed to open log file {path}: {err}").into())
}

fn map_init_err<E: std::fmt::Display>(err: E) -> BoxError {
    format!("Failed to initialize logging: {err}").into()
}

/// Build the filter from an explicit level, else `FRAGPACK_TRACE`, else `off`.
fn build_filter(level: Option<&str>) -> Result<EnvFilter, BoxError> {
    let level_value = level
        .map(str::to_string)
        .or_else(|| env::var("FRAGPACK_TRACE").ok())
        .unwrap_or_else(|| "off".to_string());

    if level_value.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(&level_value).map_err(|err| format!("Invalid log filter: {err}").into())
    }
}

/// Install the global subscriber.
///
/// Output goes to stderr as `pretty` or `json` (`FRAGPACK_LOG_FORMAT`), and
/// is mirrored to `FRAGPACK_LOG_FILE` when set. Returns `false` if a
/// subscriber was already installed.
pub fn init(level: Option<&str>) -> Result<bool, BoxError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let filter = build_filter(level)?;
    let format = env::var("FRAGPACK_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let log_file = env::var("FRAGPACK_LOG_FILE").ok();
    let use_json = format.eq_ignore_ascii_case("json");

    if !use_json && !format.eq_ignore_ascii_case("pretty") {
        return Err("Invalid FRAGPACK_LOG_FORMAT (expected 'json' or 'pretty')".into());
    }

    if use_json {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .json();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .json();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    } else {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .pretty();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .pretty();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    }

    tracing::debug!(
        component = "cli",
        operation = "init_logging",
        status = "success",
        format = %format,
        solver_version = highs_version().as_deref().unwrap_or("unknown"),
        "Logging initialized"
    );
    Ok(true)
}
