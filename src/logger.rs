use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the process-wide logging system.
///
/// Sets up:
/// - File output: appends to `log_path`, never rotated.
/// - Console output (stdout): the same lines, with ANSI colors.
/// - Environment filter: defaults to `info`, configurable via `RUST_LOG`.
///
/// Both writers are shared by every listener task; the subscriber
/// serializes each event so lines never interleave.
///
/// Must be called once, before any component logs.
pub fn init(log_path: &Path) -> anyhow::Result<()> {
    let (dir, prefix, suffix) = split_log_path(log_path)?;

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(prefix);
    if let Some(suffix) = suffix {
        builder = builder.filename_suffix(suffix);
    }
    let file_appender = builder
        .build(&dir)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(false);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Logger already initialized")?;

    tracing::info!(log_file = %log_path.display(), "Logger initialized");
    Ok(())
}

/// Break `/tmp/mouse_remap.log` into the pieces the appender builder wants:
/// directory, file stem and optional extension.
fn split_log_path(path: &Path) -> anyhow::Result<(PathBuf, String, Option<String>)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Log path {} has no file name", path.display()))?;
    let suffix = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_string);
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, stem.to_string(), suffix))
}
