//! Synthetic key presses through an external injection tool.
//!
//! On Wayland there is no portable way for a client to synthesize input, so
//! the shortcut is handed to `ydotool`, which writes to `/dev/uinput` via its
//! `ydotoold` daemon. The tool runs once per button press:
//! `ydotool key <args...>`.

#[cfg(test)]
pub mod mock;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::device::DeviceInfo;
use crate::mapping::{KeyCombo, Mapping};

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {}: {stderr}", status_text(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn status_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (killed by signal)".to_string(),
    }
}

/// Something that can emit a key combo system-wide.
pub trait KeyInjector: Send + Sync + 'static {
    fn inject(&self, combo: &KeyCombo) -> impl Future<Output = Result<(), InjectError>> + Send;
}

/// Runs `<program> key <args...>` and waits for it to exit.
#[derive(Debug, Clone)]
pub struct Ydotool {
    program: String,
}

impl Ydotool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl KeyInjector for Ydotool {
    async fn inject(&self, combo: &KeyCombo) -> Result<(), InjectError> {
        let args = combo.tool_args();
        debug!(program = %self.program, ?args, "Running key injection");

        let output = Command::new(&self.program)
            .arg("key")
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| InjectError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(InjectError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!(output = %stdout.trim(), "Injection tool output");
        }
        Ok(())
    }
}

/// Fire the shortcut mapped to a button press.
///
/// Failures are logged and swallowed: a broken injection tool must not stop
/// the listener that called this.
pub async fn dispatch<I: KeyInjector>(injector: &I, device: &DeviceInfo, mapping: &Mapping) {
    info!(
        "{} button pressed on {} -> {}",
        capitalize(&mapping.button.to_string()),
        device.name,
        mapping.action
    );

    match injector.inject(&mapping.combo).await {
        Ok(()) => debug!(combo = %mapping.combo, "Shortcut sent"),
        Err(e) => error!("Error running key injection for {}: {}", mapping.action, e),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// What startup learned about the injection tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    /// Absolute path of the tool, if it is on `PATH`.
    pub resolved: Option<PathBuf>,
    /// Whether `ydotoold` is running; `None` when the tool is not ydotool
    /// or the check itself could not run.
    pub daemon_running: Option<bool>,
}

/// Check that the injection tool can plausibly work. Only warns: the tool
/// may be installed or its daemon started after we come up.
pub fn preflight(program: &str) -> ToolStatus {
    let resolved = which::which(program).ok();
    match &resolved {
        Some(path) => info!(tool = %path.display(), "Key injection tool found"),
        None => warn!(
            "{} not found on PATH; button presses will fail until it is installed",
            program
        ),
    }

    let daemon_running = if is_ydotool(program) {
        ydotoold_running()
    } else {
        None
    };
    if daemon_running == Some(false) {
        warn!("ydotoold does not appear to be running; ydotool needs it to send keys");
    }

    ToolStatus {
        resolved,
        daemon_running,
    }
}

fn is_ydotool(program: &str) -> bool {
    Path::new(program)
        .file_name()
        .map(|name| name == "ydotool")
        .unwrap_or(false)
}

fn ydotoold_running() -> Option<bool> {
    match StdCommand::new("pgrep")
        .args(["-x", "ydotoold"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => Some(status.success()),
        Err(e) => {
            debug!("Could not run pgrep: {}", e);
            None
        }
    }
}
