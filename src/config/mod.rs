//! Runtime parameters.
//!
//! Nothing is read from disk, flags or the environment: `Config::default()`
//! is the whole configuration surface. Tests build their own values.

pub mod paths;

use std::path::PathBuf;
use std::time::Duration;

use crate::mapping::{MappingProfile, MappingTable};

/// Executable used to synthesize key presses.
pub const DEFAULT_TOOL: &str = "ydotool";

/// How long shutdown waits for listener tasks before aborting them.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Config {
    pub log_path: PathBuf,
    pub input_dir: PathBuf,
    pub tool: String,
    pub profile: MappingProfile,
    pub shutdown_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: paths::log_path(),
            input_dir: paths::input_dir(),
            tool: DEFAULT_TOOL.to_string(),
            profile: MappingProfile::default(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl Config {
    /// The mapping table selected by `profile`.
    pub fn mapping(&self) -> MappingTable {
        self.profile.table()
    }
}
