//! Fixed filesystem locations.
//!
//! The daemon runs under a user session with `input` group access, so it
//! reads raw devices from `/dev/input` and logs to a well-known file in
//! `/tmp` that survives only until reboot.

use std::path::PathBuf;

/// Directory holding the kernel's `event*` device nodes.
pub fn input_dir() -> PathBuf {
    PathBuf::from("/dev/input")
}

/// Log file written alongside stdout.
pub fn log_path() -> PathBuf {
    PathBuf::from("/tmp/mouse_remap.log")
}
