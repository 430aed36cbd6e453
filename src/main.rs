//! mouse-remap daemon entry point.
//!
//! Exit status: 0 after SIGINT/SIGTERM, 1 when no device exposes a mapped
//! button (or logging cannot start).

use std::process::ExitCode;

use tracing::info;

use mouse_remap::config::Config;
use mouse_remap::device::linux::EvdevEnumerator;
use mouse_remap::injector::{preflight, Ydotool};
use mouse_remap::logger;
use mouse_remap::supervisor::{self, shutdown_signal};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::default();

    if let Err(e) = logger::init(&config.log_path) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    let table = config.mapping();
    info!(
        profile = ?config.profile,
        version = table.version(),
        buttons = table.entries().len(),
        "mouse-remap starting"
    );

    preflight(&config.tool);

    let enumerator = EvdevEnumerator::new(&config.input_dir);
    let outcome = supervisor::run(
        &enumerator,
        table,
        Ydotool::new(config.tool.clone()),
        config.shutdown_grace,
        shutdown_signal(),
    )
    .await;

    info!(?outcome, "mouse-remap stopped");
    outcome.exit_code()
}
