//! Process supervisor.
//!
//! Runs discovery once, spawns one listener task per device into a
//! registry, then blocks on the shutdown signal. On shutdown every listener
//! is told to stop through a `watch` channel and joined, with a grace period
//! for listeners stuck waiting on the injection tool.
//!
//! Whole-program states: Starting -> Discovering -> (Failed | Running) ->
//! ShuttingDown -> Terminated.

use std::fmt;
use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::device::discovery::discover;
use crate::device::{DeviceEnumerator, DeviceInfo};
use crate::injector::KeyInjector;
use crate::listener::{listen, ListenerExit};
use crate::mapping::MappingTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Starting,
    Discovering,
    /// Nothing to monitor; the process exits with status 1.
    Failed,
    Running,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Discovering => write!(f, "discovering"),
            Self::Failed => write!(f, "failed"),
            Self::Running => write!(f, "running"),
            Self::ShuttingDown => write!(f, "shutting_down"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SupervisorError {
    #[error("No devices found match the required button capabilities.")]
    NoDevices,
}

/// A spawned listener and the device it owns.
struct ListenerTask {
    device: DeviceInfo,
    task: JoinHandle<ListenerExit>,
}

/// How a stopped listener ended, as seen from the supervisor.
#[derive(Debug)]
pub enum ListenerReport {
    Exited(ListenerExit),
    /// Did not stop within the grace period and was aborted.
    Aborted,
    /// The task panicked.
    Panicked,
}

pub struct Supervisor<I> {
    table: Arc<MappingTable>,
    injector: Arc<I>,
    shutdown_tx: watch::Sender<bool>,
    listeners: Vec<ListenerTask>,
    state: SupervisorState,
}

impl<I: KeyInjector> Supervisor<I> {
    pub fn new(table: MappingTable, injector: I) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            table: Arc::new(table),
            injector: Arc::new(injector),
            shutdown_tx,
            listeners: Vec::new(),
            state: SupervisorState::Starting,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    fn transition(&mut self, next: SupervisorState) {
        info!(from = %self.state, to = %next, "Supervisor state change");
        self.state = next;
    }

    /// Discover devices and spawn a listener for each. Must be called from
    /// inside a tokio runtime.
    pub fn start<E>(&mut self, enumerator: &E) -> Result<usize, SupervisorError>
    where
        E: DeviceEnumerator,
    {
        self.transition(SupervisorState::Discovering);
        let devices = discover(enumerator, &self.table);

        if devices.is_empty() {
            self.transition(SupervisorState::Failed);
            error!("{}", SupervisorError::NoDevices);
            error!("Make sure you're in the 'input' group: sudo usermod -aG input $USER, then log out and back in.");
            return Err(SupervisorError::NoDevices);
        }

        for device in devices {
            let info = device.info.clone();
            let task = tokio::spawn(listen(
                device,
                Arc::clone(&self.table),
                Arc::clone(&self.injector),
                self.shutdown_tx.subscribe(),
            ));
            self.listeners.push(ListenerTask { device: info, task });
        }

        self.transition(SupervisorState::Running);
        info!("Monitoring {} device(s).", self.listeners.len());
        Ok(self.listeners.len())
    }

    /// Listeners whose task has not finished yet.
    pub fn active_listeners(&self) -> usize {
        self.listeners
            .iter()
            .filter(|l| !l.task.is_finished())
            .count()
    }

    /// Tell every listener to stop and wait up to `grace` for each one.
    pub async fn shutdown(mut self, grace: Duration) -> Vec<(DeviceInfo, ListenerReport)> {
        self.transition(SupervisorState::ShuttingDown);
        self.shutdown_tx.send_replace(true);

        let mut reports = Vec::with_capacity(self.listeners.len());
        for ListenerTask { device, mut task } in std::mem::take(&mut self.listeners) {
            let report = match tokio::time::timeout(grace, &mut task).await {
                Ok(Ok(exit)) => ListenerReport::Exited(exit),
                Ok(Err(e)) => {
                    error!(device = %device.path.display(), "Listener task panicked: {}", e);
                    ListenerReport::Panicked
                }
                Err(_) => {
                    warn!(device = %device.path.display(), "Listener did not stop in time, aborting");
                    task.abort();
                    ListenerReport::Aborted
                }
            };
            reports.push((device, report));
        }

        self.transition(SupervisorState::Terminated);
        reports
    }
}

/// How the process run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Interrupted after monitoring started.
    Shutdown,
    /// Discovery found nothing to monitor.
    NoDevices,
}

impl RunOutcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Shutdown => ExitCode::SUCCESS,
            Self::NoDevices => ExitCode::from(1),
        }
    }
}

/// Discover, listen until `signal` resolves, then stop every listener.
pub async fn run<E, I, F>(
    enumerator: &E,
    table: MappingTable,
    injector: I,
    grace: Duration,
    signal: F,
) -> RunOutcome
where
    E: DeviceEnumerator,
    I: KeyInjector,
    F: Future<Output = ()>,
{
    let mut supervisor = Supervisor::new(table, injector);
    if supervisor.start(enumerator).is_err() {
        return RunOutcome::NoDevices;
    }

    signal.await;
    info!("Shutting down...");
    supervisor.shutdown(grace).await;
    RunOutcome::Shutdown
}

/// Resolves on the first SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = interrupt => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
