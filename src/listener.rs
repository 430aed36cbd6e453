//! Per-device listener.
//!
//! Each discovered device gets one listener task that owns the device
//! exclusively: Opening -> ReadingLoop -> Stopped. Events from one device are
//! handled strictly in arrival order, and a dispatch finishes before the next
//! event is read. A read error ends only this listener; there is no retry or
//! re-discovery.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info};

use crate::device::{ButtonEvent, DeviceHandle, EventSource, EventStream};
use crate::injector::{dispatch, KeyInjector};
use crate::mapping::{Mapping, MappingTable};

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("read failed on {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
}

/// Why a listener stopped.
#[derive(Debug)]
pub enum ListenerExit {
    /// The supervisor asked it to stop.
    Shutdown,
    /// The device could not be opened or went away.
    Failed(ListenerError),
}

/// The mapping a single event triggers, if any: key-down of a mapped code.
pub fn action_for<'a>(table: &'a MappingTable, event: &ButtonEvent) -> Option<&'a Mapping> {
    if !event.is_key_press() {
        return None;
    }
    table.lookup(event.code)
}

/// Run one device's read loop until its stream fails or `shutdown` flips to
/// `true` (or its sender is dropped).
pub async fn listen<S, I>(
    device: DeviceHandle<S>,
    table: Arc<MappingTable>,
    injector: Arc<I>,
    mut shutdown: watch::Receiver<bool>,
) -> ListenerExit
where
    S: EventSource,
    I: KeyInjector,
{
    let DeviceHandle { info, source } = device;

    let mut stream = match source.open() {
        Ok(stream) => stream,
        Err(source) => {
            let err = ListenerError::Open {
                path: info.path.clone(),
                source,
            };
            error!("Error monitoring {}: {}", info.path.display(), err);
            return ListenerExit::Failed(err);
        }
    };
    info!("Started monitoring {} at {}", info.name, info.path.display());

    loop {
        if *shutdown.borrow() {
            return ListenerExit::Shutdown;
        }

        let next = tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return ListenerExit::Shutdown;
                }
                continue;
            }
            next = stream.next_event() => next,
        };

        match next {
            Ok(event) => {
                if let Some(mapping) = action_for(&table, &event) {
                    dispatch(injector.as_ref(), &info, mapping).await;
                }
            }
            Err(source) => {
                let err = ListenerError::Read {
                    path: info.path.clone(),
                    source,
                };
                error!("Error monitoring {}: {}", info.path.display(), err);
                return ListenerExit::Failed(err);
            }
        }
    }
}
