//! evdev backend.
//!
//! Reads `/dev/input/event*` directly, which works on X11 and every Wayland
//! compositor alike. Requires read access to the device nodes (membership
//! in the `input` group).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use evdev::{Device, EventType};
use tracing::debug;

use super::{
    ButtonEvent, DeviceEnumerator, DeviceHandle, DeviceInfo, EventKind, EventSource, EventStream,
    ProbeError,
};

/// Enumerates the `event*` nodes of an input directory.
#[derive(Debug, Clone)]
pub struct EvdevEnumerator {
    input_dir: PathBuf,
}

impl EvdevEnumerator {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
        }
    }

    /// Sorted `event*` paths under the input directory.
    fn event_nodes(&self) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.input_dir)? {
            let path = entry?.path();
            let is_event_node = path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with("event"))
                .unwrap_or(false);
            if is_event_node {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl DeviceEnumerator for EvdevEnumerator {
    type Source = EvdevSource;

    fn probe(&self) -> Vec<Result<DeviceHandle<EvdevSource>, ProbeError>> {
        let paths = match self.event_nodes() {
            Ok(paths) => paths,
            Err(source) => {
                return vec![Err(ProbeError::List {
                    dir: self.input_dir.clone(),
                    source,
                })]
            }
        };

        paths.into_iter().map(|path| open_device(&path)).collect()
    }
}

fn open_device(path: &Path) -> Result<DeviceHandle<EvdevSource>, ProbeError> {
    let device = Device::open(path).map_err(|source| ProbeError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let keys = device
        .supported_keys()
        .map(|keys| keys.iter().map(|key| key.code()).collect())
        .unwrap_or_default();
    let info = DeviceInfo {
        path: path.to_path_buf(),
        name: device.name().unwrap_or("Unknown").to_string(),
        keys,
    };
    debug!(device = %path.display(), name = %info.name, key_count = info.keys.len(), "Probed device");

    Ok(DeviceHandle {
        info,
        source: EvdevSource { device },
    })
}

/// An opened evdev device, not yet streaming.
pub struct EvdevSource {
    device: Device,
}

impl EventSource for EvdevSource {
    type Stream = EvdevStream;

    fn open(self) -> io::Result<EvdevStream> {
        Ok(EvdevStream {
            inner: self.device.into_event_stream()?,
        })
    }
}

/// Async event stream over an evdev device (epoll-backed via tokio).
pub struct EvdevStream {
    inner: evdev::EventStream,
}

impl EventStream for EvdevStream {
    async fn next_event(&mut self) -> io::Result<ButtonEvent> {
        let event = self.inner.next_event().await?;
        let kind = if event.event_type() == EventType::KEY {
            EventKind::Key
        } else {
            EventKind::Other
        };
        Ok(ButtonEvent {
            kind,
            code: event.code(),
            value: event.value(),
        })
    }
}
