//! Scripted devices for unit tests.
//!
//! A `MockSource` replays a list of steps: events, a read failure, or a gate
//! that blocks until the test releases it. Once the script runs out the
//! stream stays pending forever, like an idle mouse.

use std::collections::{BTreeSet, VecDeque};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Notify;

use super::{
    ButtonEvent, DeviceEnumerator, DeviceHandle, DeviceInfo, EventSource, EventStream, KeyState,
    ProbeError,
};

#[derive(Debug, Clone)]
pub enum Step {
    Event(ButtonEvent),
    /// The next read fails, as when a device is unplugged.
    Fail,
    /// Block until the `Notify` is signalled.
    Gate(Arc<Notify>),
}

pub fn press(code: u16) -> Step {
    Step::Event(ButtonEvent::key(code, KeyState::Down))
}

pub fn release(code: u16) -> Step {
    Step::Event(ButtonEvent::key(code, KeyState::Up))
}

pub fn repeat(code: u16) -> Step {
    Step::Event(ButtonEvent::key(code, KeyState::Repeat))
}

pub struct MockSource {
    steps: VecDeque<Step>,
    fail_open: bool,
}

impl MockSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            fail_open: false,
        }
    }

    pub fn failing_open() -> Self {
        Self {
            steps: VecDeque::new(),
            fail_open: true,
        }
    }
}

impl EventSource for MockSource {
    type Stream = MockStream;

    fn open(self) -> io::Result<MockStream> {
        if self.fail_open {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "mock open failure"));
        }
        Ok(MockStream { steps: self.steps })
    }
}

pub struct MockStream {
    steps: VecDeque<Step>,
}

impl EventStream for MockStream {
    async fn next_event(&mut self) -> io::Result<ButtonEvent> {
        loop {
            match self.steps.pop_front() {
                Some(Step::Event(event)) => return Ok(event),
                Some(Step::Fail) => {
                    return Err(io::Error::new(io::ErrorKind::NotConnected, "mock device removed"))
                }
                Some(Step::Gate(gate)) => gate.notified().await,
                None => std::future::pending::<()>().await,
            }
        }
    }
}

pub fn info(path: &str, name: &str, keys: &[u16]) -> DeviceInfo {
    DeviceInfo {
        path: PathBuf::from(path),
        name: name.to_string(),
        keys: keys.iter().copied().collect::<BTreeSet<_>>(),
    }
}

/// A fixed set of candidate devices. Every `probe` call hands out fresh
/// sources built from the same scripts.
#[derive(Default)]
pub struct MockEnumerator {
    devices: Vec<MockDevice>,
}

struct MockDevice {
    info: DeviceInfo,
    steps: Vec<Step>,
    unreadable: bool,
}

impl MockEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, info: DeviceInfo, steps: Vec<Step>) -> Self {
        self.devices.push(MockDevice {
            info,
            steps,
            unreadable: false,
        });
        self
    }

    /// A candidate whose capabilities cannot be read.
    pub fn with_unreadable(mut self, path: &str) -> Self {
        self.devices.push(MockDevice {
            info: info(path, "", &[]),
            steps: Vec::new(),
            unreadable: true,
        });
        self
    }
}

impl DeviceEnumerator for MockEnumerator {
    type Source = MockSource;

    fn probe(&self) -> Vec<Result<DeviceHandle<MockSource>, ProbeError>> {
        self.devices
            .iter()
            .map(|device| {
                if device.unreadable {
                    return Err(ProbeError::Open {
                        path: device.info.path.clone(),
                        source: io::Error::new(io::ErrorKind::PermissionDenied, "mock"),
                    });
                }
                Ok(DeviceHandle {
                    info: device.info.clone(),
                    source: MockSource::new(device.steps.clone()),
                })
            })
            .collect()
    }
}
