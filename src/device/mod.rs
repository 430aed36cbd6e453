//! Input devices: what a discovered device looks like and how its event
//! stream is read.
//!
//! The evdev backend lives in [`linux`]. Everything above it (discovery
//! filtering, the listener loop) only sees the traits in this module so it
//! can be driven by scripted devices in tests.

pub mod discovery;
pub mod linux;
#[cfg(test)]
pub mod mock;

use std::collections::BTreeSet;
use std::future::Future;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Event category as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// `EV_KEY`: keys and buttons.
    Key,
    /// Anything else (`EV_SYN`, `EV_REL`, `EV_MSC`, ...).
    Other,
}

/// Key state carried in an `EV_KEY` event's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Up,
    Down,
    Repeat,
    Unknown(i32),
}

impl From<i32> for KeyState {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Up,
            1 => Self::Down,
            2 => Self::Repeat,
            other => Self::Unknown(other),
        }
    }
}

/// One event read from a device. Consumed as soon as it is received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
}

impl ButtonEvent {
    pub fn key(code: u16, state: KeyState) -> Self {
        let value = match state {
            KeyState::Up => 0,
            KeyState::Down => 1,
            KeyState::Repeat => 2,
            KeyState::Unknown(v) => v,
        };
        Self {
            kind: EventKind::Key,
            code,
            value,
        }
    }

    pub fn state(&self) -> KeyState {
        KeyState::from(self.value)
    }

    /// True only for a key-down (value 1), never for release or repeat.
    pub fn is_key_press(&self) -> bool {
        self.kind == EventKind::Key && self.state() == KeyState::Down
    }
}

/// Static facts about a device, captured at discovery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub name: String,
    /// Key codes the device reports in its `EV_KEY` capability set.
    pub keys: BTreeSet<u16>,
}

impl DeviceInfo {
    pub fn supports_any(&self, codes: impl IntoIterator<Item = u16>) -> bool {
        codes.into_iter().any(|code| self.keys.contains(&code))
    }
}

/// A device that has not been opened for streaming yet.
pub trait EventSource: Send + 'static {
    type Stream: EventStream;

    /// Start streaming. Consumes the source: a stream cannot be restarted.
    fn open(self) -> io::Result<Self::Stream>;
}

/// Infinite sequence of events, ended only by an I/O error.
pub trait EventStream: Send {
    fn next_event(&mut self) -> impl Future<Output = io::Result<ButtonEvent>> + Send;
}

/// A discovered device, owned exclusively by the listener it is handed to.
#[derive(Debug)]
pub struct DeviceHandle<S> {
    pub info: DeviceInfo,
    pub source: S,
}

/// Lists every candidate device on the system.
pub trait DeviceEnumerator {
    type Source: EventSource;

    /// One entry per candidate; a candidate that cannot be opened or
    /// inspected is an `Err` rather than a reason to stop.
    fn probe(&self) -> Vec<Result<DeviceHandle<Self::Source>, ProbeError>>;
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to list {}: {source}", .dir.display())]
    List { dir: PathBuf, source: io::Error },
    #[error("failed to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
}
