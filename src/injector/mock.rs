//! In-memory injector for unit tests.
//!
//! Records every combo it is asked to send, in order, and optionally
//! forwards each one over a channel so async tests can wait for dispatches
//! made by listener tasks.

use std::sync::Mutex;

use tokio::sync::mpsc;

use super::{InjectError, KeyInjector};
use crate::mapping::KeyCombo;

#[derive(Default)]
pub struct RecordingInjector {
    calls: Mutex<Vec<KeyCombo>>,
    notify: Option<mpsc::UnboundedSender<KeyCombo>>,
    /// When `true`, every call is recorded and then reported as a failure.
    pub should_fail: bool,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// An injector plus the receiving end of its call feed.
    pub fn with_channel() -> (Self, mpsc::UnboundedReceiver<KeyCombo>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let injector = Self {
            notify: Some(tx),
            ..Self::default()
        };
        (injector, rx)
    }

    pub fn calls(&self) -> Vec<KeyCombo> {
        self.calls.lock().unwrap().clone()
    }
}

impl KeyInjector for RecordingInjector {
    async fn inject(&self, combo: &KeyCombo) -> Result<(), InjectError> {
        self.calls.lock().unwrap().push(combo.clone());
        if let Some(tx) = &self.notify {
            let _ = tx.send(combo.clone());
        }
        if self.should_fail {
            return Err(InjectError::Failed {
                program: "mock".to_string(),
                code: Some(1),
                stderr: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}
