//! Keystroke emission
//!
//! The engine only ever talks to a [`KeySink`]. [`LogSink`] is the dry-run
//! backend, [`UinputSink`] types into the system through a Linux virtual
//! keyboard, and [`RecordingSink`] keeps every stroke in memory.

#[cfg(target_os = "linux")]
pub mod uinput;

#[cfg(target_os = "linux")]
pub use uinput::UinputSink;

use crate::mapping::keycode::KeyCode;
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Output device could not be created: {0}")]
    InitializationError(String),

    #[error("Failed to emit key event: {0}")]
    EmitError(String),
}

/// Keystroke primitive consumed by the dispatcher.
///
/// Implementations are shared across every action task, so both methods take
/// `&self`.
pub trait KeySink: Send + Sync + 'static {
    fn key_down(&self, key: KeyCode) -> Result<(), SinkError>;

    fn key_up(&self, key: KeyCode) -> Result<(), SinkError>;

    fn name(&self) -> &str;
}

/// Logs keys instead of typing them
#[derive(Debug, Default)]
pub struct LogSink;

impl KeySink for LogSink {
    fn key_down(&self, key: KeyCode) -> Result<(), SinkError> {
        info!("Key down: {:?}", key);
        Ok(())
    }

    fn key_up(&self, key: KeyCode) -> Result<(), SinkError> {
        info!("Key up: {:?}", key);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyStroke {
    Down(KeyCode),
    Up(KeyCode),
}

/// Collects strokes in emission order
#[derive(Debug, Default)]
pub struct RecordingSink {
    strokes: Mutex<Vec<KeyStroke>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> Vec<KeyStroke> {
        match self.strokes.lock() {
            Ok(strokes) => strokes.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Keys pressed, in order, ignoring releases
    pub fn pressed(&self) -> Vec<KeyCode> {
        self.strokes()
            .into_iter()
            .filter_map(|stroke| match stroke {
                KeyStroke::Down(key) => Some(key),
                KeyStroke::Up(_) => None,
            })
            .collect()
    }

    pub fn count_down(&self, key: KeyCode) -> usize {
        self.pressed().into_iter().filter(|k| *k == key).count()
    }

    fn record(&self, stroke: KeyStroke) {
        match self.strokes.lock() {
            Ok(mut strokes) => strokes.push(stroke),
            Err(poisoned) => poisoned.into_inner().push(stroke),
        }
    }
}

impl KeySink for RecordingSink {
    fn key_down(&self, key: KeyCode) -> Result<(), SinkError> {
        self.record(KeyStroke::Down(key));
        Ok(())
    }

    fn key_up(&self, key: KeyCode) -> Result<(), SinkError> {
        self.record(KeyStroke::Up(key));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
