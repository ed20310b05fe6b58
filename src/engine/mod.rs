//! Engine subsystem: the poll loop and action dispatch
//!
//! # Architecture
//!
//! ```text
//! PadPoller ──► Classifier ──► live set ──► resolve ──► ActionDispatcher ──► KeySink
//!     ▲                           │                          │
//!  interval                 PadStatus (watch)          one task per action
//! ```
//!
//! Everything the dispatcher needs lives in one [`EngineContext`]; there is
//! no global state.

pub mod dispatcher;
pub mod gate;
pub mod runner;

pub use dispatcher::ActionDispatcher;
pub use gate::EnableGate;
pub use runner::{EngineHandle, InputEngine, InputEngineState};

use crate::controller::mode::Mode;
use crate::controller::pad_event::Direction;
use crate::mapping::table::BindingTable;
use crate::output::KeySink;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30;
pub const DEFAULT_LONG_PRESS_DELAY_MS: u64 = 700;
pub const DEFAULT_REPEAT_INTERVAL_MS: u64 = 100;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine could not be initialized: {0}")]
    InitializationError(String),

    #[error("Engine task failed: {0}")]
    TaskError(String),
}

/// Long-press timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepeatTiming {
    /// From the first tap to the first repeat
    pub initial_delay: Duration,
    pub interval: Duration,
}

impl Default for RepeatTiming {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(DEFAULT_LONG_PRESS_DELAY_MS),
            interval: Duration::from_millis(DEFAULT_REPEAT_INTERVAL_MS),
        }
    }
}

/// What the overlay shows: current mode page and stick direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PadStatus {
    pub mode: Mode,
    pub direction: Direction,
}

impl fmt::Display for PadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.mode, self.direction.label())
    }
}

/// Shared state handed to the dispatcher and every action task
#[derive(Clone)]
pub struct EngineContext {
    pub table: Arc<BindingTable>,
    pub gate: EnableGate,
    pub sink: Arc<dyn KeySink>,
    pub timing: RepeatTiming,
}

impl EngineContext {
    pub fn new(table: BindingTable, sink: Arc<dyn KeySink>) -> Self {
        Self {
            table: Arc::new(table),
            gate: EnableGate::default(),
            sink,
            timing: RepeatTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: RepeatTiming) -> Self {
        self.timing = timing;
        self
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("bindings", &self.table.len())
            .field("enabled", &self.gate.is_enabled())
            .field("sink", &self.sink.name())
            .field("timing", &self.timing)
            .finish()
    }
}
