//! Controller subsystem for gamepad input handling
//!
//! Implements the read side of the engine:
//!
//! 1. [`poller`] - Raw device seam and per-tick polling
//! 2. [`classifier`] - Snapshot to symbolic tokens
//! 3. [`mode`] - Bumper state to input mode
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► PadSource ──► PadPoller ──► Classifier ──► Classification
//!             (gilrs)       (levels +      (deadzone,     (direction, mode,
//!                            transitions)   sectors)       live sets)
//! ```

pub mod classifier;
pub mod gilrs_source;
pub mod mode;
pub mod pad_event;
pub mod poller;

pub use classifier::{classify, Classification, Classifier, SymbolicInputSet};
pub use mode::{resolve_mode, Mode};
pub use pad_event::{Direction, PadButton, PadEvent, Pov};
pub use poller::{
    Component, ControllerSnapshot, IdleSource, PadPoll, PadPoller, PadSource, PollError,
    Transition,
};
