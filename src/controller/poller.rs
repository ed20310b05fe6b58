//! Controller polling seam
//!
//! [`PadSource`] is the raw device primitive the engine consumes: levels are
//! read after a `refresh`, and discrete transitions accumulate in a FIFO until
//! drained. [`PadPoller`] wraps one source and hands the engine a single
//! [`PadPoll`] per tick.

use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Errors reported by a pad source
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Failed to initialize controller backend: {0}")]
    InitializationError(String),
}

/// Component that produced a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    Button(u8),
    Pov,
}

/// One discrete level change reported by the device
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub component: Component,
    /// New level; exactly `0.0` is a release, hats report their normalized value
    pub level: f32,
    pub timestamp: DateTime<Local>,
}

impl Transition {
    pub fn new(component: Component, level: f32) -> Self {
        Self {
            component,
            level,
            timestamp: Local::now(),
        }
    }

    pub fn button(index: u8, level: f32) -> Self {
        Self::new(Component::Button(index), level)
    }

    pub fn pov(level: f32) -> Self {
        Self::new(Component::Pov, level)
    }

    pub fn is_release(&self) -> bool {
        self.level == 0.0
    }
}

/// Levels read in one tick
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControllerSnapshot {
    pub axis_x: f32,
    pub axis_y: f32,
    pub button_levels: BTreeSet<u8>,
    pub pov_value: Option<f32>,
}

/// Everything one poll tick produced
#[derive(Clone, Debug, Default)]
pub struct PadPoll {
    pub snapshot: ControllerSnapshot,
    pub transitions: Vec<Transition>,
}

/// Raw controller primitive
pub trait PadSource: Send + 'static {
    /// Pulls pending device state; levels and transitions reflect it afterwards
    fn refresh(&mut self) -> Result<(), PollError>;

    /// Left stick `(x, y)` in `[-1, 1]`, y positive up
    fn axes(&self) -> (f32, f32);

    /// Indices of buttons currently held
    fn button_levels(&self) -> BTreeSet<u8>;

    /// Normalized hat value, `None` when released
    fn pov_value(&self) -> Option<f32>;

    /// Transitions since the previous drain, oldest first
    fn drain_transitions(&mut self) -> Vec<Transition>;

    fn name(&self) -> &str;
}

/// Source used when no controller is attached; every tick is empty
#[derive(Debug, Default)]
pub struct IdleSource;

impl PadSource for IdleSource {
    fn refresh(&mut self) -> Result<(), PollError> {
        Ok(())
    }

    fn axes(&self) -> (f32, f32) {
        (0.0, 0.0)
    }

    fn button_levels(&self) -> BTreeSet<u8> {
        BTreeSet::new()
    }

    fn pov_value(&self) -> Option<f32> {
        None
    }

    fn drain_transitions(&mut self) -> Vec<Transition> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "idle"
    }
}

/// Per-tick reader over one source
pub struct PadPoller {
    source: Box<dyn PadSource>,
    failures: u32,
}

impl PadPoller {
    pub fn new(source: Box<dyn PadSource>) -> Self {
        Self {
            source,
            failures: 0,
        }
    }

    pub fn idle() -> Self {
        Self::new(Box::new(IdleSource))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Reads one tick.
    ///
    /// A failed refresh is logged and yields an empty poll; the next tick
    /// simply tries again.
    pub fn poll(&mut self) -> PadPoll {
        if let Err(e) = self.source.refresh() {
            self.failures += 1;
            warn!(
                "Polling {} failed ({} in a row): {}",
                self.source.name(),
                self.failures,
                e
            );
            return PadPoll::default();
        }
        if self.failures > 0 {
            debug!("{} recovered after {} failed polls", self.source.name(), self.failures);
            self.failures = 0;
        }

        let (axis_x, axis_y) = self.source.axes();
        let snapshot = ControllerSnapshot {
            axis_x,
            axis_y,
            button_levels: self.source.button_levels(),
            pov_value: self.source.pov_value(),
        };
        let transitions = self.source.drain_transitions();
        if !transitions.is_empty() {
            debug!("Drained {} transitions", transitions.len());
        }

        PadPoll {
            snapshot,
            transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct FlakySource {
        fail_next: bool,
        queue: VecDeque<Transition>,
    }

    impl PadSource for FlakySource {
        fn refresh(&mut self) -> Result<(), PollError> {
            if std::mem::take(&mut self.fail_next) {
                return Err(PollError::InitializationError("backend not ready".to_string()));
            }
            Ok(())
        }

        fn axes(&self) -> (f32, f32) {
            (0.0, 1.0)
        }

        fn button_levels(&self) -> BTreeSet<u8> {
            [3].into_iter().collect()
        }

        fn pov_value(&self) -> Option<f32> {
            None
        }

        fn drain_transitions(&mut self) -> Vec<Transition> {
            self.queue.drain(..).collect()
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[test]
    fn idle_poller_is_always_empty() {
        let mut poller = PadPoller::idle();
        let poll = poller.poll();
        assert_eq!(poll.snapshot, ControllerSnapshot::default());
        assert!(poll.transitions.is_empty());
    }

    #[test]
    fn failed_refresh_keeps_transitions_for_next_tick() {
        let mut poller = PadPoller::new(Box::new(FlakySource {
            fail_next: true,
            queue: VecDeque::from(vec![Transition::button(3, 1.0), Transition::button(3, 0.0)]),
        }));

        let first = poller.poll();
        assert!(first.transitions.is_empty());

        let second = poller.poll();
        assert_eq!(second.snapshot.axis_y, 1.0);
        assert_eq!(second.transitions.len(), 2);
        assert!(!second.transitions[0].is_release());
        assert!(second.transitions[1].is_release());
    }
}
