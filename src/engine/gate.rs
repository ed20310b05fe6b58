use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Process-wide on/off switch for dispatch.
///
/// Starts enabled. Cloning shares the same state; observers subscribe to a
/// `watch` receiver and see every flip.
#[derive(Clone, Debug)]
pub struct EnableGate {
    state: Arc<watch::Sender<bool>>,
}

impl Default for EnableGate {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EnableGate {
    pub fn new(enabled: bool) -> Self {
        let (state, _) = watch::channel(enabled);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self.state.borrow()
    }

    /// Flips the state and returns the new value
    pub fn toggle(&self) -> bool {
        let mut enabled = false;
        self.state.send_modify(|state| {
            *state = !*state;
            enabled = *state;
        });
        info!("Input {}", if enabled { "enabled" } else { "disabled" });
        enabled
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}
