//! Input engine with statum state machine for the poll loop
//!
//! # State Machine
//!
//! ```text
//! Configured ──► Running ──► Stopped
//!                   │
//!            (tick every poll interval
//!             until shutdown)
//! ```
//!
//! One tick polls the pad, classifies the snapshot, publishes the status and
//! hands every drained transition to the dispatcher. Ticks never await, so a
//! tick always completes before the next one starts.

use crate::controller::classifier::Classifier;
use crate::controller::poller::PadPoller;
use crate::engine::dispatcher::ActionDispatcher;
use crate::engine::{EngineContext, EngineError, PadStatus};
use crate::mapping::table::BindingTable;
use statum::{machine, state};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

#[state]
#[derive(Debug, Clone)]
pub enum InputEngineState {
    Configured, // Wired up, not polling yet
    Running,    // Ticking on the poll interval
    Stopped,    // Loop left, long-presses cancelled
}

#[machine]
pub struct InputEngine<S: InputEngineState> {
    poller: PadPoller,
    classifier: Classifier,
    dispatcher: ActionDispatcher,
    poll_interval: Duration,
    status: watch::Sender<PadStatus>,
    ticks: u64,
}

impl<S: InputEngineState> InputEngine<S> {
    pub fn context(&self) -> &EngineContext {
        self.dispatcher.context()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<PadStatus> {
        self.status.subscribe()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl InputEngine<Configured> {
    pub fn create(
        poller: PadPoller,
        classifier: Classifier,
        context: EngineContext,
        poll_interval: Duration,
    ) -> Result<Self, EngineError> {
        if poll_interval.is_zero() {
            return Err(EngineError::InitializationError(
                "Poll interval must be greater than zero".to_string(),
            ));
        }

        info!(
            "Configuring input engine: source {}, {} bindings, {}ms poll interval, deadzone {}",
            poller.source_name(),
            context.table.len(),
            poll_interval.as_millis(),
            classifier.deadzone()
        );
        let (status, _) = watch::channel(PadStatus::default());

        Ok(Self::new(
            poller,
            classifier,
            ActionDispatcher::new(context),
            poll_interval,
            status,
            0, // ticks
        ))
    }

    pub fn start(self) -> InputEngine<Running> {
        info!("Starting input engine");
        self.transition()
    }
}

impl InputEngine<Running> {
    /// Runs one poll cycle and returns the action tasks it spawned
    pub fn tick(&mut self) -> Vec<JoinHandle<()>> {
        self.ticks += 1;
        let poll = self.poller.poll();
        let snapshot = &poll.snapshot;

        let classification = self.classifier.classify(
            snapshot.axis_x,
            snapshot.axis_y,
            &snapshot.button_levels,
            snapshot.pov_value,
        );

        let status = PadStatus {
            mode: classification.mode(),
            direction: classification.direction,
        };
        let changed = self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
        if changed {
            debug!("Status changed: {}", status);
        }

        poll.transitions
            .iter()
            .filter_map(|transition| {
                debug!(
                    "Transition {:?} -> {} at {}",
                    transition.component,
                    transition.level,
                    transition.timestamp.format("%H:%M:%S%.3f")
                );
                self.dispatcher.handle(transition, &classification)
            })
            .collect()
    }

    /// Ticks on the poll interval until the shutdown signal arrives
    pub async fn run_until_shutdown(
        mut self,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> InputEngine<Stopped> {
        info!("Starting poll loop every {:?}", self.poll_interval);
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received for input engine");
                    break;
                }

                _ = ticker.tick() => {
                    // Action tasks run detached
                    let _ = self.tick();
                }
            }
        }

        self.stop()
    }

    pub fn stop(mut self) -> InputEngine<Stopped> {
        self.dispatcher.cancel_long_presses();
        info!("Input engine stopped after {} ticks", self.ticks);
        self.transition()
    }
}

impl InputEngine<Stopped> {}

/// Handle for an input engine running in a tokio task
///
/// Exposes what an overlay needs: status changes, the enable state and the
/// table for cheat-sheet listings.
#[derive(Debug)]
pub struct EngineHandle {
    status: watch::Receiver<PadStatus>,
    enabled: watch::Receiver<bool>,
    table: Arc<BindingTable>,
    task_handle: Option<JoinHandle<u64>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl EngineHandle {
    pub fn spawn(engine: InputEngine<Configured>) -> Self {
        let status = engine.subscribe_status();
        let enabled = engine.context().gate.subscribe();
        let table = Arc::clone(&engine.context().table);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let running = engine.start();
        let task_handle = tokio::spawn(async move {
            let stopped = running.run_until_shutdown(shutdown_rx).await;
            stopped.ticks()
        });
        debug!("Input engine task spawned");

        Self {
            status,
            enabled,
            table,
            task_handle: Some(task_handle),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Receiver that changes only when mode or direction changes
    pub fn status(&self) -> watch::Receiver<PadStatus> {
        self.status.clone()
    }

    pub fn current_status(&self) -> PadStatus {
        *self.status.borrow()
    }

    pub fn enabled(&self) -> watch::Receiver<bool> {
        self.enabled.clone()
    }

    pub fn table(&self) -> Arc<BindingTable> {
        Arc::clone(&self.table)
    }

    /// Stops the poll loop and waits for it to finish
    pub async fn shutdown(&mut self) -> Result<u64, EngineError> {
        debug!("Sending shutdown signal to input engine");
        if let Some(tx) = self.shutdown_tx.take() {
            if tx.send(()).is_err() {
                warn!("Input engine task already terminated");
            }
        }

        match self.task_handle.take() {
            Some(handle) => match handle.await {
                Ok(ticks) => {
                    debug!("Input engine task completed");
                    Ok(ticks)
                }
                Err(e) => {
                    error!("Input engine task panicked: {}", e);
                    Err(EngineError::TaskError(format!(
                        "Input engine task panicked: {}",
                        e
                    )))
                }
            },
            None => {
                debug!("Input engine already shut down");
                Ok(0)
            }
        }
    }
}
