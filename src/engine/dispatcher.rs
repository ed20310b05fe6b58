//! Action dispatch
//!
//! Presses are resolved against the table and run on their own tasks, so a
//! repeating key never stalls the poll loop. Releases are coarse: any button
//! going to zero cancels every running long-press, whichever binding started
//! it. The toggle binding is only reachable through a release of the toggle
//! button and works while input is disabled.

use crate::controller::classifier::{pov_from_value, Classification, SymbolicInputSet};
use crate::controller::pad_event::{PadButton, PadEvent, STICK_PRESS_INDEX, TOGGLE_INDEX};
use crate::controller::poller::{Component, Transition};
use crate::engine::EngineContext;
use crate::mapping::binding::{Action, Binding};
use crate::mapping::keycode::KeyCode;
use crate::mapping::matcher::resolve;
use crate::output::KeySink;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct ActionDispatcher {
    context: EngineContext,
    long_presses: Vec<CancellationToken>,
}

impl ActionDispatcher {
    pub fn new(context: EngineContext) -> Self {
        Self {
            context,
            long_presses: Vec::new(),
        }
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Long-press tasks started since the last release
    pub fn active_long_presses(&self) -> usize {
        self.long_presses
            .iter()
            .filter(|token| !token.is_cancelled())
            .count()
    }

    /// Handles one drained transition against the current tick's classification.
    ///
    /// Returns the spawned action task, if the transition started one.
    pub fn handle(
        &mut self,
        transition: &Transition,
        classification: &Classification,
    ) -> Option<JoinHandle<()>> {
        if transition.is_release() {
            self.on_release(transition.component);
            return None;
        }

        let pressed = match pressed_token(transition) {
            Some(token) => token,
            None => {
                debug!("Transition {:?} carries no token", transition.component);
                return None;
            }
        };
        self.on_press(pressed, classification)
    }

    /// Resolves `modifiers + direction + pressed` and runs the match
    pub fn on_press(
        &mut self,
        pressed: PadEvent,
        classification: &Classification,
    ) -> Option<JoinHandle<()>> {
        if !self.context.gate.is_enabled() {
            debug!("Input disabled, ignoring {}", pressed);
            return None;
        }

        let live = classification.live_set(pressed);
        let binding = resolve(&self.context.table, &live)?.clone();
        self.dispatch(binding)
    }

    /// Cancels every long-press, then flips the gate if this was the toggle button
    pub fn on_release(&mut self, component: Component) {
        self.cancel_long_presses();

        if component != Component::Button(TOGGLE_INDEX) {
            return;
        }

        let mut toggle_set = SymbolicInputSet::new();
        toggle_set.insert(PadButton::RightStickPress);
        match resolve(&self.context.table, &toggle_set).map(|binding| &binding.action) {
            Some(Action::Toggle) => {
                self.context.gate.toggle();
            }
            Some(action) => debug!("Toggle button bound to {:?}, not a toggle", action),
            None => debug!("No toggle binding"),
        }
    }

    pub fn cancel_long_presses(&mut self) {
        if !self.long_presses.is_empty() {
            debug!("Cancelling {} long-press tasks", self.long_presses.len());
        }
        for token in self.long_presses.drain(..) {
            token.cancel();
        }
    }

    fn dispatch(&mut self, binding: Binding) -> Option<JoinHandle<()>> {
        let keys = match binding.action {
            Action::KeySequence(keys) => keys,
            Action::Toggle => {
                debug!("Toggle '{}' only fires on release", binding.display_name);
                return None;
            }
        };

        let sink = Arc::clone(&self.context.sink);
        if !binding.is_long_press {
            info!("Tap: {}", binding.display_name);
            return Some(tokio::spawn(async move {
                tap(sink.as_ref(), &keys);
            }));
        }

        info!("Long press: {}", binding.display_name);
        let token = CancellationToken::new();
        self.long_presses.push(token.clone());

        let gate = self.context.gate.clone();
        let timing = self.context.timing;
        let name = binding.display_name;
        Some(tokio::spawn(async move {
            tap(sink.as_ref(), &keys);

            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = sleep(timing.initial_delay) => {}
            }

            let mut repeats = 0u32;
            loop {
                if !gate.is_enabled() {
                    debug!("Input disabled, stopping repeat of {}", name);
                    break;
                }
                tap(sink.as_ref(), &keys);
                repeats += 1;

                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = sleep(timing.interval) => {}
                }
            }
            debug!("{} repeated {} times", name, repeats);
        }))
    }
}

/// Token a non-release transition adds to the live set
fn pressed_token(transition: &Transition) -> Option<PadEvent> {
    match transition.component {
        // Stick press only changes the direction
        Component::Button(STICK_PRESS_INDEX) => None,
        Component::Button(index) => PadButton::from_index(index).map(PadEvent::from),
        Component::Pov => pov_from_value(transition.level).map(PadEvent::from),
    }
}

/// Every key down in order, then every key up in order
pub fn tap(sink: &dyn KeySink, keys: &[KeyCode]) {
    for key in keys {
        if let Err(e) = sink.key_down(*key) {
            warn!("Key down failed on {}: {}", sink.name(), e);
        }
    }
    for key in keys {
        if let Err(e) = sink.key_up(*key) {
            warn!("Key up failed on {}: {}", sink.name(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::classifier::classify;
    use crate::controller::pad_event::Direction;
    use crate::mapping::table::BindingTable;
    use crate::output::{KeyStroke, RecordingSink};
    use std::collections::BTreeSet;
    use std::time::Duration;

    const BACK_INDEX: u8 = 7;
    const Y_INDEX: u8 = 3;
    const LB_INDEX: u8 = 4;

    fn setup() -> (ActionDispatcher, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let table = BindingTable::standard().unwrap();
        let context = EngineContext::new(table, sink.clone());
        (ActionDispatcher::new(context), sink)
    }

    fn centered(held: &[u8]) -> Classification {
        let levels: BTreeSet<u8> = held.iter().copied().collect();
        classify(0.0, 0.0, &levels, None)
    }

    #[test]
    fn tap_presses_all_then_releases_all() {
        let sink = RecordingSink::new();
        tap(&sink, &[KeyCode::Shift, KeyCode::Digit1]);
        assert_eq!(
            sink.strokes(),
            vec![
                KeyStroke::Down(KeyCode::Shift),
                KeyStroke::Down(KeyCode::Digit1),
                KeyStroke::Up(KeyCode::Shift),
                KeyStroke::Up(KeyCode::Digit1),
            ]
        );
    }

    #[tokio::test]
    async fn plain_up_y_types_ka() {
        let (mut dispatcher, sink) = setup();
        let levels: BTreeSet<u8> = [Y_INDEX].into_iter().collect();
        let classification = classify(0.0, 1.0, &levels, None);
        assert_eq!(classification.direction, Direction::Up);

        let handle = dispatcher
            .handle(&Transition::button(Y_INDEX, 1.0), &classification)
            .unwrap();
        handle.await.unwrap();
        assert_eq!(sink.pressed(), vec![KeyCode::K, KeyCode::A]);
    }

    #[tokio::test]
    async fn unmatched_press_is_silent() {
        let (mut dispatcher, sink) = setup();
        // Bumper alone never completes a binding
        let handle = dispatcher.handle(&Transition::button(LB_INDEX, 1.0), &centered(&[LB_INDEX]));
        assert!(handle.is_none());
        assert!(dispatcher.handle(&Transition::button(STICK_PRESS_INDEX, 1.0), &centered(&[])).is_none());
        assert!(sink.strokes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn short_hold_gives_single_tap() {
        let (mut dispatcher, sink) = setup();
        let handle = dispatcher
            .handle(&Transition::button(BACK_INDEX, 1.0), &centered(&[BACK_INDEX]))
            .unwrap();
        assert_eq!(dispatcher.active_long_presses(), 1);

        sleep(Duration::from_millis(650)).await;
        dispatcher.handle(&Transition::button(BACK_INDEX, 0.0), &centered(&[]));
        handle.await.unwrap();

        assert_eq!(sink.count_down(KeyCode::Backspace), 1);
        assert_eq!(dispatcher.active_long_presses(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn long_hold_repeats_every_interval() {
        let (mut dispatcher, sink) = setup();
        let handle = dispatcher
            .handle(&Transition::button(BACK_INDEX, 1.0), &centered(&[BACK_INDEX]))
            .unwrap();

        // Repeats at 700, 800 and 900 ms
        sleep(Duration::from_millis(950)).await;
        dispatcher.handle(&Transition::button(BACK_INDEX, 0.0), &centered(&[]));
        handle.await.unwrap();

        assert_eq!(sink.count_down(KeyCode::Backspace), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn release_on_a_repeat_instant_counts_that_repeat() {
        for (held_ms, taps) in [(700, 1), (800, 2), (900, 3)] {
            let (mut dispatcher, sink) = setup();
            let handle = dispatcher
                .handle(&Transition::button(BACK_INDEX, 1.0), &centered(&[BACK_INDEX]))
                .unwrap();

            sleep(Duration::from_millis(held_ms)).await;
            dispatcher.handle(&Transition::button(BACK_INDEX, 0.0), &centered(&[]));
            handle.await.unwrap();

            assert_eq!(
                sink.count_down(KeyCode::Backspace),
                taps,
                "held for {}ms",
                held_ms
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn release_of_any_button_stops_repeat() {
        let (mut dispatcher, sink) = setup();
        let handle = dispatcher
            .handle(&Transition::button(BACK_INDEX, 1.0), &centered(&[BACK_INDEX]))
            .unwrap();

        sleep(Duration::from_millis(750)).await;
        // Y goes up while Back is still held
        dispatcher.handle(&Transition::button(Y_INDEX, 0.0), &centered(&[BACK_INDEX]));
        handle.await.unwrap();

        assert_eq!(sink.count_down(KeyCode::Backspace), 2);
    }

    #[tokio::test]
    async fn toggle_release_flips_once_and_gates_presses() {
        let (mut dispatcher, sink) = setup();
        let gate = dispatcher.context().gate.clone();

        // Press of the toggle button does nothing on its own
        assert!(dispatcher
            .handle(&Transition::button(TOGGLE_INDEX, 1.0), &centered(&[TOGGLE_INDEX, LB_INDEX]))
            .is_none());
        assert!(gate.is_enabled());

        dispatcher.handle(&Transition::button(TOGGLE_INDEX, 0.0), &centered(&[LB_INDEX]));
        assert!(!gate.is_enabled());

        assert!(dispatcher
            .handle(&Transition::button(Y_INDEX, 1.0), &centered(&[Y_INDEX]))
            .is_none());
        assert!(sink.strokes().is_empty());

        // Still reachable while disabled
        dispatcher.handle(&Transition::button(TOGGLE_INDEX, 0.0), &centered(&[]));
        assert!(gate.is_enabled());

        dispatcher
            .handle(&Transition::button(Y_INDEX, 1.0), &centered(&[Y_INDEX]))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(sink.pressed(), vec![KeyCode::A]);
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_stops_a_running_repeat() {
        let (mut dispatcher, sink) = setup();
        let gate = dispatcher.context().gate.clone();
        let handle = dispatcher
            .handle(&Transition::pov(0.25), &centered(&[]))
            .unwrap();

        sleep(Duration::from_millis(650)).await;
        gate.toggle();
        handle.await.unwrap();

        assert_eq!(sink.count_down(KeyCode::ArrowUp), 1);
    }

    #[tokio::test]
    async fn diagonal_hat_press_is_ignored() {
        let (mut dispatcher, sink) = setup();
        assert!(dispatcher.handle(&Transition::pov(0.375), &centered(&[])).is_none());
        assert!(sink.strokes().is_empty());
    }
}
