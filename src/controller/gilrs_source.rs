use crate::controller::pad_event::Pov;
use crate::controller::poller::{PadSource, PollError, Transition};
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use statum::{machine, state};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, error, info, warn};

// Hat values in eighths, clockwise from up-left, the way stick-type drivers report them
const HAT_UP_LEFT: f32 = 0.125;
const HAT_UP: f32 = 0.25;
const HAT_UP_RIGHT: f32 = 0.375;
const HAT_RIGHT: f32 = 0.50;
const HAT_DOWN_RIGHT: f32 = 0.625;
const HAT_DOWN: f32 = 0.75;
const HAT_DOWN_LEFT: f32 = 0.875;
const HAT_LEFT: f32 = 1.0;

#[state]
#[derive(Debug, Clone)]
pub enum SourceState {
    Initializing,
    Polling,
}

/// Fold of the held D-pad buttons into one hat value, `None` when centered
/// or on an impossible combination
pub fn hat_value(dpad: &BTreeSet<Pov>) -> Option<f32> {
    let has = |pov| dpad.contains(&pov);
    match (has(Pov::Up), has(Pov::Right), has(Pov::Down), has(Pov::Left)) {
        (true, false, _, true) => Some(HAT_UP_LEFT),
        (true, true, _, false) => Some(HAT_UP_RIGHT),
        (true, false, _, false) => Some(HAT_UP),
        (false, true, true, false) => Some(HAT_DOWN_RIGHT),
        (false, false, true, true) => Some(HAT_DOWN_LEFT),
        (false, false, true, false) => Some(HAT_DOWN),
        (false, true, false, false) => Some(HAT_RIGHT),
        (false, false, false, true) => Some(HAT_LEFT),
        _ => None,
    }
}

/// Levels of the active pad plus the transitions not yet drained
#[derive(Debug, Default)]
pub struct PadLevels {
    axis_x: f32,
    axis_y: f32,

    held: BTreeSet<u8>,

    // D-pad buttons currently down, folded into one hat value
    dpad: BTreeSet<Pov>,

    pending: VecDeque<Transition>,
}

impl PadLevels {
    pub fn set_axes(&mut self, x: f32, y: f32) {
        self.axis_x = x;
        self.axis_y = y;
    }

    pub fn hat_value(&self) -> Option<f32> {
        hat_value(&self.dpad)
    }

    /// Queues a hat transition only when the folded value changes
    pub fn set_dpad(&mut self, pov: Pov, down: bool) {
        let before = self.hat_value();
        if down {
            self.dpad.insert(pov);
        } else {
            self.dpad.remove(&pov);
        }
        let after = self.hat_value();
        if before != after {
            self.pending.push_back(Transition::pov(after.unwrap_or(0.0)));
        }
    }

    pub fn set_button(&mut self, index: u8, down: bool) {
        let changed = if down {
            self.held.insert(index)
        } else {
            self.held.remove(&index)
        };
        if changed {
            let transition = Transition::button(index, if down { 1.0 } else { 0.0 });
            info!(
                "Button {} {} at {}",
                index,
                if down { "pressed" } else { "released" },
                transition.timestamp.format("%H:%M:%S.%3f")
            );
            self.pending.push_back(transition);
        }
    }

    /// Releases every held input, queueing a release for each
    pub fn release_everything(&mut self) {
        let held: Vec<u8> = self.held.iter().copied().collect();
        for index in held {
            self.set_button(index, false);
        }
        let dpad: Vec<Pov> = self.dpad.iter().copied().collect();
        for pov in dpad {
            self.set_dpad(pov, false);
        }
        self.set_axes(0.0, 0.0);
    }

    pub fn drain(&mut self) -> Vec<Transition> {
        self.pending.drain(..).collect()
    }
}

/// Gamepad source backed by gilrs
#[machine]
#[derive(Debug)]
pub struct GilrsSource<S: SourceState> {
    gilrs: Gilrs,

    // Only this pad is read; others are ignored
    active_gamepad: Option<GamepadId>,

    levels: PadLevels,
}

impl GilrsSource<Initializing> {
    pub fn create() -> Result<Self, PollError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(PollError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::new(gilrs, None, PadLevels::default()))
    }

    /// Picks the first connected gamepad and starts polling.
    ///
    /// No gamepad is not an error: the source stays idle and adopts the first
    /// pad that connects later.
    pub fn initialize(mut self) -> GilrsSource<Polling> {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();

        if gamepads.is_empty() {
            warn!("No gamepad connected, continuing in idle mode");
        } else {
            info!("Found {} gamepads:", gamepads.len());
            for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
                info!(
                    "  [{}] ID: {}, Name: {}, UUID: {:?}",
                    idx,
                    id,
                    gamepad.name(),
                    gamepad.uuid()
                );
            }
            let (id, gamepad) = &gamepads[0];
            info!("Selected gamepad: {} ({})", gamepad.name(), id);
            let (x, y) = (gamepad.value(Axis::LeftStickX), gamepad.value(Axis::LeftStickY));
            let id = *id;
            drop(gamepads);
            self.levels.set_axes(x, y);
            self.active_gamepad = Some(id);
        }

        self.transition()
    }
}

impl GilrsSource<Polling> {
    fn apply_event(&mut self, event: EventType) {
        let levels = &mut self.levels;
        match event {
            EventType::AxisChanged(Axis::LeftStickX, value, _) => levels.axis_x = value,
            EventType::AxisChanged(Axis::LeftStickY, value, _) => levels.axis_y = value,
            EventType::AxisChanged(axis, _, _) => {
                debug!("Ignoring unsupported axis: {:?}", axis);
            }
            EventType::ButtonPressed(button, _) => match dpad_direction(button) {
                Some(pov) => levels.set_dpad(pov, true),
                None => match button_index(button) {
                    Some(index) => levels.set_button(index, true),
                    None => debug!("Ignoring unmapped button: {:?}", button),
                },
            },
            EventType::ButtonReleased(button, _) => match dpad_direction(button) {
                Some(pov) => levels.set_dpad(pov, false),
                None => {
                    if let Some(index) = button_index(button) {
                        levels.set_button(index, false);
                    }
                }
            },
            EventType::ButtonRepeated(button, _) => {
                debug!("Button repeat ignored: {:?}", button);
            }
            EventType::Disconnected => {
                warn!("Active controller disconnected, releasing all inputs");
                levels.release_everything();
                self.active_gamepad = None;
            }
            _ => {}
        }
    }
}

impl PadSource for GilrsSource<Polling> {
    fn refresh(&mut self) -> Result<(), PollError> {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match self.active_gamepad {
                None if matches!(event, EventType::Connected) => {
                    let gamepad = self.gilrs.gamepad(id);
                    info!("Adopting newly connected gamepad: {} ({})", gamepad.name(), id);
                    self.active_gamepad = Some(id);
                }
                Some(active_id) if active_id == id => self.apply_event(event),
                _ => debug!("Skipping event from non-active gamepad: {:?}", id),
            }
        }
        Ok(())
    }

    fn axes(&self) -> (f32, f32) {
        (self.levels.axis_x, self.levels.axis_y)
    }

    fn button_levels(&self) -> BTreeSet<u8> {
        self.levels.held.clone()
    }

    fn pov_value(&self) -> Option<f32> {
        self.levels.hat_value()
    }

    fn drain_transitions(&mut self) -> Vec<Transition> {
        self.levels.drain()
    }

    fn name(&self) -> &str {
        "gilrs"
    }
}

/// Raw index for a gilrs button, in stick-type driver order
fn button_index(button: Button) -> Option<u8> {
    match button {
        Button::South => Some(0),
        Button::East => Some(1),
        Button::West => Some(2),
        Button::North => Some(3),
        Button::LeftTrigger => Some(4),
        Button::RightTrigger => Some(5),
        Button::Start => Some(6),
        Button::Select => Some(7),
        Button::LeftThumb => Some(8),
        Button::RightThumb => Some(9),
        Button::LeftTrigger2 => Some(10),
        Button::RightTrigger2 => Some(11),
        Button::Mode => Some(12),
        _ => None,
    }
}

fn dpad_direction(button: Button) -> Option<Pov> {
    match button {
        Button::DPadUp => Some(Pov::Up),
        Button::DPadRight => Some(Pov::Right),
        Button::DPadDown => Some(Pov::Down),
        Button::DPadLeft => Some(Pov::Left),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::classifier::classify;
    use crate::controller::pad_event::{PadButton, STICK_PRESS_INDEX, TOGGLE_INDEX};
    use crate::controller::poller::Component;
    use crate::engine::dispatcher::ActionDispatcher;
    use crate::engine::EngineContext;
    use crate::mapping::keycode::KeyCode;
    use crate::mapping::table::BindingTable;
    use crate::output::RecordingSink;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn face_buttons_follow_xbox_layout() {
        assert_eq!(button_index(Button::South).and_then(PadButton::from_index), Some(PadButton::A));
        assert_eq!(button_index(Button::East).and_then(PadButton::from_index), Some(PadButton::B));
        assert_eq!(button_index(Button::West).and_then(PadButton::from_index), Some(PadButton::X));
        assert_eq!(button_index(Button::North).and_then(PadButton::from_index), Some(PadButton::Y));
    }

    #[test]
    fn stick_presses_land_on_reserved_indices() {
        assert_eq!(button_index(Button::LeftThumb), Some(STICK_PRESS_INDEX));
        assert_eq!(button_index(Button::RightThumb), Some(TOGGLE_INDEX));
    }

    #[test]
    fn dpad_is_not_a_button_index() {
        for button in [Button::DPadUp, Button::DPadDown, Button::DPadLeft, Button::DPadRight] {
            assert!(button_index(button).is_none());
            assert!(dpad_direction(button).is_some());
        }
    }

    fn dpad(povs: &[Pov]) -> BTreeSet<Pov> {
        povs.iter().copied().collect()
    }

    fn levels_of(transitions: &[Transition]) -> Vec<(Component, f32)> {
        transitions.iter().map(|t| (t.component, t.level)).collect()
    }

    #[test]
    fn cardinal_hat_values() {
        assert_eq!(hat_value(&dpad(&[Pov::Up])), Some(0.25));
        assert_eq!(hat_value(&dpad(&[Pov::Right])), Some(0.5));
        assert_eq!(hat_value(&dpad(&[Pov::Down])), Some(0.75));
        assert_eq!(hat_value(&dpad(&[Pov::Left])), Some(1.0));
        assert_eq!(hat_value(&dpad(&[])), None);
    }

    #[test]
    fn diagonal_hat_values() {
        assert_eq!(hat_value(&dpad(&[Pov::Up, Pov::Left])), Some(0.125));
        assert_eq!(hat_value(&dpad(&[Pov::Up, Pov::Right])), Some(0.375));
        assert_eq!(hat_value(&dpad(&[Pov::Down, Pov::Right])), Some(0.625));
        assert_eq!(hat_value(&dpad(&[Pov::Down, Pov::Left])), Some(0.875));
        // Opposites cancel out
        assert_eq!(hat_value(&dpad(&[Pov::Left, Pov::Right])), None);
    }

    #[test]
    fn dpad_queues_only_hat_changes() {
        let mut levels = PadLevels::default();
        levels.set_dpad(Pov::Up, true);
        levels.set_dpad(Pov::Up, true);
        levels.set_dpad(Pov::Left, true);
        levels.set_dpad(Pov::Left, false);
        levels.set_dpad(Pov::Up, false);

        assert_eq!(
            levels_of(&levels.drain()),
            vec![
                (Component::Pov, 0.25),
                (Component::Pov, 0.125),
                (Component::Pov, 0.25),
                (Component::Pov, 0.0),
            ]
        );
        assert_eq!(levels.hat_value(), None);
        assert!(levels.drain().is_empty());
    }

    #[test]
    fn last_dpad_release_is_a_release_transition() {
        let mut levels = PadLevels::default();
        levels.set_dpad(Pov::Down, true);
        levels.set_dpad(Pov::Right, true);
        levels.drain();

        levels.set_dpad(Pov::Down, false);
        levels.set_dpad(Pov::Right, false);
        let transitions = levels.drain();
        assert_eq!(
            levels_of(&transitions),
            vec![(Component::Pov, 0.5), (Component::Pov, 0.0)]
        );
        assert!(transitions[1].is_release());
    }

    #[test]
    fn repeated_button_edges_are_dropped() {
        let mut levels = PadLevels::default();
        levels.set_button(3, true);
        levels.set_button(3, true);
        levels.set_button(3, false);
        levels.set_button(3, false);

        assert_eq!(
            levels_of(&levels.drain()),
            vec![(Component::Button(3), 1.0), (Component::Button(3), 0.0)]
        );
    }

    #[test]
    fn disconnect_releases_everything_held() {
        let mut levels = PadLevels::default();
        levels.set_axes(0.6, -0.8);
        levels.set_button(4, true);
        levels.set_button(7, true);
        levels.set_dpad(Pov::Up, true);
        levels.drain();

        levels.release_everything();
        let transitions = levels.drain();
        assert_eq!(
            levels_of(&transitions),
            vec![
                (Component::Button(4), 0.0),
                (Component::Button(7), 0.0),
                (Component::Pov, 0.0),
            ]
        );
        assert!(transitions.iter().all(Transition::is_release));
        assert!(levels.held.is_empty());
        assert_eq!((levels.axis_x, levels.axis_y), (0.0, 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_stops_a_held_repeat() {
        let sink = Arc::new(RecordingSink::new());
        let context = EngineContext::new(BindingTable::standard().unwrap(), sink.clone());
        let mut dispatcher = ActionDispatcher::new(context);
        let centered = |held: &BTreeSet<u8>| classify(0.0, 0.0, held, None);

        let mut levels = PadLevels::default();
        levels.set_button(7, true);
        let handles: Vec<_> = levels
            .drain()
            .iter()
            .filter_map(|t| dispatcher.handle(t, &centered(&levels.held)))
            .collect();
        assert_eq!(dispatcher.active_long_presses(), 1);

        tokio::time::sleep(Duration::from_millis(750)).await;
        levels.release_everything();
        for transition in levels.drain() {
            dispatcher.handle(&transition, &centered(&levels.held));
        }
        assert_eq!(dispatcher.active_long_presses(), 0);
        for handle in handles {
            handle.await.unwrap();
        }

        // Tap at press, one repeat at 700ms
        assert_eq!(sink.count_down(KeyCode::Backspace), 2);
    }
}
