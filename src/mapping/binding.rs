use crate::controller::classifier::SymbolicInputSet;
use crate::controller::mode::{resolve_mode, Mode};
use crate::controller::pad_event::{Direction, PadButton, PadEvent};
use crate::mapping::keycode::KeyCode;
use std::fmt;

/// What a binding does when it fires
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Keys pressed in order, then released in order
    KeySequence(Vec<KeyCode>),
    /// Flips the global enable state
    Toggle,
}

/// One entry of the binding table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub display_name: String,
    pub required_events: SymbolicInputSet,
    pub action: Action,
    pub is_long_press: bool,
}

impl Binding {
    pub fn tap(
        display_name: impl Into<String>,
        events: impl IntoIterator<Item = PadEvent>,
        keys: Vec<KeyCode>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            required_events: events.into_iter().collect(),
            action: Action::KeySequence(keys),
            is_long_press: false,
        }
    }

    /// Tap that keeps repeating while held
    pub fn long_press(
        display_name: impl Into<String>,
        events: impl IntoIterator<Item = PadEvent>,
        keys: Vec<KeyCode>,
    ) -> Self {
        Self {
            is_long_press: true,
            ..Self::tap(display_name, events, keys)
        }
    }

    pub fn toggle(display_name: impl Into<String>, events: impl IntoIterator<Item = PadEvent>) -> Self {
        Self {
            display_name: display_name.into(),
            required_events: events.into_iter().collect(),
            action: Action::Toggle,
            is_long_press: false,
        }
    }

    /// Mode page this binding is shown on, from the bumpers it requires
    pub fn mode(&self) -> Mode {
        resolve_mode(
            self.required_events.contains(PadButton::LeftBumper),
            self.required_events.contains(PadButton::RightBumper),
        )
    }

    pub fn direction(&self) -> Option<Direction> {
        self.required_events.direction()
    }

    pub fn keys(&self) -> &[KeyCode] {
        match &self.action {
            Action::KeySequence(keys) => keys,
            Action::Toggle => &[],
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events: Vec<String> = self.required_events.iter().map(|e| e.to_string()).collect();
        write!(f, "{} [{}]", self.display_name, events.join(" + "))
    }
}

/// The five character slots under every stick direction, in vowel-column order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceSlot {
    Y,
    B,
    A,
    X,
    RightTrigger,
}

impl FaceSlot {
    pub const ALL: [FaceSlot; 5] = [
        FaceSlot::Y,
        FaceSlot::B,
        FaceSlot::A,
        FaceSlot::X,
        FaceSlot::RightTrigger,
    ];

    pub fn button(&self) -> PadButton {
        match self {
            FaceSlot::Y => PadButton::Y,
            FaceSlot::B => PadButton::B,
            FaceSlot::A => PadButton::A,
            FaceSlot::X => PadButton::X,
            FaceSlot::RightTrigger => PadButton::RightTrigger,
        }
    }
}
