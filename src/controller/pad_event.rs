//! Symbolic pad vocabulary
//!
//! Every input the engine reasons about is one [`PadEvent`]. The set is closed:
//! nine stick directions plus the stick-press override, the digital buttons, and
//! the four hat directions. Raw device button indices are translated here and
//! nowhere else.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw index of the left stick press. Held, it overrides the stick direction.
pub const STICK_PRESS_INDEX: u8 = 8;

/// Raw index of the right stick press, the designated enable/disable toggle.
pub const TOGGLE_INDEX: u8 = 9;

/// Stick direction token. Exactly one is live per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Center,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    /// Stick pressed in; mutually exclusive with every angle token
    Press,
}

impl Direction {
    /// The nine cheat-sheet cells, in reading order
    pub const GRID: [Direction; 9] = [
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
        Direction::Left,
        Direction::Center,
        Direction::Right,
        Direction::DownLeft,
        Direction::Down,
        Direction::DownRight,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Center => "center",
            Direction::Up => "up",
            Direction::UpRight => "up-right",
            Direction::Right => "right",
            Direction::DownRight => "down-right",
            Direction::Down => "down",
            Direction::DownLeft => "down-left",
            Direction::Left => "left",
            Direction::UpLeft => "up-left",
            Direction::Press => "press",
        }
    }
}

/// Digital button token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PadButton {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    Start,
    Back,
    RightStickPress,
    LeftTrigger,
    RightTrigger,
    Power,
}

impl PadButton {
    /// Maps a raw button index to its token.
    ///
    /// Index 8 (stick press) is deliberately absent: it only ever shows up as
    /// [`Direction::Press`].
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(PadButton::A),
            1 => Some(PadButton::B),
            2 => Some(PadButton::X),
            3 => Some(PadButton::Y),
            4 => Some(PadButton::LeftBumper),
            5 => Some(PadButton::RightBumper),
            6 => Some(PadButton::Start),
            7 => Some(PadButton::Back),
            9 => Some(PadButton::RightStickPress),
            10 => Some(PadButton::LeftTrigger),
            11 => Some(PadButton::RightTrigger),
            12 => Some(PadButton::Power),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            PadButton::A => 0,
            PadButton::B => 1,
            PadButton::X => 2,
            PadButton::Y => 3,
            PadButton::LeftBumper => 4,
            PadButton::RightBumper => 5,
            PadButton::Start => 6,
            PadButton::Back => 7,
            PadButton::RightStickPress => TOGGLE_INDEX,
            PadButton::LeftTrigger => 10,
            PadButton::RightTrigger => 11,
            PadButton::Power => 12,
        }
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, PadButton::LeftBumper | PadButton::RightBumper)
    }
}

/// Hat switch direction token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pov {
    Up,
    Right,
    Down,
    Left,
}

/// One symbolic input token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PadEvent {
    Direction(Direction),
    Button(PadButton),
    Pov(Pov),
}

impl PadEvent {
    pub fn is_direction(&self) -> bool {
        matches!(self, PadEvent::Direction(_))
    }
}

impl From<Direction> for PadEvent {
    fn from(direction: Direction) -> Self {
        PadEvent::Direction(direction)
    }
}

impl From<PadButton> for PadEvent {
    fn from(button: PadButton) -> Self {
        PadEvent::Button(button)
    }
}

impl From<Pov> for PadEvent {
    fn from(pov: Pov) -> Self {
        PadEvent::Pov(pov)
    }
}

impl fmt::Display for PadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PadEvent::Direction(direction) => write!(f, "{}", direction.label()),
            PadEvent::Button(button) => write!(f, "{:?}", button),
            PadEvent::Pov(pov) => write!(f, "pov-{:?}", pov),
        }
    }
}
