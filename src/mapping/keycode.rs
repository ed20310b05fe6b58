//! Keyboard key vocabulary
//!
//! Key sequences are built from this closed set only. Romaji text is turned
//! into keys through [`KeyCode::from_char`]; a character with no entry is
//! reported when the binding table is built, never at dispatch time.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Space,
    Enter,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Shift,
    Minus,
    Comma,
    Period,
    Slash,
    F7,
    /// Japanese full-width/half-width IME toggle
    ZenkakuHankaku,
}

impl KeyCode {
    /// Every key, for sinks that must declare their capabilities up front
    pub const ALL: [KeyCode; 50] = [
        KeyCode::A,
        KeyCode::B,
        KeyCode::C,
        KeyCode::D,
        KeyCode::E,
        KeyCode::F,
        KeyCode::G,
        KeyCode::H,
        KeyCode::I,
        KeyCode::J,
        KeyCode::K,
        KeyCode::L,
        KeyCode::M,
        KeyCode::N,
        KeyCode::O,
        KeyCode::P,
        KeyCode::Q,
        KeyCode::R,
        KeyCode::S,
        KeyCode::T,
        KeyCode::U,
        KeyCode::V,
        KeyCode::W,
        KeyCode::X,
        KeyCode::Y,
        KeyCode::Z,
        KeyCode::Digit0,
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
        KeyCode::Space,
        KeyCode::Enter,
        KeyCode::Backspace,
        KeyCode::ArrowUp,
        KeyCode::ArrowDown,
        KeyCode::ArrowLeft,
        KeyCode::ArrowRight,
        KeyCode::Shift,
        KeyCode::Minus,
        KeyCode::Comma,
        KeyCode::Period,
        KeyCode::Slash,
        KeyCode::F7,
        KeyCode::ZenkakuHankaku,
    ];

    /// Key that types `c` without modifiers, case-insensitive for letters
    pub fn from_char(c: char) -> Option<Self> {
        let key = match c.to_ascii_lowercase() {
            'a' => KeyCode::A,
            'b' => KeyCode::B,
            'c' => KeyCode::C,
            'd' => KeyCode::D,
            'e' => KeyCode::E,
            'f' => KeyCode::F,
            'g' => KeyCode::G,
            'h' => KeyCode::H,
            'i' => KeyCode::I,
            'j' => KeyCode::J,
            'k' => KeyCode::K,
            'l' => KeyCode::L,
            'm' => KeyCode::M,
            'n' => KeyCode::N,
            'o' => KeyCode::O,
            'p' => KeyCode::P,
            'q' => KeyCode::Q,
            'r' => KeyCode::R,
            's' => KeyCode::S,
            't' => KeyCode::T,
            'u' => KeyCode::U,
            'v' => KeyCode::V,
            'w' => KeyCode::W,
            'x' => KeyCode::X,
            'y' => KeyCode::Y,
            'z' => KeyCode::Z,
            '0' => KeyCode::Digit0,
            '1' => KeyCode::Digit1,
            '2' => KeyCode::Digit2,
            '3' => KeyCode::Digit3,
            '4' => KeyCode::Digit4,
            '5' => KeyCode::Digit5,
            '6' => KeyCode::Digit6,
            '7' => KeyCode::Digit7,
            '8' => KeyCode::Digit8,
            '9' => KeyCode::Digit9,
            ' ' => KeyCode::Space,
            '\n' => KeyCode::Enter,
            '-' => KeyCode::Minus,
            ',' => KeyCode::Comma,
            '.' => KeyCode::Period,
            '/' => KeyCode::Slash,
            _ => return None,
        };
        Some(key)
    }
}
