//! Input mode selection from the two bumpers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kana input mode
///
/// Plain is seion, Voiced is dakuon, SemiVoiced is handakuon and Compound is
/// the small/contracted kana page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Plain,
    Voiced,
    SemiVoiced,
    Compound,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Plain, Mode::Voiced, Mode::SemiVoiced, Mode::Compound];

    /// Bumper state that selects this mode, as `(lb, rb)`
    pub fn bumpers(&self) -> (bool, bool) {
        match self {
            Mode::Plain => (false, false),
            Mode::Voiced => (true, false),
            Mode::SemiVoiced => (false, true),
            Mode::Compound => (true, true),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Plain => write!(f, "Plain"),
            Mode::Voiced => write!(f, "Voiced"),
            Mode::SemiVoiced => write!(f, "SemiVoiced"),
            Mode::Compound => write!(f, "Compound"),
        }
    }
}

pub fn resolve_mode(has_lb: bool, has_rb: bool) -> Mode {
    match (has_lb, has_rb) {
        (false, false) => Mode::Plain,
        (true, false) => Mode::Voiced,
        (false, true) => Mode::SemiVoiced,
        (true, true) => Mode::Compound,
    }
}
