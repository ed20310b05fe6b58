//! The binding table
//!
//! Built once at startup from the kana grid plus a fixed list of special
//! bindings, validated, and never mutated afterwards. Validation rejects any
//! two bindings whose required-event sets are equal, so at most one binding
//! can ever match a live set.

use crate::controller::classifier::SymbolicInputSet;
use crate::controller::mode::Mode;
use crate::controller::pad_event::{Direction, PadButton, PadEvent, Pov};
use crate::mapping::binding::{Action, Binding, FaceSlot};
use crate::mapping::error::BindingError;
use crate::mapping::kana::{self, GRID};
use crate::mapping::keycode::KeyCode;
use std::collections::HashMap;
use tracing::{debug, info};

macro_rules! events {
    ($($event:expr),+ $(,)?) => {
        [$(PadEvent::from($event)),+]
    };
}

#[derive(Debug, Clone)]
pub struct BindingTable {
    bindings: Vec<Binding>,
    index: HashMap<SymbolicInputSet, usize>,
}

impl BindingTable {
    /// Kana grid for every mode plus the special keys
    pub fn standard() -> Result<Self, BindingError> {
        let mut bindings = grid_bindings()?;
        bindings.extend(special_bindings());
        Self::from_bindings(bindings)
    }

    /// Validates `bindings` and indexes them by required-event set.
    ///
    /// Fails on the first binding that has no events, requires more than one
    /// direction, has an empty key sequence, or duplicates the event set of an
    /// earlier binding.
    pub fn from_bindings(bindings: Vec<Binding>) -> Result<Self, BindingError> {
        let mut index = HashMap::with_capacity(bindings.len());

        for (position, binding) in bindings.iter().enumerate() {
            validate(binding)?;

            if let Some(&existing) = index.get(&binding.required_events) {
                let first: &Binding = &bindings[existing];
                return Err(BindingError::DuplicateEvents {
                    first: first.display_name.clone(),
                    second: binding.display_name.clone(),
                    events: describe(&binding.required_events),
                });
            }
            index.insert(binding.required_events.clone(), position);
        }

        info!("Binding table built with {} bindings", bindings.len());
        Ok(Self { bindings, index })
    }

    /// Binding whose required events equal `live` exactly
    pub fn lookup(&self, live: &SymbolicInputSet) -> Option<&Binding> {
        self.index.get(live).map(|&position| &self.bindings[position])
    }

    /// Every binding that requires `direction`, in registration order
    pub fn bindings_for_direction(&self, direction: Direction) -> Vec<&Binding> {
        self.bindings
            .iter()
            .filter(|binding| binding.direction() == Some(direction))
            .collect()
    }

    /// The bindings shown for one mode page under one direction
    pub fn bindings_for(&self, mode: Mode, direction: Direction) -> Vec<&Binding> {
        self.bindings
            .iter()
            .filter(|binding| binding.direction() == Some(direction) && binding.mode() == mode)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn validate(binding: &Binding) -> Result<(), BindingError> {
    if binding.required_events.is_empty() {
        return Err(BindingError::EmptyEvents(binding.display_name.clone()));
    }

    let directions = binding
        .required_events
        .iter()
        .filter(|event| event.is_direction())
        .count();
    if directions > 1 {
        return Err(BindingError::ConflictingDirections(
            binding.display_name.clone(),
            directions,
        ));
    }

    if let Action::KeySequence(keys) = &binding.action {
        if keys.is_empty() {
            return Err(BindingError::EmptySequence(binding.display_name.clone()));
        }
    }
    Ok(())
}

fn describe(events: &SymbolicInputSet) -> String {
    events
        .iter()
        .map(|event| event.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Keys that type the romaji of `kana`
fn romaji_keys(kana: &str) -> Result<Vec<KeyCode>, BindingError> {
    let romaji = kana::romaji(kana).ok_or_else(|| BindingError::UnknownKana(kana.to_string()))?;
    romaji
        .chars()
        .map(|character| {
            KeyCode::from_char(character).ok_or_else(|| BindingError::UnmappableCharacter {
                binding: kana.to_string(),
                character,
            })
        })
        .collect()
}

fn grid_bindings() -> Result<Vec<Binding>, BindingError> {
    let mut bindings = Vec::new();

    for row in GRID.iter() {
        let (left_bumper, right_bumper) = row.mode.bumpers();

        for (slot, cell) in FaceSlot::ALL.iter().zip(row.cells.iter()) {
            if cell.is_empty() {
                continue;
            }

            let mut events = SymbolicInputSet::new();
            if left_bumper {
                events.insert(PadButton::LeftBumper);
            }
            if right_bumper {
                events.insert(PadButton::RightBumper);
            }
            events.insert(row.direction);
            events.insert(slot.button());

            bindings.push(Binding {
                display_name: cell.to_string(),
                required_events: events,
                action: Action::KeySequence(romaji_keys(cell)?),
                is_long_press: false,
            });
        }
    }

    debug!("Kana grid produced {} bindings", bindings.len());
    Ok(bindings)
}

fn special_bindings() -> Vec<Binding> {
    use Direction::{Center, Left, Press, UpRight};
    use PadButton::{
        Back, LeftBumper, LeftTrigger, Power, RightBumper, RightStickPress, RightTrigger, Start,
        A, B, X, Y,
    };

    vec![
        Binding::long_press("Back Space", events![Center, Back], vec![KeyCode::Backspace]),
        Binding::tap("Space", events![Center, LeftTrigger], vec![KeyCode::Space]),
        Binding::tap("全角/半角", events![Center, Power], vec![KeyCode::ZenkakuHankaku]),
        Binding::tap("Enter", events![Center, Start], vec![KeyCode::Enter]),
        Binding::long_press("↑", events![Center, Pov::Up], vec![KeyCode::ArrowUp]),
        Binding::long_press("→", events![Center, Pov::Right], vec![KeyCode::ArrowRight]),
        Binding::long_press("↓", events![Center, Pov::Down], vec![KeyCode::ArrowDown]),
        Binding::long_press("←", events![Center, Pov::Left], vec![KeyCode::ArrowLeft]),
        Binding::long_press(
            "SHIFT+→",
            events![LeftBumper, Center, Pov::Right],
            vec![KeyCode::Shift, KeyCode::ArrowRight],
        ),
        Binding::long_press(
            "SHIFT+←",
            events![LeftBumper, Center, Pov::Left],
            vec![KeyCode::Shift, KeyCode::ArrowLeft],
        ),
        // Fired by the release path only, so it carries no direction
        Binding::toggle("ON/OFF", events![RightStickPress]),
        Binding::tap("ー", events![Press, RightTrigger], vec![KeyCode::Minus]),
        Binding::tap(
            "!",
            events![RightBumper, UpRight, Y],
            vec![KeyCode::Shift, KeyCode::Digit1],
        ),
        Binding::tap(
            "?",
            events![RightBumper, UpRight, A],
            vec![KeyCode::Shift, KeyCode::Slash],
        ),
        // JIS layout
        Binding::tap(
            "(",
            events![RightBumper, UpRight, X],
            vec![KeyCode::Shift, KeyCode::Digit8],
        ),
        Binding::tap(
            ")",
            events![RightBumper, UpRight, B],
            vec![KeyCode::Shift, KeyCode::Digit9],
        ),
        Binding::tap("、", events![Left, B], vec![KeyCode::Comma]),
        Binding::tap("。", events![Left, X], vec![KeyCode::Period]),
        Binding::tap("F7", events![LeftBumper, Center, LeftTrigger], vec![KeyCode::F7]),
    ]
}
