//! Snapshot classification
//!
//! Turns one controller snapshot (stick axes, held button indices, hat value)
//! into symbolic form. The stick is bucketed into eight 45° sectors measured
//! clockwise from straight up, small deflections are swallowed by the
//! deadzone, and a held stick press overrides the angle entirely.

use crate::controller::mode::{resolve_mode, Mode};
use crate::controller::pad_event::{Direction, PadButton, PadEvent, Pov, STICK_PRESS_INDEX};
use std::collections::BTreeSet;
use tracing::debug;

/// Axis magnitude at or below which a stick axis reads as zero
pub const DEFAULT_DEADZONE: f32 = 0.2;

const POV_TOLERANCE: f32 = 1e-3;

/// Normalized hat values and the direction each one encodes
const POV_VALUES: [(f32, Pov); 4] = [
    (0.25, Pov::Up),
    (0.50, Pov::Right),
    (0.75, Pov::Down),
    (1.00, Pov::Left),
];

/// Unordered set of symbolic tokens, compared by exact equality during matching
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SymbolicInputSet(BTreeSet<PadEvent>);

impl SymbolicInputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: impl Into<PadEvent>) -> bool {
        self.0.insert(event.into())
    }

    pub fn contains(&self, event: impl Into<PadEvent>) -> bool {
        self.0.contains(&event.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PadEvent> {
        self.0.iter()
    }

    pub fn as_set(&self) -> &BTreeSet<PadEvent> {
        &self.0
    }

    /// The single direction token, if the set carries one
    pub fn direction(&self) -> Option<Direction> {
        self.0.iter().find_map(|event| match event {
            PadEvent::Direction(direction) => Some(*direction),
            _ => None,
        })
    }
}

impl FromIterator<PadEvent> for SymbolicInputSet {
    fn from_iter<I: IntoIterator<Item = PadEvent>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Symbolic reading of one snapshot
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    pub direction: Direction,
    pub left_bumper: bool,
    pub right_bumper: bool,
    pub pov: Option<Pov>,
    /// Mapped buttons currently held, bumpers included
    pub held: BTreeSet<PadButton>,
}

impl Classification {
    pub fn mode(&self) -> Mode {
        resolve_mode(self.left_bumper, self.right_bumper)
    }

    /// Modifier tokens plus the direction token
    pub fn base_set(&self) -> SymbolicInputSet {
        let mut set = SymbolicInputSet::new();
        if self.left_bumper {
            set.insert(PadButton::LeftBumper);
        }
        if self.right_bumper {
            set.insert(PadButton::RightBumper);
        }
        set.insert(self.direction);
        set
    }

    /// Live set for a freshly pressed token
    pub fn live_set(&self, pressed: PadEvent) -> SymbolicInputSet {
        let mut set = self.base_set();
        set.insert(pressed);
        set
    }
}

/// Stateless snapshot classifier with a configurable deadzone
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classifier {
    deadzone: f32,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            deadzone: DEFAULT_DEADZONE,
        }
    }
}

impl Classifier {
    pub fn new(deadzone: f32) -> Self {
        Self { deadzone }
    }

    pub fn deadzone(&self) -> f32 {
        self.deadzone
    }

    pub fn classify(
        &self,
        x: f32,
        y: f32,
        button_levels: &BTreeSet<u8>,
        pov_value: Option<f32>,
    ) -> Classification {
        let x = apply_deadzone(x, self.deadzone);
        let y = apply_deadzone(y, self.deadzone);

        let held: BTreeSet<PadButton> = button_levels
            .iter()
            .filter_map(|index| PadButton::from_index(*index))
            .collect();

        let direction = if button_levels.contains(&STICK_PRESS_INDEX) {
            Direction::Press
        } else {
            direction_from_axes(x, y)
        };

        let classification = Classification {
            direction,
            left_bumper: held.contains(&PadButton::LeftBumper),
            right_bumper: held.contains(&PadButton::RightBumper),
            pov: pov_value.and_then(pov_from_value),
            held,
        };
        debug!(
            "Classified ({:.3}, {:.3}) as {:?} in {} mode",
            x,
            y,
            classification.direction,
            classification.mode()
        );
        classification
    }
}

/// Classifies with the default deadzone
pub fn classify(
    x: f32,
    y: f32,
    button_levels: &BTreeSet<u8>,
    pov_value: Option<f32>,
) -> Classification {
    Classifier::default().classify(x, y, button_levels, pov_value)
}

/// Clamps an axis reading to zero inside the deadzone; values outside pass unchanged
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() <= deadzone {
        0.0
    } else {
        value
    }
}

/// Buckets already-deadzoned axes into a direction token
pub fn direction_from_axes(x: f32, y: f32) -> Direction {
    if x == 0.0 && y == 0.0 {
        return Direction::Center;
    }
    let angle = f64::from(x).atan2(f64::from(y)).to_degrees();
    direction_from_angle(angle)
}

/// Maps an angle in degrees (0 = up, clockwise positive) to its sector.
///
/// Ranges are inclusive and tested in a fixed order, so a boundary angle lands
/// in the first sector that names it. Anything no sector claims, which is only
/// a non-finite angle, falls back to [`Direction::Up`].
pub fn direction_from_angle(angle: f64) -> Direction {
    let within = |low: f64, high: f64| (low..=high).contains(&angle);

    if within(-22.5, 22.5) {
        Direction::Up
    } else if within(22.5, 67.5) {
        Direction::UpRight
    } else if within(67.5, 112.5) {
        Direction::Right
    } else if within(112.5, 157.5) {
        Direction::DownRight
    } else if within(-67.5, -22.5) {
        Direction::UpLeft
    } else if within(-112.5, -67.5) {
        Direction::Left
    } else if within(-157.5, -112.5) {
        Direction::DownLeft
    } else if within(157.5, 180.0) || within(-180.0, -157.5) {
        Direction::Down
    } else {
        Direction::Up
    }
}

pub fn pov_from_value(value: f32) -> Option<Pov> {
    POV_VALUES
        .iter()
        .find(|(normalized, _)| (value - normalized).abs() < POV_TOLERANCE)
        .map(|(_, pov)| *pov)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn levels(indices: &[u8]) -> BTreeSet<u8> {
        indices.iter().copied().collect()
    }

    const SECTORS: [(f64, Direction); 8] = [
        (0.0, Direction::Up),
        (45.0, Direction::UpRight),
        (90.0, Direction::Right),
        (135.0, Direction::DownRight),
        (180.0, Direction::Down),
        (-135.0, Direction::DownLeft),
        (-90.0, Direction::Left),
        (-45.0, Direction::UpLeft),
    ];

    #[test]
    fn cardinal_and_diagonal_axes() {
        let none = levels(&[]);
        assert_eq!(classify(0.0, 1.0, &none, None).direction, Direction::Up);
        assert_eq!(classify(0.0, -1.0, &none, None).direction, Direction::Down);
        assert_eq!(classify(1.0, 0.0, &none, None).direction, Direction::Right);
        assert_eq!(classify(-1.0, 0.0, &none, None).direction, Direction::Left);
        assert_eq!(classify(0.7, 0.7, &none, None).direction, Direction::UpRight);
        assert_eq!(classify(-0.7, 0.7, &none, None).direction, Direction::UpLeft);
        assert_eq!(classify(0.7, -0.7, &none, None).direction, Direction::DownRight);
        assert_eq!(classify(-0.7, -0.7, &none, None).direction, Direction::DownLeft);
    }

    #[test]
    fn wider_deadzone_swallows_small_deflection() {
        let classifier = Classifier::new(0.5);
        assert_eq!(classifier.deadzone(), 0.5);
        assert_eq!(Classifier::default().deadzone(), DEFAULT_DEADZONE);
        let none = levels(&[]);
        assert_eq!(classifier.classify(0.4, 0.4, &none, None).direction, Direction::Center);
        assert_eq!(Classifier::default().classify(0.4, 0.4, &none, None).direction, Direction::UpRight);
    }

    #[test]
    fn boundary_angles_resolve_to_first_named_sector() {
        assert_eq!(direction_from_angle(22.5), Direction::Up);
        assert_eq!(direction_from_angle(-22.5), Direction::Up);
        assert_eq!(direction_from_angle(67.5), Direction::UpRight);
        assert_eq!(direction_from_angle(112.5), Direction::Right);
        assert_eq!(direction_from_angle(157.5), Direction::DownRight);
        assert_eq!(direction_from_angle(-67.5), Direction::UpLeft);
        assert_eq!(direction_from_angle(-112.5), Direction::Left);
        assert_eq!(direction_from_angle(-157.5), Direction::DownLeft);
        assert_eq!(direction_from_angle(180.0), Direction::Down);
        assert_eq!(direction_from_angle(-180.0), Direction::Down);
    }

    #[test]
    fn unclaimed_angle_falls_back_to_up() {
        assert_eq!(direction_from_angle(f64::NAN), Direction::Up);
        assert_eq!(direction_from_angle(400.0), Direction::Up);
    }

    #[test]
    fn deadzone_clamps_each_axis_independently() {
        assert_eq!(apply_deadzone(0.2, DEFAULT_DEADZONE), 0.0);
        assert_eq!(apply_deadzone(-0.2, DEFAULT_DEADZONE), 0.0);
        assert_eq!(apply_deadzone(0.21, DEFAULT_DEADZONE), 0.21);
        // x is swallowed, so a shallow up-right deflection reads as straight up
        let none = levels(&[]);
        assert_eq!(classify(0.15, 0.9, &none, None).direction, Direction::Up);
    }

    #[test]
    fn stick_press_overrides_angle() {
        let pressed = levels(&[STICK_PRESS_INDEX]);
        for (x, y) in [(0.0, 0.0), (0.9, 0.1), (-0.5, -0.8)] {
            let classification = classify(x, y, &pressed, None);
            assert_eq!(classification.direction, Direction::Press);
            assert!(!classification.held.iter().any(|b| b.index() == STICK_PRESS_INDEX));
        }
    }

    #[test]
    fn hat_values_map_to_four_tokens() {
        assert_eq!(pov_from_value(0.25), Some(Pov::Up));
        assert_eq!(pov_from_value(0.50), Some(Pov::Right));
        assert_eq!(pov_from_value(0.75), Some(Pov::Down));
        assert_eq!(pov_from_value(1.00), Some(Pov::Left));
        assert_eq!(pov_from_value(0.0), None);
        assert_eq!(pov_from_value(0.125), None);
        assert_eq!(pov_from_value(0.875), None);
    }

    #[test]
    fn unmapped_indices_are_ignored() {
        let classification = classify(0.0, 0.0, &levels(&[3, 42, 200]), None);
        assert_eq!(
            classification.held,
            [PadButton::Y].into_iter().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn bumpers_drive_mode_and_base_set() {
        let classification = classify(0.0, 1.0, &levels(&[4, 5]), None);
        assert_eq!(classification.mode(), Mode::Compound);
        let base = classification.base_set();
        assert_eq!(base.len(), 3);
        assert!(base.contains(PadButton::LeftBumper));
        assert!(base.contains(PadButton::RightBumper));
        assert_eq!(base.direction(), Some(Direction::Up));
    }

    #[test]
    fn live_set_always_carries_one_direction() {
        let classification = classify(-0.9, 0.0, &levels(&[0, 1, 2]), Some(0.5));
        let live = classification.live_set(PadButton::X.into());
        assert_eq!(live.iter().filter(|e| e.is_direction()).count(), 1);
        // held buttons other than the pressed one stay out of the live set
        assert!(!live.contains(PadButton::A));
        assert!(live.contains(PadButton::X));
    }

    proptest! {
        #[test]
        fn inside_sector_yields_sector_direction(
            sector in 0usize..8,
            offset in -21.5f64..21.5,
            radius in 0.9f64..=1.0,
        ) {
            let (center, expected) = SECTORS[sector];
            let theta = (center + offset).to_radians();
            let x = (radius * theta.sin()) as f32;
            let y = (radius * theta.cos()) as f32;
            prop_assert_eq!(classify(x, y, &BTreeSet::new(), None).direction, expected);
        }

        #[test]
        fn inside_deadzone_is_center(x in -0.2f32..=0.2, y in -0.2f32..=0.2) {
            prop_assert_eq!(classify(x, y, &BTreeSet::new(), None).direction, Direction::Center);
        }
    }
}
