use crate::controller::classifier::SymbolicInputSet;
use crate::mapping::binding::Binding;
use crate::mapping::table::BindingTable;
use tracing::debug;

/// Returns the binding whose required events equal `live` as an unordered set.
///
/// No subset or superset matching: a live set with one extra modifier resolves
/// to nothing rather than to the closest binding.
pub fn resolve<'a>(table: &'a BindingTable, live: &SymbolicInputSet) -> Option<&'a Binding> {
    let binding = table.lookup(live);
    match binding {
        Some(binding) => debug!("Resolved {:?} to {}", live.as_set(), binding.display_name),
        None => debug!("No binding for {:?}", live.as_set()),
    }
    binding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::pad_event::{Direction, PadButton, PadEvent};

    fn set(events: &[PadEvent]) -> SymbolicInputSet {
        events.iter().copied().collect()
    }

    #[test]
    fn exact_match_only() {
        let table = BindingTable::standard().unwrap();
        let exact = set(&[Direction::Center.into(), PadButton::Y.into()]);
        let superset = set(&[
            Direction::Center.into(),
            PadButton::Y.into(),
            PadButton::Start.into(),
        ]);
        let subset = set(&[PadButton::Y.into()]);

        assert_eq!(resolve(&table, &exact).map(|b| b.display_name.as_str()), Some("あ"));
        assert!(resolve(&table, &superset).is_none());
        assert!(resolve(&table, &subset).is_none());
    }

    #[test]
    fn resolution_is_deterministic() {
        let table = BindingTable::standard().unwrap();
        for binding in table.iter() {
            let first = resolve(&table, &binding.required_events).unwrap();
            let second = resolve(&table, &binding.required_events).unwrap();
            assert_eq!(first, second);
            assert_eq!(first, binding);
        }
    }

    #[test]
    fn compound_press_resolves_regardless_of_angle() {
        let table = BindingTable::standard().unwrap();
        let live = set(&[
            PadButton::LeftBumper.into(),
            PadButton::RightBumper.into(),
            Direction::Press.into(),
            PadButton::Y.into(),
        ]);
        let binding = resolve(&table, &live).unwrap();
        assert_eq!(binding.display_name, "ゎ");
    }
}
