//! Error definitions for the mapping module

use thiserror::Error;

/// Faults found while building the binding table.
///
/// Every variant is a construction-time integrity fault: the engine refuses
/// to start rather than dispatch from a table that carries one.
#[derive(Debug, Error)]
pub enum BindingError {
    /// Two bindings would match the same live set
    #[error("Bindings '{first}' and '{second}' share the event set [{events}]")]
    DuplicateEvents {
        first: String,
        second: String,
        events: String,
    },

    #[error("Binding '{0}' has no required events")]
    EmptyEvents(String),

    /// A live set carries exactly one direction, so more can never match
    #[error("Binding '{0}' requires {1} direction tokens")]
    ConflictingDirections(String, usize),

    #[error("Binding '{0}' has an empty key sequence")]
    EmptySequence(String),

    #[error("No romaji known for '{0}'")]
    UnknownKana(String),

    #[error("No key types '{character}' for binding '{binding}'")]
    UnmappableCharacter { binding: String, character: char },
}
