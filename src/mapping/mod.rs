//! Binding data and matching
//!
//! Turns a live [`SymbolicInputSet`](crate::controller::SymbolicInputSet) into
//! at most one [`Binding`]:
//!
//! 1. [`keycode`] - Closed key vocabulary and the char-to-key table
//! 2. [`kana`] - Romaji data and the gojūon grid per mode
//! 3. [`table`] - Validated, immutable binding table
//! 4. [`matcher`] - Exact-set resolution against the table

pub mod binding;
pub mod error;
pub mod kana;
pub mod keycode;
pub mod matcher;
pub mod table;

pub use binding::{Action, Binding, FaceSlot};
pub use error::BindingError;
pub use keycode::KeyCode;
pub use matcher::resolve;
pub use table::BindingTable;
