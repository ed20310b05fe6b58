//! Gamepad-to-keystroke engine for typing Japanese kana.
//!
//! The left stick picks a consonant row, the face buttons and right trigger
//! pick the vowel, and the bumpers switch between plain, voiced, semi-voiced
//! and small-kana pages. Each match is typed as romaji through a [`KeySink`].
//!
//! ```text
//! controller ──► mapping ──► engine ──► output
//! ```
//!
//! [`KeySink`]: output::KeySink

pub mod config;
pub mod controller;
pub mod engine;
pub mod mapping;
pub mod output;
