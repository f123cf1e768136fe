//! Structured logging vocabulary.
//!
//! Library code emits `tracing` events keyed by the names in [`events`] and the field
//! helpers in [`fields`]; it never installs a subscriber itself.

pub mod events;
pub mod fields;
