//! Structured logging vocabulary.
//!
//! Library code emits `tracing` events keyed by the constants in [`events`] and
//! [`fields`]; installing a subscriber is left to the embedding process.

pub mod events;
pub mod fields;
