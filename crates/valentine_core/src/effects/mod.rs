//! Ambient and interactive effect computations.
//!
//! # Responsibility
//! - Produce the numbers the rendering shell animates: floating ornaments,
//!   decline-control offsets, feedback glyphs.
//! - Stay independent of any UI framework so every rule is unit-testable.
//!
//! # Invariants
//! - Randomness is always injected through a caller-provided `rand::Rng`.
//! - Time is always an explicit millisecond timestamp argument.

pub mod evasion;
pub mod floating;
