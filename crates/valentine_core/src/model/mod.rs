//! Domain model for valentine pages.
//!
//! # Responsibility
//! - Define the records persisted by the composer and read by the viewer.
//! - Own the static theme and decoration tables.
//!
//! # Invariants
//! - Pages and acceptance records are immutable once persisted.
//! - At most one acceptance record exists per page.

pub mod acceptance;
pub mod page;
pub mod theme;
