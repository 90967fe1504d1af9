//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Page writes must pass `Page::validate()` before persistence.
//! - Acceptance inserts never fail on the per-page uniqueness constraint.

pub mod acceptance_repo;
pub mod page_repo;
