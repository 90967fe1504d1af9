//! Flutter bridge for the valentine core.

pub mod api;
