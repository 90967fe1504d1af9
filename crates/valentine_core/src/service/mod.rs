//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repositories and relay collaborators into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod acceptance_service;
pub mod compose_service;
pub mod viewer_service;
