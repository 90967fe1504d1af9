//! Core domain logic for valentine proposal pages.
//! This crate is the single source of truth for page, evasion and acceptance rules.

pub mod config;
pub mod db;
pub mod effects;
pub mod logging;
pub mod model;
pub mod relay;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ShareLinkConfig, StorageConfig};
pub use logging::{default_log_level, init_logging, init_logging_with, logging_status};
pub use model::acceptance::AcceptanceRecord;
pub use model::page::{Page, PageId, PageValidationError};
pub use model::theme::{lookup_decoration, lookup_theme, DecorationSet, Theme};
pub use relay::{RelayError, RelayResult};
pub use repo::acceptance_repo::{AcceptanceRepository, RecordOutcome, SqliteAcceptanceRepository};
pub use repo::page_repo::{PageRepository, RepoError, RepoResult, SqlitePageRepository};
pub use service::acceptance_service::{AcceptState, AcceptanceFlow};
pub use service::compose_service::{ComposeError, ComposeService, CreatedPage, PageDraft};
pub use service::viewer_service::{LoadedPage, PageView, ViewerService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
