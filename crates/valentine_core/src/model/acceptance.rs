//! Acceptance record model.
//!
//! # Invariants
//! - Exactly one record may exist per page; later inserts are no-ops.
//! - Records are never updated or deleted.

use crate::model::page::PageId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal "yes" event for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceRecord {
    pub event_id: Uuid,
    pub page_id: PageId,
    /// Unix epoch milliseconds.
    pub accepted_at: i64,
    /// Public URL of the uploaded celebration snapshot, when one was captured.
    pub snapshot_url: Option<String>,
}

impl AcceptanceRecord {
    pub fn new(page_id: impl Into<PageId>, accepted_at: i64, snapshot_url: Option<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            page_id: page_id.into(),
            accepted_at,
            snapshot_url,
        }
    }
}
