//! Acceptance record repository.
//!
//! # Responsibility
//! - Insert the single "yes" event for a page.
//! - Read back a prior acceptance when a page is reopened.
//!
//! # Invariants
//! - `yes_events.page_id` is unique; a conflicting insert reports
//!   `AlreadyRecorded` instead of an error, so racing tabs or devices agree.

use crate::model::acceptance::AcceptanceRecord;
use crate::repo::page_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

/// Result of an acceptance insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted,
    /// Another session accepted first; the stored record wins.
    AlreadyRecorded,
}

pub trait AcceptanceRepository {
    fn record_acceptance(&self, record: &AcceptanceRecord) -> RepoResult<RecordOutcome>;
    fn get_acceptance(&self, page_id: &str) -> RepoResult<Option<AcceptanceRecord>>;
}

impl<T: AcceptanceRepository + ?Sized> AcceptanceRepository for &T {
    fn record_acceptance(&self, record: &AcceptanceRecord) -> RepoResult<RecordOutcome> {
        (**self).record_acceptance(record)
    }

    fn get_acceptance(&self, page_id: &str) -> RepoResult<Option<AcceptanceRecord>> {
        (**self).get_acceptance(page_id)
    }
}

/// SQLite-backed acceptance repository.
pub struct SqliteAcceptanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAcceptanceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AcceptanceRepository for SqliteAcceptanceRepository<'_> {
    fn record_acceptance(&self, record: &AcceptanceRecord) -> RepoResult<RecordOutcome> {
        let page_exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM valentine_pages WHERE id = ?1);",
            [record.page_id.as_str()],
            |row| row.get(0),
        )?;
        if !page_exists {
            return Err(RepoError::NotFound(record.page_id.clone()));
        }

        let changed = self.conn.execute(
            "INSERT INTO yes_events (id, page_id, clicked_at, screenshot_url)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(page_id) DO NOTHING;",
            params![
                record.event_id.to_string(),
                record.page_id.as_str(),
                record.accepted_at,
                record.snapshot_url.as_deref(),
            ],
        )?;

        Ok(if changed == 0 {
            RecordOutcome::AlreadyRecorded
        } else {
            RecordOutcome::Inserted
        })
    }

    fn get_acceptance(&self, page_id: &str) -> RepoResult<Option<AcceptanceRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, page_id, clicked_at, screenshot_url
                 FROM yes_events
                 WHERE page_id = ?1;",
                [page_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((id_text, page_id, accepted_at, snapshot_url)) = row else {
            return Ok(None);
        };
        let event_id = Uuid::parse_str(&id_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{id_text}` in yes_events.id"))
        })?;

        Ok(Some(AcceptanceRecord {
            event_id,
            page_id,
            accepted_at,
            snapshot_url,
        }))
    }
}
