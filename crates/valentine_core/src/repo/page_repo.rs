//! Page repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get APIs over `valentine_pages` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Page::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::page::{Page, PageId, PageValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PAGE_SELECT_SQL: &str = "SELECT
    id,
    question,
    begging_messages,
    final_message,
    social_label,
    social_link,
    sender_name,
    receiver_name,
    creator_email,
    theme,
    decoration_type,
    custom_decoration_url,
    created_at
FROM valentine_pages";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for page and acceptance persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(PageValidationError),
    Db(DbError),
    NotFound(PageId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "page not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted page data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<PageValidationError> for RepoError {
    fn from(value: PageValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for page persistence.
pub trait PageRepository {
    fn create_page(&self, page: &Page) -> RepoResult<PageId>;
    fn get_page(&self, id: &str) -> RepoResult<Option<Page>>;
}

impl<T: PageRepository + ?Sized> PageRepository for &T {
    fn create_page(&self, page: &Page) -> RepoResult<PageId> {
        (**self).create_page(page)
    }

    fn get_page(&self, id: &str) -> RepoResult<Option<Page>> {
        (**self).get_page(id)
    }
}

/// SQLite-backed page repository.
pub struct SqlitePageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePageRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PageRepository for SqlitePageRepository<'_> {
    fn create_page(&self, page: &Page) -> RepoResult<PageId> {
        page.validate()?;

        let messages = serde_json::to_string(&page.begging_messages)
            .map_err(|err| RepoError::InvalidData(format!("begging_messages encode: {err}")))?;

        self.conn.execute(
            "INSERT INTO valentine_pages (
                id,
                question,
                begging_messages,
                final_message,
                social_label,
                social_link,
                sender_name,
                receiver_name,
                creator_email,
                theme,
                decoration_type,
                custom_decoration_url,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                page.id.as_str(),
                page.question.as_str(),
                messages,
                page.final_message.as_str(),
                page.social_label.as_deref(),
                page.social_link.as_deref(),
                page.sender_name.as_deref(),
                page.receiver_name.as_deref(),
                page.creator_email.as_deref(),
                page.theme.as_str(),
                page.decoration_type.as_str(),
                page.custom_decoration_url.as_deref(),
                page.created_at,
            ],
        )?;

        Ok(page.id.clone())
    }

    fn get_page(&self, id: &str) -> RepoResult<Option<Page>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PAGE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_page_row(row)?));
        }

        Ok(None)
    }
}

fn parse_page_row(row: &Row<'_>) -> RepoResult<Page> {
    let messages_text: String = row.get("begging_messages")?;
    let begging_messages: Vec<String> = serde_json::from_str(&messages_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid json in valentine_pages.begging_messages: {err}"
        ))
    })?;

    let page = Page {
        id: row.get("id")?,
        question: row.get("question")?,
        begging_messages,
        final_message: row.get("final_message")?,
        social_label: row.get("social_label")?,
        social_link: row.get("social_link")?,
        sender_name: row.get("sender_name")?,
        receiver_name: row.get("receiver_name")?,
        creator_email: row.get("creator_email")?,
        theme: row.get("theme")?,
        decoration_type: row.get("decoration_type")?,
        custom_decoration_url: row.get("custom_decoration_url")?,
        created_at: row.get("created_at")?,
    };
    page.validate()?;
    Ok(page)
}
