//! Outbound collaborators of the acceptance flow.
//!
//! # Responsibility
//! - Turn a captured celebration view into PNG bytes.
//! - Upload snapshots to object storage and return a public URL.
//! - Relay "they said yes" notifications to the email webhook.
//!
//! # Invariants
//! - Every collaborator is a trait so the flow can run against fakes.
//! - No call is retried; callers decide how failures degrade.

use crate::model::page::PageId;
use crate::repo::page_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod notify;
pub mod snapshot;
pub mod storage;

pub type RelayResult<T> = Result<T, RelayError>;

/// Error for capture, storage and notification calls.
#[derive(Debug)]
pub enum RelayError {
    Capture(String),
    Http(reqwest::Error),
    Status { status: u16, body: String },
    Io(std::io::Error),
    NotConfigured(&'static str),
    MissingPageId,
    PageNotFound(PageId),
    Repo(RepoError),
}

impl RelayError {
    /// Stable machine-readable code for logs and bridge envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Capture(_) => "capture_failed",
            Self::Http(_) => "http_failed",
            Self::Status { .. } => "bad_status",
            Self::Io(_) => "io_failed",
            Self::NotConfigured(_) => "not_configured",
            Self::MissingPageId => "missing_page_id",
            Self::PageNotFound(_) => "page_not_found",
            Self::Repo(_) => "repo_failed",
        }
    }
}

impl Display for RelayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Capture(message) => write!(f, "snapshot capture failed: {message}"),
            Self::Http(err) => write!(f, "{err}"),
            Self::Status { status, body } => write!(f, "remote returned [{status}]: {body}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::NotConfigured(what) => write!(f, "{what} is not configured"),
            Self::MissingPageId => write!(f, "missing pageId"),
            Self::PageNotFound(id) => write!(f, "page not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RelayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<std::io::Error> for RelayError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RepoError> for RelayError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Maps a non-success HTTP response to `RelayError::Status`.
fn check_status(response: reqwest::blocking::Response) -> RelayResult<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(RelayError::Status {
        status: status.as_u16(),
        body,
    })
}
