//! Page composer use-case.
//!
//! # Responsibility
//! - Validate a draft and persist it as a new shareable page.
//! - Build and parse share links.
//!
//! # Invariants
//! - A draft without sender name never reaches storage.
//! - Blank begging messages are dropped; blank optional fields become `None`.
//! - Every call creates a distinct page.

use crate::config::ShareLinkConfig;
use crate::model::page::{generate_page_id, normalize_optional, Page, PageValidationError};
use crate::model::theme::{DEFAULT_DECORATION_ID, DEFAULT_THEME_ID};
use crate::repo::page_repo::{PageRepository, RepoError};
use log::{info, warn};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static SHARE_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#/v/([A-Za-z0-9_-]+)").expect("valid share link regex"));

pub const DEFAULT_QUESTION: &str = "Will you be my Valentine?";
pub const DEFAULT_FINAL_MESSAGE: &str =
    "I knew you would say yes! You just made me the happiest person ever!";
pub const DEFAULT_SOCIAL_LABEL: &str = "Message me on Instagram";
pub const DEFAULT_BEGGING_MESSAGES: &[&str] = &[
    "Are you sure?",
    "Really sure??",
    "Please? 🥺",
    "Pretty please? 💕",
    "Just say yes!",
    "I'll be so sad...",
    "You're breaking my heart! 💔",
    "Don't do this to me!",
];

/// Composer form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDraft {
    pub question: String,
    pub begging_messages: Vec<String>,
    pub final_message: String,
    pub social_label: String,
    pub social_link: String,
    pub sender_name: String,
    pub receiver_name: String,
    pub creator_email: String,
    pub theme: String,
    pub decoration_type: String,
    pub custom_decoration_url: String,
}

impl Default for PageDraft {
    fn default() -> Self {
        Self {
            question: DEFAULT_QUESTION.to_string(),
            begging_messages: DEFAULT_BEGGING_MESSAGES
                .iter()
                .map(ToString::to_string)
                .collect(),
            final_message: DEFAULT_FINAL_MESSAGE.to_string(),
            social_label: DEFAULT_SOCIAL_LABEL.to_string(),
            social_link: String::new(),
            sender_name: String::new(),
            receiver_name: String::new(),
            creator_email: String::new(),
            theme: DEFAULT_THEME_ID.to_string(),
            decoration_type: DEFAULT_DECORATION_ID.to_string(),
            custom_decoration_url: String::new(),
        }
    }
}

#[derive(Debug)]
pub enum ComposeError {
    /// The sender must say who the page is from.
    MissingSenderName,
    Invalid(PageValidationError),
    Repo(RepoError),
}

impl Display for ComposeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSenderName => write!(f, "sender name is required"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ComposeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingSenderName => None,
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ComposeError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

/// Result of a successful composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPage {
    pub page: Page,
    pub share_link: String,
}

pub struct ComposeService<P: PageRepository> {
    repo: P,
    share: ShareLinkConfig,
}

impl<P: PageRepository> ComposeService<P> {
    pub fn new(repo: P, share: ShareLinkConfig) -> Self {
        Self { repo, share }
    }

    /// Creates a page with a thread-local random id.
    pub fn create_page(&self, draft: &PageDraft) -> Result<CreatedPage, ComposeError> {
        self.create_page_with_rng(draft, &mut rand::rng())
    }

    /// Creates a page drawing its id from `rng`.
    pub fn create_page_with_rng<R: Rng + ?Sized>(
        &self,
        draft: &PageDraft,
        rng: &mut R,
    ) -> Result<CreatedPage, ComposeError> {
        let Some(sender_name) = normalize_optional(Some(&draft.sender_name)) else {
            warn!("event=page_create module=service status=rejected error_code=missing_sender_name");
            return Err(ComposeError::MissingSenderName);
        };

        let page = Page {
            id: generate_page_id(rng),
            question: non_blank_or(&draft.question, DEFAULT_QUESTION),
            begging_messages: draft
                .begging_messages
                .iter()
                .map(|message| message.trim())
                .filter(|message| !message.is_empty())
                .map(ToString::to_string)
                .collect(),
            final_message: draft.final_message.trim().to_string(),
            social_label: normalize_optional(Some(&draft.social_label)),
            social_link: normalize_optional(Some(&draft.social_link)),
            sender_name: Some(sender_name),
            receiver_name: normalize_optional(Some(&draft.receiver_name)),
            creator_email: normalize_optional(Some(&draft.creator_email)),
            theme: non_blank_or(&draft.theme, DEFAULT_THEME_ID),
            decoration_type: non_blank_or(&draft.decoration_type, DEFAULT_DECORATION_ID),
            custom_decoration_url: normalize_optional(Some(&draft.custom_decoration_url)),
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        self.repo.create_page(&page)?;
        info!(
            "event=page_create module=service status=ok messages={} has_creator_email={}",
            page.begging_messages.len(),
            page.creator_email.is_some()
        );

        let share_link = share_link(&self.share, &page.id);
        Ok(CreatedPage { page, share_link })
    }
}

/// Builds `<origin>/<app_path>/#/v/<pageId>`.
pub fn share_link(share: &ShareLinkConfig, page_id: &str) -> String {
    let origin = share.origin.trim_end_matches('/');
    let app_path = share.app_path.trim_matches('/');
    if app_path.is_empty() {
        format!("{origin}/#/v/{page_id}")
    } else {
        format!("{origin}/{app_path}/#/v/{page_id}")
    }
}

/// Extracts the page id from a share link.
pub fn parse_share_link(link: &str) -> Option<String> {
    SHARE_LINK_RE
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
