//! Valentine page model.
//!
//! # Responsibility
//! - Define the canonical page record written by the composer.
//! - Generate and validate short shareable page identifiers.
//!
//! # Invariants
//! - `id` is a short token over `A-Za-z0-9_-` and never reused.
//! - Optional text fields are `None` rather than empty strings.
//! - A page is never mutated after creation.

use crate::model::theme::{lookup_decoration, lookup_theme, DecorationSet, Theme};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Shareable page identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PageId = String;

/// Length of generated page identifiers.
pub const PAGE_ID_LEN: usize = 10;
const PAGE_ID_MAX_LEN: usize = 64;
const PAGE_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Validation error for page invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageValidationError {
    InvalidId(String),
    EmptyQuestion,
    EmptyOptionalField(&'static str),
}

impl Display for PageValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "invalid page id `{value}`"),
            Self::EmptyQuestion => write!(f, "question must not be empty"),
            Self::EmptyOptionalField(field) => {
                write!(f, "optional field `{field}` must be None instead of empty")
            }
        }
    }
}

impl Error for PageValidationError {}

/// Persisted valentine page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub question: String,
    /// Shown one by one as the recipient keeps refusing.
    pub begging_messages: Vec<String>,
    /// Shown on the celebration view.
    pub final_message: String,
    pub social_label: Option<String>,
    pub social_link: Option<String>,
    pub sender_name: Option<String>,
    pub receiver_name: Option<String>,
    /// Gates the acceptance notification. Never sent to the recipient.
    #[serde(skip_serializing)]
    pub creator_email: Option<String>,
    /// Theme id, resolved through the registry at render time.
    pub theme: String,
    /// Decoration set id, resolved through the registry at render time.
    pub decoration_type: String,
    pub custom_decoration_url: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Page {
    /// Validates page invariants before persistence.
    pub fn validate(&self) -> Result<(), PageValidationError> {
        if !is_valid_page_id(&self.id) {
            return Err(PageValidationError::InvalidId(self.id.clone()));
        }
        if self.question.trim().is_empty() {
            return Err(PageValidationError::EmptyQuestion);
        }

        let optional_fields = [
            ("social_label", &self.social_label),
            ("social_link", &self.social_link),
            ("sender_name", &self.sender_name),
            ("receiver_name", &self.receiver_name),
            ("creator_email", &self.creator_email),
            ("custom_decoration_url", &self.custom_decoration_url),
        ];
        for (name, value) in optional_fields {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(PageValidationError::EmptyOptionalField(name));
            }
        }

        Ok(())
    }

    /// Resolved theme, falling back to the default theme.
    pub fn resolved_theme(&self) -> &'static Theme {
        lookup_theme(&self.theme)
    }

    /// Resolved decoration set, falling back to the default set.
    pub fn resolved_decoration(&self) -> &'static DecorationSet {
        lookup_decoration(&self.decoration_type)
    }

    /// `From {sender} · To {receiver}` header, omitting missing parts.
    pub fn byline(&self) -> Option<String> {
        match (self.sender_name.as_deref(), self.receiver_name.as_deref()) {
            (Some(sender), Some(receiver)) => Some(format!("From {sender} · To {receiver}")),
            (Some(sender), None) => Some(format!("From {sender}")),
            (None, Some(receiver)) => Some(format!("To {receiver}")),
            (None, None) => None,
        }
    }

    /// Social link shown on the celebration view, only when both parts exist.
    pub fn social(&self) -> Option<(&str, &str)> {
        Some((self.social_label.as_deref()?, self.social_link.as_deref()?))
    }

    /// File name offered when the recipient saves the snapshot.
    pub fn snapshot_download_name(&self) -> String {
        format!("valentine-{}.png", self.id)
    }
}

/// Generates a fresh random page identifier.
pub fn generate_page_id<R: Rng + ?Sized>(rng: &mut R) -> PageId {
    (0..PAGE_ID_LEN)
        .map(|_| PAGE_ID_ALPHABET[rng.random_range(0..PAGE_ID_ALPHABET.len())] as char)
        .collect()
}

/// Returns whether `value` is a well-formed page identifier.
pub fn is_valid_page_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= PAGE_ID_MAX_LEN
        && value.bytes().all(|b| PAGE_ID_ALPHABET.contains(&b))
}

/// Normalizes optional user input: trims and maps blank to `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::{generate_page_id, is_valid_page_id, normalize_optional, PAGE_ID_LEN};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let first = generate_page_id(&mut rng);
        let second = generate_page_id(&mut rng);
        assert_eq!(first.len(), PAGE_ID_LEN);
        assert!(is_valid_page_id(&first));
        assert_ne!(first, second);
    }

    #[test]
    fn id_validation_rejects_path_characters() {
        assert!(!is_valid_page_id(""));
        assert!(!is_valid_page_id("../etc"));
        assert!(!is_valid_page_id("a b"));
        assert!(is_valid_page_id("V1_a-Zz09x"));
    }

    #[test]
    fn normalize_optional_maps_blank_to_none() {
        assert_eq!(normalize_optional(Some("  ")), None);
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some(" Sam ")).as_deref(), Some("Sam"));
    }
}
