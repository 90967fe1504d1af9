//! Floating background decorations.
//!
//! # Invariants
//! - A generated field always holds exactly [`FLOATING_ITEM_COUNT`] items.
//! - `left_percent` is within `[0, 100)`, `size_px` within `[16, 36)`.
//! - [`FloatingField`] regenerates only when its inputs change.

use crate::model::theme::{lookup_decoration, DecorationSet};
use rand::Rng;
use serde::Serialize;
use std::ops::Range;

pub const FLOATING_ITEM_COUNT: usize = 15;
pub const LEFT_PERCENT_RANGE: Range<f64> = 0.0..100.0;
pub const DELAY_SECS_RANGE: Range<f64> = 0.0..6.0;
pub const DURATION_SECS_RANGE: Range<f64> = 4.0..8.0;
pub const SIZE_PX_RANGE: Range<f64> = 16.0..36.0;

/// What one floating item renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FloatingVisual {
    Glyph(&'static str),
    Image(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatingItem {
    pub id: usize,
    pub visual: FloatingVisual,
    pub left_percent: f64,
    pub delay_secs: f64,
    pub duration_secs: f64,
    pub size_px: f64,
}

/// Generates one field of floating items.
///
/// A non-blank `custom_image_url` replaces every glyph with that image.
pub fn generate_floating_items<R: Rng + ?Sized>(
    decoration: &DecorationSet,
    custom_image_url: Option<&str>,
    rng: &mut R,
) -> Vec<FloatingItem> {
    let symbols = decoration.effective_symbols();
    let custom_image_url = custom_image_url.map(str::trim).filter(|url| !url.is_empty());

    (0..FLOATING_ITEM_COUNT)
        .map(|id| {
            let visual = match custom_image_url {
                Some(url) => FloatingVisual::Image(url.to_string()),
                None => FloatingVisual::Glyph(symbols[rng.random_range(0..symbols.len())]),
            };
            FloatingItem {
                id,
                visual,
                left_percent: rng.random_range(LEFT_PERCENT_RANGE),
                delay_secs: rng.random_range(DELAY_SECS_RANGE),
                duration_secs: rng.random_range(DURATION_SECS_RANGE),
                size_px: rng.random_range(SIZE_PX_RANGE),
            }
        })
        .collect()
}

/// Memoized floating field keyed by decoration id and custom image.
#[derive(Debug, Default)]
pub struct FloatingField {
    key: Option<(String, Option<String>)>,
    items: Vec<FloatingItem>,
    generation: u64,
}

impl FloatingField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current items, regenerating only when the key changed.
    pub fn items<R: Rng + ?Sized>(
        &mut self,
        decoration_id: &str,
        custom_image_url: Option<&str>,
        rng: &mut R,
    ) -> &[FloatingItem] {
        let unchanged = self.key.as_ref().is_some_and(|(id, url)| {
            id == decoration_id && url.as_deref() == custom_image_url
        });

        if !unchanged {
            let decoration = lookup_decoration(decoration_id);
            self.items = generate_floating_items(decoration, custom_image_url, rng);
            self.key = Some((
                decoration_id.to_string(),
                custom_image_url.map(ToString::to_string),
            ));
            self.generation += 1;
        }

        &self.items
    }

    /// Number of regenerations so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
