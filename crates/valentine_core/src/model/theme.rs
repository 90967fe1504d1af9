//! Static theme and decoration registries.
//!
//! # Responsibility
//! - Enumerate the selectable themes and floating decoration sets.
//! - Resolve ids to entries with a fixed default fallback.
//!
//! # Invariants
//! - Lookups are total: unknown ids resolve to the first entry.
//! - Every decoration set has a non-empty symbol list.

use serde::Serialize;

/// Named color tokens as HSL triplets (`"346 64% 58%"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub foreground: &'static str,
    pub muted: &'static str,
    pub card: &'static str,
    pub light_background: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub colors: ThemeColors,
    /// CSS gradient used as the card background.
    pub gradient: &'static str,
}

impl Theme {
    /// CSS custom properties applied to the page while the theme is active.
    ///
    /// The page background uses the light variant so the card gradient stands out.
    pub fn css_variables(&self) -> [(&'static str, &'static str); 7] {
        [
            ("--primary", self.colors.primary),
            ("--secondary", self.colors.secondary),
            ("--accent", self.colors.accent),
            ("--background", self.colors.light_background),
            ("--foreground", self.colors.foreground),
            ("--muted", self.colors.muted),
            ("--card", self.colors.card),
        ]
    }

    /// Confetti palette for the celebration burst.
    pub fn confetti_colors(&self) -> [String; 3] {
        [
            format!("hsl({})", self.colors.primary),
            format!("hsl({})", self.colors.secondary),
            format!("hsl({})", self.colors.accent),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecorationSet {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub symbols: &'static [&'static str],
}

impl DecorationSet {
    /// Symbols to draw from; the set emoji when the list is empty.
    pub fn effective_symbols(&self) -> &[&'static str] {
        if self.symbols.is_empty() {
            std::slice::from_ref(&self.emoji)
        } else {
            self.symbols
        }
    }

    /// Glyph shown next to the sender name after acceptance.
    pub fn main_emoji(&self) -> &'static str {
        self.symbols.first().copied().unwrap_or(self.emoji)
    }
}

const THEMES: &[Theme] = &[
    Theme {
        id: "Default",
        name: "Default",
        emoji: "🌹",
        colors: ThemeColors {
            primary: "346 64% 58%",
            secondary: "345 81% 80%",
            accent: "349 100% 69%",
            background: "20 50% 98%",
            foreground: "350 30% 20%",
            muted: "350 15% 45%",
            card: "20 40% 97%",
            light_background: "346 60% 90%",
        },
        gradient: "linear-gradient(135deg, hsl(345 70% 75%) 0%, hsl(346 77% 60%) 50%, hsl(349 83% 50%) 100%)",
    },
    Theme {
        id: "Blue",
        name: "Blue",
        emoji: "🌊",
        colors: ThemeColors {
            primary: "210 64% 58%",
            secondary: "209 81% 80%",
            accent: "213 100% 69%",
            background: "210 50% 98%",
            foreground: "210 30% 20%",
            muted: "210 15% 45%",
            card: "210 40% 97%",
            light_background: "210 70% 85%",
        },
        gradient: "linear-gradient(135deg, hsl(209 70% 75%) 0%, hsl(210 77% 60%) 50%, hsl(213 83% 50%) 100%)",
    },
    Theme {
        id: "purple",
        name: "Purple",
        emoji: "🌙",
        colors: ThemeColors {
            primary: "260 64% 58%",
            secondary: "259 81% 80%",
            accent: "263 100% 69%",
            background: "260 30% 10%",
            foreground: "260 20% 95%",
            muted: "260 20% 55%",
            card: "260 25% 15%",
            light_background: "260 50% 20%",
        },
        gradient: "linear-gradient(135deg, hsl(259 70% 75%) 0%, hsl(260 77% 60%) 50%, hsl(263 83% 50%) 100%)",
    },
    Theme {
        id: "Red",
        name: "Red",
        emoji: "❤️‍🔥",
        colors: ThemeColors {
            primary: "2 64% 58%",
            secondary: "1 81% 80%",
            accent: "5 100% 69%",
            background: "0 30% 97%",
            foreground: "0 40% 15%",
            muted: "0 20% 45%",
            card: "0 40% 96%",
            light_background: "0 80% 88%",
        },
        gradient: "linear-gradient(135deg, hsl(1 70% 75%) 0%, hsl(2 77% 60%) 50%, hsl(5 83% 50%) 100%)",
    },
    Theme {
        id: "golden",
        name: "Gold",
        emoji: "✨",
        colors: ThemeColors {
            primary: "40 90% 50%",
            secondary: "45 70% 92%",
            accent: "25 85% 55%",
            background: "45 60% 98%",
            foreground: "30 40% 20%",
            muted: "40 25% 45%",
            card: "45 50% 97%",
            light_background: "40 80% 85%",
        },
        gradient: "linear-gradient(135deg, hsl(50 80% 70%) 0%, hsl(40 90% 55%) 50%, hsl(25 85% 50%) 100%)",
    },
];

const DECORATIONS: &[DecorationSet] = &[
    DecorationSet {
        id: "hearts",
        name: "Hearts",
        emoji: "💕",
        symbols: &["💕", "💖", "💗", "💓", "💝", "❤️", "🩷", "🤍", "💌"],
    },
    DecorationSet {
        id: "bears",
        name: "Teddy Bears",
        emoji: "🧸",
        symbols: &["🧸", "🐻", "🐻‍❄️", "🧸", "🐻", "🐻‍❄️", "🎀"],
    },
    DecorationSet {
        id: "stars",
        name: "Stars",
        emoji: "⭐",
        symbols: &["⭐", "✨", "🌟", "💫", "🌠", "✦", "★", "🌙"],
    },
    DecorationSet {
        id: "flowers",
        name: "Flowers",
        emoji: "🌸",
        symbols: &["🌸", "🌺", "🌹", "🌷", "💐", "🌻", "🌼", "🪻"],
    },
    DecorationSet {
        id: "stunna",
        name: "Diamonds",
        emoji: "💎",
        symbols: &["💎"],
    },
];

/// Id of the theme used for unknown lookups.
pub const DEFAULT_THEME_ID: &str = "Default";
/// Id of the decoration set used for unknown lookups.
pub const DEFAULT_DECORATION_ID: &str = "hearts";

/// All selectable themes, default first.
pub fn themes() -> &'static [Theme] {
    THEMES
}

/// All selectable decoration sets, default first.
pub fn decorations() -> &'static [DecorationSet] {
    DECORATIONS
}

/// Resolves a theme id; unknown ids fall back to [`DEFAULT_THEME_ID`].
pub fn lookup_theme(id: &str) -> &'static Theme {
    THEMES
        .iter()
        .find(|theme| theme.id == id)
        .unwrap_or(&THEMES[0])
}

/// Resolves a decoration id; unknown ids fall back to [`DEFAULT_DECORATION_ID`].
pub fn lookup_decoration(id: &str) -> &'static DecorationSet {
    DECORATIONS
        .iter()
        .find(|decoration| decoration.id == id)
        .unwrap_or(&DECORATIONS[0])
}

#[cfg(test)]
mod tests {
    use super::{DecorationSet, DECORATIONS, DEFAULT_DECORATION_ID, DEFAULT_THEME_ID, THEMES};

    #[test]
    fn defaults_are_first_entries() {
        assert_eq!(THEMES[0].id, DEFAULT_THEME_ID);
        assert_eq!(DECORATIONS[0].id, DEFAULT_DECORATION_ID);
    }

    #[test]
    fn every_registered_set_has_symbols() {
        assert!(DECORATIONS.iter().all(|set| !set.symbols.is_empty()));
    }

    #[test]
    fn empty_symbol_list_falls_back_to_emoji() {
        let bare = DecorationSet {
            id: "bare",
            name: "Bare",
            emoji: "🎈",
            symbols: &[],
        };
        assert_eq!(bare.effective_symbols(), &["🎈"]);
        assert_eq!(bare.main_emoji(), "🎈");
    }
}
