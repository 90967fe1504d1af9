use valentine_core::model::theme::{
    decorations, lookup_decoration, lookup_theme, themes, DEFAULT_DECORATION_ID, DEFAULT_THEME_ID,
};

#[test]
fn every_registered_theme_resolves_to_itself() {
    for theme in themes() {
        assert_eq!(lookup_theme(theme.id).id, theme.id);
    }
    for decoration in decorations() {
        assert_eq!(lookup_decoration(decoration.id).id, decoration.id);
    }
}

#[test]
fn unknown_ids_fall_back_to_defaults() {
    assert_eq!(lookup_theme("neon").id, DEFAULT_THEME_ID);
    assert_eq!(lookup_theme("").id, DEFAULT_THEME_ID);
    assert_eq!(lookup_decoration("dragons").id, DEFAULT_DECORATION_ID);
}

#[test]
fn lookups_are_case_sensitive() {
    assert_eq!(lookup_theme("Purple").id, DEFAULT_THEME_ID);
    assert_eq!(lookup_theme("purple").id, "purple");
    assert_eq!(lookup_decoration("Hearts").id, DEFAULT_DECORATION_ID);
}

#[test]
fn css_variables_map_light_background_to_background() {
    let theme = lookup_theme("golden");
    let vars = theme.css_variables();
    let background = vars
        .iter()
        .find(|(name, _)| *name == "--background")
        .map(|(_, value)| *value);
    assert_eq!(background, Some(theme.colors.light_background));
    assert!(vars.iter().any(|(name, _)| *name == "--primary"));
}

#[test]
fn confetti_uses_theme_palette() {
    let theme = lookup_theme("Blue");
    let colors = theme.confetti_colors();
    assert!(colors.iter().all(|color| color.starts_with("hsl(")));
    assert!(colors.contains(&format!("hsl({})", theme.colors.primary)));
}

#[test]
fn diamond_set_uses_single_symbol() {
    let stunna = lookup_decoration("stunna");
    assert_eq!(stunna.effective_symbols(), &["💎"]);
    assert_eq!(stunna.main_emoji(), "💎");
}
