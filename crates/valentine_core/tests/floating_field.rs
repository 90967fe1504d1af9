use rand::rngs::StdRng;
use rand::SeedableRng;
use valentine_core::effects::floating::{
    generate_floating_items, FloatingField, FloatingVisual, FLOATING_ITEM_COUNT,
};
use valentine_core::lookup_decoration;

#[test]
fn field_has_fixed_count_and_bounded_values() {
    let mut rng = StdRng::seed_from_u64(7);
    let items = generate_floating_items(lookup_decoration("stars"), None, &mut rng);

    assert_eq!(items.len(), FLOATING_ITEM_COUNT);
    let symbols = lookup_decoration("stars").symbols;
    for item in &items {
        assert!((0.0..100.0).contains(&item.left_percent));
        assert!((0.0..6.0).contains(&item.delay_secs));
        assert!((4.0..8.0).contains(&item.duration_secs));
        assert!((16.0..36.0).contains(&item.size_px));
        match &item.visual {
            FloatingVisual::Glyph(glyph) => assert!(symbols.contains(glyph)),
            other => panic!("unexpected visual: {other:?}"),
        }
    }
}

#[test]
fn custom_image_replaces_every_glyph() {
    let mut rng = StdRng::seed_from_u64(1);
    let items = generate_floating_items(
        lookup_decoration("hearts"),
        Some(" https://cdn.example/cat.png "),
        &mut rng,
    );
    assert!(items
        .iter()
        .all(|item| item.visual == FloatingVisual::Image("https://cdn.example/cat.png".into())));
}

#[test]
fn blank_custom_image_keeps_glyphs() {
    let mut rng = StdRng::seed_from_u64(1);
    let items = generate_floating_items(lookup_decoration("hearts"), Some("   "), &mut rng);
    assert!(items
        .iter()
        .all(|item| matches!(item.visual, FloatingVisual::Glyph(_))));
}

#[test]
fn field_regenerates_only_when_inputs_change() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut field = FloatingField::new();

    let first = field.items("bears", None, &mut rng).to_vec();
    let again = field.items("bears", None, &mut rng).to_vec();
    assert_eq!(first, again);
    assert_eq!(field.generation(), 1);

    field.items("flowers", None, &mut rng);
    assert_eq!(field.generation(), 2);

    field.items("flowers", Some("https://cdn.example/a.png"), &mut rng);
    assert_eq!(field.generation(), 3);
}
