use rand::rngs::StdRng;
use rand::SeedableRng;
use valentine_core::effects::evasion::{
    accept_scale, begging_message, clamp_target, plan_dodge, ControlEvent, EvasionState, Point,
    PointerKind, RejectionSignal, Viewport, CONTROL_EXTENT_PX, DODGE_COOLDOWN,
    FEEDBACK_GLYPH_LIFETIME, HIDE_DECLINE_AFTER, MAX_ACCEPT_SCALE, VISIBLE_MARGIN_PX,
};

const VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 720.0,
};

fn signal(kind: PointerKind, now_ms: u64) -> RejectionSignal {
    RejectionSignal {
        kind,
        pointer: Point::new(700.0, 380.0),
        viewport: VIEWPORT,
        now_ms,
    }
}

fn cooldown_ms() -> u64 {
    DODGE_COOLDOWN.as_millis() as u64
}

#[test]
fn signals_within_cooldown_are_ignored() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut state = EvasionState::new();

    assert!(state
        .on_rejection_signal(signal(PointerKind::Fine, 1_000), &mut rng)
        .is_some());
    assert!(state
        .on_rejection_signal(signal(PointerKind::Fine, 1_000 + cooldown_ms() - 1), &mut rng)
        .is_none());
    assert_eq!(state.attempts(), 1);

    let outcome = state
        .on_rejection_signal(signal(PointerKind::Fine, 1_000 + cooldown_ms()), &mut rng)
        .expect("signal after cooldown must dodge");
    assert_eq!(outcome.attempts, 2);
    assert_eq!(state.attempts(), 2);
}

#[test]
fn attempts_grow_by_one_and_hide_decline_after_threshold() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut state = EvasionState::new();
    let mut now = 0;

    for expected in 1..=HIDE_DECLINE_AFTER + 1 {
        let outcome = state
            .on_rejection_signal(signal(PointerKind::Fine, now), &mut rng)
            .expect("visible control must dodge");
        assert_eq!(outcome.attempts, expected);
        now += cooldown_ms();
    }

    assert!(state.decline_hidden());
    assert!(state.decline_shaking());
    assert!(state
        .on_rejection_signal(signal(PointerKind::Fine, now + 10_000), &mut rng)
        .is_none());
    assert_eq!(state.attempts(), HIDE_DECLINE_AFTER + 1);
}

#[test]
fn accept_scale_grows_then_caps() {
    assert_eq!(accept_scale(0), 1.0);
    assert_eq!(accept_scale(2), 2.0);
    assert_eq!(accept_scale(5), 3.5);
    assert_eq!(accept_scale(6), MAX_ACCEPT_SCALE);
    assert_eq!(accept_scale(40), MAX_ACCEPT_SCALE);
}

#[test]
fn begging_message_clamps_to_last_entry() {
    let messages = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    assert_eq!(begging_message(0, &messages), None);
    assert_eq!(begging_message(1, &messages), Some("one"));
    assert_eq!(begging_message(3, &messages), Some("three"));
    assert_eq!(begging_message(9, &messages), Some("three"));
    assert_eq!(begging_message(4, &[]), None);
}

#[test]
fn dodge_targets_stay_inside_viewport() {
    let mut rng = StdRng::seed_from_u64(99);
    let viewports = [
        Viewport::new(1280.0, 720.0),
        Viewport::new(390.0, 844.0),
        Viewport::new(320.0, 480.0),
    ];
    let inset = CONTROL_EXTENT_PX / 2.0 + VISIBLE_MARGIN_PX;

    for viewport in viewports {
        for step in 0..200 {
            let pointer = Point::new(
                (step as f64 * 37.0) % viewport.width,
                (step as f64 * 53.0) % viewport.height,
            );
            let plan = plan_dodge(pointer, viewport, Point::ORIGIN, &mut rng);
            let limit_x = (viewport.width / 2.0 - inset).max(0.0);
            let limit_y = (viewport.height / 2.0 - inset).max(0.0);
            assert!(plan.target.x.abs() <= limit_x, "x out of bounds: {plan:?}");
            assert!(plan.target.y.abs() <= limit_y, "y out of bounds: {plan:?}");
            assert!(plan.transition.as_secs_f64() >= 0.349);
            assert!(plan.transition.as_secs_f64() <= 0.851);
        }
    }
}

#[test]
fn fake_out_then_jump_lands_on_tick() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut state = EvasionState::new();

    let outcome = state
        .on_rejection_signal(signal(PointerKind::Fine, 500), &mut rng)
        .unwrap();
    assert_eq!(state.offset(), Point::ORIGIN);
    assert!(state.is_dodging(500));

    state.tick(500 + outcome.plan.jump_delay.as_millis() as u64);
    assert_eq!(state.offset(), outcome.plan.target);
    assert!(!state.is_dodging(1_000));
}

#[test]
fn feedback_glyphs_expire_on_tick() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut state = EvasionState::new();

    let outcome = state
        .on_rejection_signal(signal(PointerKind::Fine, 0), &mut rng)
        .unwrap();
    assert!((2..=3).contains(&outcome.glyphs.len()));
    assert_eq!(state.feedback_glyphs().len(), outcome.glyphs.len());

    let lifetime = FEEDBACK_GLYPH_LIFETIME.as_millis() as u64;
    state.tick(lifetime - 1);
    assert_eq!(state.feedback_glyphs().len(), outcome.glyphs.len());
    state.tick(lifetime);
    assert!(state.feedback_glyphs().is_empty());
}

#[test]
fn touch_dodge_blocks_the_next_accept_click_for_one_frame() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut state = EvasionState::new();

    assert!(PointerKind::Coarse.is_rejection_trigger(ControlEvent::TouchStart));
    assert!(!PointerKind::Coarse.is_rejection_trigger(ControlEvent::PointerEnter));
    assert!(PointerKind::Fine.is_rejection_trigger(ControlEvent::PointerEnter));

    let outcome = state
        .on_rejection_signal(signal(PointerKind::Coarse, 0), &mut rng)
        .unwrap();
    assert!(outcome.blocks_accept_click);
    assert!(state.accept_click_blocked());
    state.on_frame();
    assert!(!state.accept_click_blocked());

    let outcome = state
        .on_rejection_signal(signal(PointerKind::Fine, cooldown_ms()), &mut rng)
        .unwrap();
    assert!(!outcome.blocks_accept_click);
    assert!(!state.accept_click_blocked());
}

#[test]
fn clamp_target_collapses_axes_that_cannot_fit() {
    let narrow = Viewport::new(300.0, 1000.0);
    let clamped = clamp_target(Point::new(120.0, 900.0), narrow, 500.0);
    assert_eq!(clamped.x, 0.0);
    assert_eq!(clamped.y, 500.0 - CONTROL_EXTENT_PX / 2.0 - VISIBLE_MARGIN_PX);
}

#[test]
fn degenerate_viewports_park_the_control_at_center() {
    let mut rng = StdRng::seed_from_u64(5);
    let viewports = [
        Viewport::new(f64::NAN, 720.0),
        Viewport::new(f64::INFINITY, 720.0),
        Viewport::new(1280.0, f64::NEG_INFINITY),
    ];

    for viewport in viewports {
        let plan = plan_dodge(Point::ORIGIN, viewport, Point::new(40.0, -20.0), &mut rng);
        assert!(plan.target.x.is_finite() && plan.target.y.is_finite());
        if !viewport.width.is_finite() {
            assert_eq!(plan.target.x, 0.0);
        }
        if !viewport.height.is_finite() {
            assert_eq!(plan.target.y, 0.0);
        }
    }
}
