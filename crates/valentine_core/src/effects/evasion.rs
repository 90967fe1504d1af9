//! Evasive "No" control.
//!
//! # Responsibility
//! - Compute where the decline control jumps when the recipient reaches for it.
//! - Track the attempt counter and the derived pressure on the recipient
//!   (begging message, growing accept control, hidden decline control).
//!
//! # Invariants
//! - `attempts` only grows, by exactly one per accepted rejection signal.
//! - Signals within [`DODGE_COOLDOWN`] of the last accepted one are ignored.
//! - Dodge targets keep the whole control inside the viewport minus
//!   [`VISIBLE_MARGIN_PX`], collapsing to the center on tiny viewports.

use rand::Rng;
use serde::Serialize;
use std::time::Duration;

pub const DODGE_COOLDOWN: Duration = Duration::from_millis(600);
pub const DODGING_FLAG_DURATION: Duration = Duration::from_millis(200);
pub const FAKE_OUT_JUMP_DELAY: Duration = Duration::from_millis(70);
pub const FEEDBACK_GLYPH_LIFETIME: Duration = Duration::from_millis(1600);

/// Attempts after which the decline control is hidden.
pub const HIDE_DECLINE_AFTER: u32 = 10;
/// Attempts after which the decline control shakes.
pub const SHAKE_AFTER: u32 = 4;
pub const MAX_ACCEPT_SCALE: f64 = 3.8;
const ACCEPT_SCALE_STEP: f64 = 0.5;

const BASE_PEEK_PX: f64 = 120.0;
const TEASE_RADIUS_PX: f64 = 180.0;
const TEASE_FACTOR: f64 = 0.4;
/// Fraction of the perpendicular axis used for the random component.
const EDGE_SPREAD: f64 = 0.7;
pub const CONTROL_EXTENT_PX: f64 = 140.0;
pub const VISIBLE_MARGIN_PX: f64 = 90.0;
const CLOSE_POINTER_PX: f64 = 120.0;
const CLOSE_POINTER_TIGHTEN_PX: f64 = 40.0;
const FAKE_OUT_DECAY: f64 = 0.5;
const TRANSITION_SECS_MIN: f64 = 0.35;
const TRANSITION_SECS_SPREAD: f64 = 0.5;

const FEEDBACK_GLYPHS: &[&str] = &["😭", "🥺", "💔", "😢", "❤️", "💕", "😿", "🙏", "✨", "💔"];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Primary input device class of the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Mouse or trackpad: hovering over the control triggers the dodge.
    Fine,
    /// Touch: touching the control triggers the dodge.
    Coarse,
}

/// Raw interaction reported by the shell for the decline control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    PointerEnter,
    TouchStart,
    Click,
}

impl PointerKind {
    /// Whether `event` counts as a rejection signal on this device class.
    pub fn is_rejection_trigger(self, event: ControlEvent) -> bool {
        matches!(
            (self, event),
            (Self::Fine, ControlEvent::PointerEnter) | (Self::Coarse, ControlEvent::TouchStart)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Two-phase move computed for one dodge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DodgePlan {
    pub edge: Edge,
    /// Offset applied immediately: the current offset pulled toward center.
    pub fake_out: Point,
    /// Offset applied after `jump_delay`.
    pub target: Point,
    pub jump_delay: Duration,
    /// Animated transition length for both phases.
    pub transition: Duration,
    pub pointer_distance: f64,
}

/// Computes the next decline-control offset.
///
/// Offsets are relative to the viewport center. A pointer near the center
/// pushes the control further inside the viewport so it stays tempting.
pub fn plan_dodge<R: Rng + ?Sized>(
    pointer: Point,
    viewport: Viewport,
    current: Point,
    rng: &mut R,
) -> DodgePlan {
    let center = viewport.center();
    let distance = (pointer.x - center.x).hypot(pointer.y - center.y);
    let tease_boost = (TEASE_RADIUS_PX - distance).max(0.0);
    let peek = BASE_PEEK_PX + tease_boost * TEASE_FACTOR;

    let half_w = viewport.width / 2.0;
    let half_h = viewport.height / 2.0;
    let edge = match rng.random_range(0..4) {
        0 => Edge::Left,
        1 => Edge::Right,
        2 => Edge::Top,
        _ => Edge::Bottom,
    };
    let spread = rng.random::<f64>() - 0.5;
    let raw = match edge {
        Edge::Left => Point::new(-half_w + peek, spread * viewport.height * EDGE_SPREAD),
        Edge::Right => Point::new(half_w - peek, spread * viewport.height * EDGE_SPREAD),
        Edge::Top => Point::new(spread * viewport.width * EDGE_SPREAD, -half_h + peek),
        Edge::Bottom => Point::new(spread * viewport.width * EDGE_SPREAD, half_h - peek),
    };

    let transition = Duration::from_secs_f64(
        TRANSITION_SECS_MIN + rng.random::<f64>() * TRANSITION_SECS_SPREAD,
    );

    DodgePlan {
        edge,
        fake_out: Point::new(current.x * FAKE_OUT_DECAY, current.y * FAKE_OUT_DECAY),
        target: clamp_target(raw, viewport, distance),
        jump_delay: FAKE_OUT_JUMP_DELAY,
        transition,
        pointer_distance: distance,
    }
}

/// Clamps an offset so the whole control stays visible.
pub fn clamp_target(target: Point, viewport: Viewport, pointer_distance: f64) -> Point {
    let inset = CONTROL_EXTENT_PX / 2.0 + VISIBLE_MARGIN_PX;
    let tighten = if pointer_distance < CLOSE_POINTER_PX {
        CLOSE_POINTER_TIGHTEN_PX
    } else {
        0.0
    };

    Point::new(
        clamp_axis(target.x, viewport.width / 2.0 - inset - tighten),
        clamp_axis(target.y, viewport.height / 2.0 - inset - tighten),
    )
}

/// Non-finite or non-positive limits, and NaN offsets, collapse to center.
fn clamp_axis(value: f64, limit: f64) -> f64 {
    if !limit.is_finite() || limit <= 0.0 || value.is_nan() {
        0.0
    } else {
        value.clamp(-limit, limit)
    }
}

/// Short-lived glyph burst shown after a dodge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackGlyph {
    pub id: u64,
    pub glyph: &'static str,
    /// Horizontal position within the card, in percent.
    pub x_percent: f64,
    /// Vertical position within the card, in percent.
    pub y_percent: f64,
    pub expires_at_ms: u64,
}

/// One rejection signal as observed by the shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectionSignal {
    pub kind: PointerKind,
    pub pointer: Point,
    pub viewport: Viewport,
    pub now_ms: u64,
}

/// Effects of an accepted rejection signal.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionOutcome {
    pub plan: DodgePlan,
    pub attempts: u32,
    pub glyphs: Vec<FeedbackGlyph>,
    /// Touch dodges swallow the click the browser synthesizes afterwards.
    pub blocks_accept_click: bool,
}

/// Per-view evasion session state. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct EvasionState {
    attempts: u32,
    offset: Point,
    pending_jump: Option<(u64, Point)>,
    pointer: Point,
    dodging_until_ms: Option<u64>,
    last_dodge_ms: Option<u64>,
    accept_click_blocked: bool,
    glyphs: Vec<FeedbackGlyph>,
    next_glyph_id: u64,
}

impl EvasionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Offset currently applied to the decline control.
    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Records the last known pointer position.
    pub fn pointer_moved(&mut self, pointer: Point) {
        self.pointer = pointer;
    }

    /// Handles one rejection signal.
    ///
    /// Returns `None` when the signal is debounced or the control is hidden.
    pub fn on_rejection_signal<R: Rng + ?Sized>(
        &mut self,
        signal: RejectionSignal,
        rng: &mut R,
    ) -> Option<RejectionOutcome> {
        if self.decline_hidden() {
            return None;
        }
        if let Some(last) = self.last_dodge_ms {
            if signal.now_ms.saturating_sub(last) < DODGE_COOLDOWN.as_millis() as u64 {
                return None;
            }
        }

        self.pointer = signal.pointer;
        self.last_dodge_ms = Some(signal.now_ms);
        self.dodging_until_ms = Some(signal.now_ms + DODGING_FLAG_DURATION.as_millis() as u64);

        let plan = plan_dodge(signal.pointer, signal.viewport, self.offset, rng);
        self.offset = plan.fake_out;
        self.pending_jump = Some((
            signal.now_ms + plan.jump_delay.as_millis() as u64,
            plan.target,
        ));

        self.attempts += 1;

        let glyphs = self.emit_glyphs(signal.now_ms, rng);
        let blocks_accept_click = signal.kind == PointerKind::Coarse;
        if blocks_accept_click {
            self.accept_click_blocked = true;
        }

        Some(RejectionOutcome {
            plan,
            attempts: self.attempts,
            glyphs,
            blocks_accept_click,
        })
    }

    fn emit_glyphs<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) -> Vec<FeedbackGlyph> {
        let count = rng.random_range(2..=3);
        let expires_at_ms = now_ms + FEEDBACK_GLYPH_LIFETIME.as_millis() as u64;
        let burst = (0..count)
            .map(|_| {
                self.next_glyph_id += 1;
                FeedbackGlyph {
                    id: self.next_glyph_id,
                    glyph: FEEDBACK_GLYPHS[rng.random_range(0..FEEDBACK_GLYPHS.len())],
                    x_percent: rng.random_range(15.0..85.0),
                    y_percent: rng.random_range(10.0..60.0),
                    expires_at_ms,
                }
            })
            .collect::<Vec<_>>();
        self.glyphs.extend(burst.iter().cloned());
        burst
    }

    /// Advances timers: lands the pending jump, clears the dodging flag and
    /// drops expired glyphs.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some((due_ms, target)) = self.pending_jump {
            if now_ms >= due_ms {
                self.offset = target;
                self.pending_jump = None;
            }
        }
        if self.dodging_until_ms.is_some_and(|until| now_ms >= until) {
            self.dodging_until_ms = None;
        }
        self.glyphs.retain(|glyph| glyph.expires_at_ms > now_ms);
    }

    /// Called once per rendered frame; releases a touch click block.
    pub fn on_frame(&mut self) {
        self.accept_click_blocked = false;
    }

    /// While dodging the control ignores pointer events.
    pub fn is_dodging(&self, now_ms: u64) -> bool {
        self.dodging_until_ms.is_some_and(|until| now_ms < until)
    }

    pub fn accept_click_blocked(&self) -> bool {
        self.accept_click_blocked
    }

    pub fn feedback_glyphs(&self) -> &[FeedbackGlyph] {
        &self.glyphs
    }

    pub fn decline_hidden(&self) -> bool {
        self.attempts > HIDE_DECLINE_AFTER
    }

    pub fn decline_shaking(&self) -> bool {
        self.attempts > SHAKE_AFTER
    }

    /// Scale factor of the accept control: `min(1 + attempts * 0.5, 3.8)`.
    pub fn accept_scale(&self) -> f64 {
        accept_scale(self.attempts)
    }

    /// Begging message for the current attempt, clamped to the last one.
    pub fn begging_message<'a>(&self, messages: &'a [String]) -> Option<&'a str> {
        begging_message(self.attempts, messages)
    }
}

pub fn accept_scale(attempts: u32) -> f64 {
    (1.0 + f64::from(attempts) * ACCEPT_SCALE_STEP).min(MAX_ACCEPT_SCALE)
}

pub fn begging_message(attempts: u32, messages: &[String]) -> Option<&str> {
    if attempts == 0 || messages.is_empty() {
        return None;
    }
    let index = (attempts as usize - 1).min(messages.len() - 1);
    Some(messages[index].as_str())
}

#[cfg(test)]
mod tests {
    use super::{clamp_axis, clamp_target, Point, Viewport};

    #[test]
    fn tiny_viewport_collapses_to_center() {
        let clamped = clamp_target(Point::new(200.0, -90.0), Viewport::new(300.0, 200.0), 500.0);
        assert_eq!(clamped, Point::ORIGIN);
    }

    #[test]
    fn clamp_axis_keeps_inner_values() {
        assert_eq!(clamp_axis(10.0, 50.0), 10.0);
        assert_eq!(clamp_axis(-80.0, 50.0), -50.0);
    }

    #[test]
    fn clamp_axis_collapses_non_finite_input() {
        assert_eq!(clamp_axis(10.0, f64::NAN), 0.0);
        assert_eq!(clamp_axis(10.0, f64::INFINITY), 0.0);
        assert_eq!(clamp_axis(f64::NAN, 50.0), 0.0);
    }

    #[test]
    fn close_pointer_tightens_bounds() {
        let viewport = Viewport::new(1000.0, 800.0);
        let far = clamp_target(Point::new(-1000.0, 1000.0), viewport, 400.0);
        let near = clamp_target(Point::new(-1000.0, 1000.0), viewport, 50.0);
        assert_eq!(far, Point::new(-340.0, 240.0));
        assert_eq!(near, Point::new(-300.0, 200.0));
    }
}
