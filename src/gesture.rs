//! Gesture recognition over the normalized frame stream.
//!
//! [`GestureTracker`] keeps one debounce record per `trackingId` and
//! re-evaluates it on every frame. Two predicate families are derived from
//! joint positions, all in output pixel space and with any missing operand
//! evaluating false:
//!
//! * **raised** — hand above the head (numerically smaller y). The OR of
//!   both hands drives a single hold-style command, so raising the second
//!   hand while the first is up never double-fires the press.
//! * **extended** — hand beyond its elbow on the x axis (outward per side)
//!   with the hand above the spine. Drives pulse-style directional nudges,
//!   re-fired at most once per debounce interval while sustained. Both
//!   sides extended at once is neutral: no pulse either way.
//!
//! Hold edges fire on the transition only — the stop is unconditional of
//! the timer. Every body is evaluated independently, so one degenerate
//! skeleton cannot affect the others' recorded state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::dispatch::Command;
use crate::frame::{BodyFrame, JointType, TrackedBody};
use crate::synth::Key;

/// Debounce bookkeeping for one boolean condition.
#[derive(Debug, Default, Clone, Copy)]
struct DebouncedFlag {
    active: bool,
    last_fire: Option<Instant>,
}

impl DebouncedFlag {
    /// Observe a hold-style condition: `Some(true)` on the rising edge,
    /// `Some(false)` on the falling edge, `None` otherwise.
    fn hold_edge(&mut self, value: bool) -> Option<bool> {
        if value == self.active {
            return None;
        }
        self.active = value;
        Some(value)
    }

    /// Observe a pulse-style condition: true when a pulse should fire now,
    /// either on the rising edge or after the re-fire interval elapsed
    /// while sustained.
    fn pulse_fires(&mut self, value: bool, now: Instant, min_interval: Duration) -> bool {
        if !value {
            self.active = false;
            return false;
        }
        let rising = !self.active;
        self.active = true;
        let due = match self.last_fire {
            None => true,
            Some(last) => now.duration_since(last) >= min_interval,
        };
        if rising || due {
            self.last_fire = Some(now);
            true
        } else {
            false
        }
    }
}

/// Per-`trackingId` gesture state.
#[derive(Debug, Default)]
struct BodyGestures {
    any_raised: DebouncedFlag,
    turn_left: DebouncedFlag,
    turn_right: DebouncedFlag,
}

/// Edge-triggered, debounced gesture recognizer for the whole frame stream.
pub struct GestureTracker {
    min_interval: Duration,
    bodies: HashMap<u64, BodyGestures>,
}

impl GestureTracker {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            bodies: HashMap::new(),
        }
    }

    /// Evaluate one frame at time `now` and return the commands to emit.
    ///
    /// State for `trackingId`s no longer present is released, after first
    /// closing any hold that was still active — ids are not guaranteed to
    /// be reused, so keeping them would leak and could swallow a key-up.
    pub fn evaluate(&mut self, frame: &BodyFrame, now: Instant) -> Vec<Command> {
        let mut commands = Vec::new();

        for body in frame.bodies.iter().filter(|b| b.tracked) {
            let state = self.bodies.entry(body.tracking_id).or_default();
            evaluate_body(body, state, now, self.min_interval, &mut commands);
        }

        self.bodies.retain(|id, state| {
            let present = frame
                .bodies
                .iter()
                .any(|b| b.tracked && b.tracking_id == *id);
            if !present && state.any_raised.hold_edge(false) == Some(false) {
                tracing::debug!("body {id} gone while holding, releasing");
                commands.push(Command::HoldStop { key: Key::W });
            }
            present
        });

        commands
    }

    /// Number of bodies with live gesture state.
    pub fn tracked_count(&self) -> usize {
        self.bodies.len()
    }
}

fn evaluate_body(
    body: &TrackedBody,
    state: &mut BodyGestures,
    now: Instant,
    min_interval: Duration,
    commands: &mut Vec<Command>,
) {
    let raised = hand_raised(body, JointType::HandLeft) || hand_raised(body, JointType::HandRight);
    match state.any_raised.hold_edge(raised) {
        Some(true) => commands.push(Command::HoldStart { key: Key::W }),
        Some(false) => commands.push(Command::HoldStop { key: Key::W }),
        None => {}
    }

    let left = hand_extended(body, JointType::HandLeft, JointType::ElbowLeft, Side::Left);
    let right = hand_extended(body, JointType::HandRight, JointType::ElbowRight, Side::Right);
    // Both sides extended is neutral, to avoid conflicting pulses in the
    // same frame.
    let both = left && right;
    let left = left && !both;
    let right = right && !both;

    if state.turn_left.pulse_fires(left, now, min_interval) {
        commands.push(Command::TurnPulse { dir: -1 });
    }
    if state.turn_right.pulse_fires(right, now, min_interval) {
        commands.push(Command::TurnPulse { dir: 1 });
    }
}

enum Side {
    Left,
    Right,
}

/// Hand above the head, pixel space. False when either joint is unusable.
fn hand_raised(body: &TrackedBody, hand: JointType) -> bool {
    match (body.usable_joint(hand), body.usable_joint(JointType::Head)) {
        (Some(hand), Some(head)) => hand.color_y < head.color_y,
        _ => false,
    }
}

/// Hand beyond its elbow outward, and above the spine. False when any
/// operand joint is unusable.
fn hand_extended(body: &TrackedBody, hand: JointType, elbow: JointType, side: Side) -> bool {
    let (hand, elbow, spine) = match (
        body.usable_joint(hand),
        body.usable_joint(elbow),
        body.usable_joint(JointType::SpineMid),
    ) {
        (Some(h), Some(e), Some(s)) => (h, e, s),
        _ => return false,
    };

    let beyond_elbow = match side {
        Side::Left => hand.color_x < elbow.color_x,
        Side::Right => hand.color_x > elbow.color_x,
    };
    beyond_elbow && hand.color_y < spine.color_y
}
