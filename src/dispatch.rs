//! Command dispatch to the input-synthesis collaborator.
//!
//! Commands arrive from two producers — inbound client messages and the
//! server-side gesture tracker — and both funnel through one
//! [`CommandDispatcher`]. The dispatcher owns the held-key dedup set (so
//! the collaborator never sees unbalanced press/release pairs) and the
//! last known pointer position, clamped to the configured virtual screen.
//! Synthesis failures are logged and never roll back dedup state.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::protocol::ClientMessage;
use crate::synth::{InputSynthesis, Key};

/// One discrete command token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Absolute pointer target, normalized x in [0,1] of the screen width.
    MoveTo { x: f64 },
    /// One directional pointer nudge, `dir` is -1 or +1.
    TurnPulse { dir: i8 },
    HoldStart { key: Key },
    HoldStop { key: Key },
}

impl Command {
    /// Map an inbound client message to a command. A `MOUSE_MOVE` with
    /// neither `dir` nor `x` carries nothing and is dropped.
    pub fn from_client(msg: &ClientMessage) -> Option<Command> {
        match msg {
            ClientMessage::MouseMove { dir: Some(dir), .. } => {
                Some(Command::TurnPulse { dir: dir.signum() })
            }
            ClientMessage::MouseMove { x: Some(x), .. } => Some(Command::MoveTo { x: *x }),
            ClientMessage::MouseMove { dir: None, x: None } => None,
            ClientMessage::WDown => Some(Command::HoldStart { key: Key::W }),
            ClientMessage::WUp => Some(Command::HoldStop { key: Key::W }),
        }
    }
}

struct DispatchState {
    held: HashSet<Key>,
    pointer_x: f64,
    pointer_y: f64,
}

/// Deduplicating bridge between command producers and input synthesis.
pub struct CommandDispatcher {
    synth: Arc<dyn InputSynthesis>,
    screen_width: f64,
    turn_step: f64,
    state: Mutex<DispatchState>,
}

impl CommandDispatcher {
    pub fn new(synth: Arc<dyn InputSynthesis>, config: &Config) -> Self {
        Self {
            synth,
            screen_width: config.screen_width,
            turn_step: config.turn_step,
            // Pointer starts at the screen center.
            state: Mutex::new(DispatchState {
                held: HashSet::new(),
                pointer_x: config.screen_width / 2.0,
                pointer_y: config.screen_height / 2.0,
            }),
        }
    }

    pub fn dispatch(&self, cmd: Command) {
        let mut state = self.state.lock();
        match cmd {
            Command::HoldStart { key } => {
                if state.held.insert(key) {
                    if let Err(e) = self.synth.press_key(key) {
                        // Held-state is kept: no automatic retry, known
                        // divergence risk against the actual OS state.
                        tracing::warn!("press {} failed: {e}", key.name());
                    }
                }
            }
            Command::HoldStop { key } => {
                if state.held.remove(&key) {
                    if let Err(e) = self.synth.release_key(key) {
                        tracing::warn!("release {} failed: {e}", key.name());
                    }
                }
            }
            Command::MoveTo { x } => {
                state.pointer_x = (x * self.screen_width).clamp(0.0, self.screen_width);
                self.move_pointer(&state);
            }
            Command::TurnPulse { dir } => {
                let dx = f64::from(dir) * self.turn_step;
                state.pointer_x = (state.pointer_x + dx).clamp(0.0, self.screen_width);
                self.move_pointer(&state);
            }
        }
    }

    fn move_pointer(&self, state: &DispatchState) {
        if let Err(e) = self.synth.move_to(state.pointer_x, state.pointer_y) {
            tracing::warn!("pointer move failed: {e}");
        }
    }

    /// Current pointer position.
    pub fn pointer(&self) -> (f64, f64) {
        let state = self.state.lock();
        (state.pointer_x, state.pointer_y)
    }
}
