//! Input-synthesis seam.
//!
//! The OS-level side (real key and pointer injection) is an external
//! collaborator; the daemon only talks to it through [`InputSynthesis`].
//! [`LogSynth`] is the default implementation and just traces the calls,
//! which keeps the daemon runnable on machines without an injection
//! backend. [`RecordingSynth`] captures calls for assertions in tests.

use parking_lot::Mutex;

/// Logical keys the gesture pipeline can hold down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Hold-to-move forward key.
    W,
}

impl Key {
    pub fn name(&self) -> &'static str {
        match self {
            Key::W => "w",
        }
    }
}

/// Anything that can synthesize OS input from discrete commands.
pub trait InputSynthesis: Send + Sync {
    fn press_key(&self, key: Key) -> anyhow::Result<()>;
    fn release_key(&self, key: Key) -> anyhow::Result<()>;
    fn move_to(&self, x: f64, y: f64) -> anyhow::Result<()>;
}

/// Trace-only synthesis backend.
pub struct LogSynth;

impl InputSynthesis for LogSynth {
    fn press_key(&self, key: Key) -> anyhow::Result<()> {
        tracing::info!("synth: press {}", key.name());
        Ok(())
    }

    fn release_key(&self, key: Key) -> anyhow::Result<()> {
        tracing::info!("synth: release {}", key.name());
        Ok(())
    }

    fn move_to(&self, x: f64, y: f64) -> anyhow::Result<()> {
        tracing::debug!("synth: move to ({x:.1}, {y:.1})");
        Ok(())
    }
}

/// One recorded synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthCall {
    Press(Key),
    Release(Key),
    MoveTo(f64, f64),
}

/// Synthesis backend that records every call, for tests and dry runs.
#[derive(Default)]
pub struct RecordingSynth {
    calls: Mutex<Vec<SynthCall>>,
}

impl RecordingSynth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SynthCall> {
        self.calls.lock().clone()
    }

    pub fn press_count(&self, key: Key) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| **c == SynthCall::Press(key))
            .count()
    }

    pub fn release_count(&self, key: Key) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| **c == SynthCall::Release(key))
            .count()
    }
}

impl InputSynthesis for RecordingSynth {
    fn press_key(&self, key: Key) -> anyhow::Result<()> {
        self.calls.lock().push(SynthCall::Press(key));
        Ok(())
    }

    fn release_key(&self, key: Key) -> anyhow::Result<()> {
        self.calls.lock().push(SynthCall::Release(key));
        Ok(())
    }

    fn move_to(&self, x: f64, y: f64) -> anyhow::Result<()> {
        self.calls.lock().push(SynthCall::MoveTo(x, y));
        Ok(())
    }
}
