//! Skelcast: body-tracking WebSocket bridge with gesture-derived input.
//!
//! The daemon turns a raw skeletal joint stream into two outputs: a
//! broadcast visualization protocol (JSON frames over WebSocket) and a
//! debounced gesture-to-command pipeline feeding an input-synthesis
//! collaborator.
//!
//! # Architecture
//!
//! ```text
//! sensor ──raw frames──► normalize_frame ──► GestureTracker ──► CommandDispatcher
//!                              │                                      ▲
//!                              ▼                                      │
//!                       SessionRegistry ──broadcast──► clients ──commands┘
//! ```
//!
//! The [`session::SessionRegistry`] keys the sensor body-reader lifecycle
//! to the connected-client count (first client opens it, last one closes
//! it). Gesture recognition runs server-side against the normalized
//! stream; [`gesture::GestureTracker`] is plain library API, so an
//! embedding that evaluates gestures client-side and relays commands over
//! the same wire protocol stays possible.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod gesture;
pub mod protocol;
pub mod sensor;
pub mod session;
pub mod synth;

// Re-export commonly used types
pub use config::Config;
pub use connection::handle_connection;
pub use dispatch::{Command, CommandDispatcher};
pub use error::{Result, SkelcastError};
pub use frame::{normalize_frame, BodyFrame, HandState, JointType, Resolution, TrackingState};
pub use gesture::GestureTracker;
pub use protocol::{ClientMessage, ServerMessage};
pub use sensor::{BodySensor, ReplaySensor};
pub use session::SessionRegistry;
pub use synth::{InputSynthesis, Key, LogSynth};
