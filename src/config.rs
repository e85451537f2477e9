//! Runtime configuration for the broadcast server and gesture pipeline.
//!
//! Built once at startup from CLI arguments and passed by reference to the
//! pipeline stages; nothing here is re-read after boot. The output
//! resolution is sent to clients in the one-time constants message and is
//! never re-negotiated per frame.

use std::time::Duration;

use crate::frame::Resolution;

/// Server-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind the WebSocket listener to.
    pub host: String,
    /// Port to bind the WebSocket listener to.
    pub port: u16,
    /// Output resolution for depth→pixel mapping, sent to clients at connect.
    pub resolution: Resolution,
    /// Minimum interval between repeated pulse-style gesture commands.
    pub min_interval: Duration,
    /// Virtual screen bounds the pointer is clamped to.
    pub screen_width: f64,
    pub screen_height: f64,
    /// Horizontal pointer step for one directional turn pulse, in pixels.
    pub turn_step: f64,
    /// Replay playback rate in frames per second.
    pub replay_fps: u32,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
            resolution: Resolution {
                width: 512,
                height: 424,
            },
            min_interval: Duration::from_millis(500),
            screen_width: 1920.0,
            screen_height: 1080.0,
            turn_step: 40.0,
            replay_fps: 30,
        }
    }
}
