//! Client session registry and frame broadcast.
//!
//! The registry owns the set of connected clients and drives the sensor
//! body-reader lifecycle off the set's emptiness: the first registration
//! opens the reader, removing the last one closes it, re-evaluated
//! synchronously on every transition with no grace period. Broadcast is
//! best-effort telemetry: serialize once, fan out, and a failure on one
//! client never aborts delivery to the rest or evicts that client — only
//! an explicit unregister removes a session.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::protocol::ServerMessage;
use crate::sensor::BodySensor;

/// Per-session outbound handle: pre-serialized JSON text frames, queued
/// without backpressure. A slow client accumulates backlog here.
pub type SessionSender = mpsc::UnboundedSender<String>;

/// Connected-client set plus the sensor it keys.
pub struct SessionRegistry {
    sensor: Arc<dyn BodySensor>,
    clients: Mutex<HashMap<String, SessionSender>>,
}

impl SessionRegistry {
    pub fn new(sensor: Arc<dyn BodySensor>) -> Self {
        Self {
            sensor,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Add a session. Opens the body reader on the 0→1 transition.
    pub fn register(&self, client_id: &str, tx: SessionSender) {
        let was_empty = {
            let mut clients = self.clients.lock();
            let was_empty = clients.is_empty();
            clients.insert(client_id.to_string(), tx);
            was_empty
        };

        tracing::info!("client {} connected ({} total)", client_id, self.client_count());

        if was_empty {
            if let Err(e) = self.sensor.open_body_reader() {
                tracing::error!("failed to open body reader: {e}");
            }
        }
    }

    /// Remove a session. Closes the body reader on the 1→0 transition;
    /// the close is best-effort and never blocks removal.
    pub fn unregister(&self, client_id: &str) {
        let now_empty = {
            let mut clients = self.clients.lock();
            if clients.remove(client_id).is_none() {
                return;
            }
            clients.is_empty()
        };

        tracing::info!("client {} disconnected ({} total)", client_id, self.client_count());

        if now_empty {
            if let Err(e) = self.sensor.close_body_reader() {
                tracing::warn!("failed to close body reader: {e}");
            }
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Serialize once and fan out to every session. Per-client failures
    /// are logged and skipped for this message only.
    pub fn broadcast(&self, msg: &ServerMessage) {
        let json = match serde_json::to_string(msg) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("failed to serialize broadcast message: {e}");
                return;
            }
        };

        let clients = self.clients.lock();
        for (client_id, tx) in clients.iter() {
            if tx.send(json.clone()).is_err() {
                tracing::warn!("dropping frame for client {client_id}: connection gone");
            }
        }
    }
}
