//! WebSocket connection handler.
//!
//! One task per client: handshake, the one-time constants message, then a
//! select loop over inbound client messages and the per-session outbound
//! queue. Unparseable or unrecognized inbound messages are dropped
//! silently, per the wire contract.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};

use crate::config::Config;
use crate::dispatch::{Command, CommandDispatcher};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::SessionRegistry;

/// Handle a single WebSocket connection.
pub async fn handle_connection(
    stream: TcpStream,
    registry: Arc<SessionRegistry>,
    dispatcher: Arc<CommandDispatcher>,
    config: Config,
) {
    let addr = stream.peer_addr().ok();
    tracing::info!("new connection from {:?}", addr);

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::error!("WebSocket handshake failed: {e}");
            return;
        }
    };

    let mut conn = ConnectionState::new(ws_stream, registry, dispatcher);
    conn.run(&config).await;

    tracing::info!("connection closed from {:?}", addr);
}

/// State for a single connection.
struct ConnectionState {
    ws: WebSocketStream<TcpStream>,
    registry: Arc<SessionRegistry>,
    dispatcher: Arc<CommandDispatcher>,
    client_id: String,
    outbound_rx: mpsc::UnboundedReceiver<String>,
    outbound_tx: mpsc::UnboundedSender<String>,
}

impl ConnectionState {
    fn new(
        ws: WebSocketStream<TcpStream>,
        registry: Arc<SessionRegistry>,
        dispatcher: Arc<CommandDispatcher>,
    ) -> Self {
        let client_id = format!(
            "cli_{}",
            uuid::Uuid::new_v4().to_string().split('-').next().unwrap()
        );
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            ws,
            registry,
            dispatcher,
            client_id,
            outbound_rx,
            outbound_tx,
        }
    }

    async fn run(&mut self, config: &Config) {
        // Constants go out before the session joins the broadcast set, so
        // no frame can beat them onto the wire.
        if let Err(e) = self.send(&ServerMessage::constants(config.resolution)).await {
            tracing::error!("failed to send constants to {}: {e}", self.client_id);
            return;
        }

        self.registry
            .register(&self.client_id, self.outbound_tx.clone());

        loop {
            tokio::select! {
                msg = self.ws.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => self.handle_message(&text),
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("client {} requested close", self.client_id);
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = self.ws.send(Message::Pong(data)).await;
                        }
                        Some(Err(e)) => {
                            tracing::warn!("WebSocket error for {}: {e}", self.client_id);
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }

                queued = self.outbound_rx.recv() => {
                    match queued {
                        Some(json) => {
                            if let Err(e) = self.ws.send(Message::Text(json)).await {
                                tracing::warn!("send to {} failed: {e}", self.client_id);
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }

        // Closing is immediate: no drain of queued frames.
        self.registry.unregister(&self.client_id);
    }

    fn handle_message(&self, text: &str) {
        let msg: ClientMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(_) => {
                tracing::debug!("ignoring unparseable message from {}", self.client_id);
                return;
            }
        };
        if let Some(cmd) = Command::from_client(&msg) {
            self.dispatcher.dispatch(cmd);
        }
    }

    async fn send(&mut self, msg: &ServerMessage) -> anyhow::Result<()> {
        let json = serde_json::to_string(msg)?;
        self.ws.send(Message::Text(json)).await?;
        Ok(())
    }
}
