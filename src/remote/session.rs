// ABOUTME: Persistent WebSocket session to the remote mirror on the /app namespace
// Redials forever; announces the project before any queued event on each (re)connect

use std::sync::Arc;

use anyhow::{anyhow, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::time::{sleep, Duration};
use tokio_tungstenite::{connect_async, tungstenite};
use tracing::{debug, info, warn};

use super::protocol::OutboundMessage;
use crate::config::WatchConfig;

/// Interval between redial attempts after a failed or dropped connection.
const RECONNECT_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub last_error: Option<String>,
    pub reconnect_attempts: u32,
}

/// The single outbound channel to the remote mirror for the process lifetime.
///
/// Events are queued on an unbounded channel and written as JSON text frames.
/// `send` is fire-and-forget: no acknowledgment, no delivery guarantee beyond
/// the transport's. Connection failures never reach the pipeline; the session
/// absorbs them and redials.
#[derive(Clone)]
pub struct RemoteSession {
    url: String,
    project: String,
    status: Arc<RwLock<ConnectionStatus>>,
    tx_sender: mpsc::UnboundedSender<OutboundMessage>,
    tx_receiver: Arc<Mutex<mpsc::UnboundedReceiver<OutboundMessage>>>,
    reconnect_interval: Duration,
}

impl RemoteSession {
    /// Create a session for the configured remote. The domain is final by
    /// construction time (defaults are resolved inside `WatchConfig`).
    pub fn new(config: &WatchConfig) -> Self {
        let (tx_sender, tx_receiver) = mpsc::unbounded_channel();

        Self {
            url: app_url(&config.domain),
            project: config.name.clone(),
            status: Arc::new(RwLock::new(ConnectionStatus {
                state: ConnectionState::Disconnected,
                last_error: None,
                reconnect_attempts: 0,
            })),
            tx_sender,
            tx_receiver: Arc::new(Mutex::new(tx_receiver)),
            reconnect_interval: RECONNECT_INTERVAL,
        }
    }

    /// Spawn the connection loop. The loop owns the socket lifecycle and
    /// redials indefinitely; the caller never observes transport errors.
    pub fn connect(&self) {
        let session = self.clone();

        tokio::spawn(async move {
            loop {
                {
                    let mut status = session.status.write().await;
                    status.state = ConnectionState::Connecting;
                }

                match session.connection_handler().await {
                    Ok(()) => info!("connection closed by remote"),
                    Err(error) => {
                        warn!(%error, url = %session.url, "connection failed");
                        let mut status = session.status.write().await;
                        status.last_error = Some(error.to_string());
                    }
                }

                {
                    let mut status = session.status.write().await;
                    status.state = ConnectionState::Disconnected;
                    status.reconnect_attempts += 1;
                }

                sleep(session.reconnect_interval).await;
                debug!(url = %session.url, "redialing remote mirror");
            }
        });
    }

    /// Handle a single connection: announce the project, then pump queued
    /// events out and drain inbound frames so control frames are serviced.
    async fn connection_handler(&self) -> Result<()> {
        let (ws_stream, _response) = connect_async(self.url.as_str()).await?;

        {
            let mut status = self.status.write().await;
            status.state = ConnectionState::Connected;
            status.last_error = None;
            status.reconnect_attempts = 0;
        }

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        // The announcement always precedes any queued file or folder event
        let announce = OutboundMessage::start_project(self.project.as_str());
        ws_sender
            .send(tungstenite::Message::Text(serde_json::to_string(&announce)?))
            .await?;
        info!(project = %self.project, url = %self.url, "connected");

        let mut queue = self.tx_receiver.lock().await;

        loop {
            tokio::select! {
                Some(message) = queue.recv() => {
                    let json = serde_json::to_string(&message)?;
                    ws_sender.send(tungstenite::Message::Text(json)).await?;
                    debug!(kind = message.kind(), "event sent");
                }

                Some(frame) = ws_receiver.next() => {
                    match frame {
                        Ok(tungstenite::Message::Close(_)) => break,
                        // The catalogue is one-way; inbound frames are ignored
                        Ok(_) => {}
                        Err(error) => return Err(anyhow!("WebSocket error: {error}")),
                    }
                }

                else => break,
            }
        }

        let mut status = self.status.write().await;
        status.state = ConnectionState::Disconnected;

        Ok(())
    }

    /// Queue one event, fire-and-forget. An event queued while disconnected
    /// is flushed after the announcement on the next (re)connect.
    pub fn send(&self, message: OutboundMessage) {
        if self.tx_sender.send(message).is_err() {
            warn!("outbound queue closed, dropping event");
        }
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.status.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.status.read().await.state == ConnectionState::Connected
    }
}

/// Derive the WebSocket URL for the application namespace from the configured
/// domain, mapping the HTTP scheme onto its WebSocket counterpart.
fn app_url(domain: &str) -> String {
    let domain = domain.trim_end_matches('/');

    let converted = if let Some(rest) = domain.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = domain.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if domain.starts_with("ws://") || domain.starts_with("wss://") {
        domain.to_string()
    } else {
        format!("ws://{domain}")
    };

    format!("{converted}/app")
}
