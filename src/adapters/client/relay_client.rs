//! `RelayClient`: a reconnecting WebSocket client for the relay.
//!
//! The connection runs on a background task. Outbound messages go through
//! an unbounded queue, so anything sent while the socket is down waits
//! there and is flushed in order once a connection opens.
//!
//! ```text
//!  send() ──▶ queue ──▶ ┌──────────────────────────────┐
//!                        │ connection task              │
//!                        │  Connecting ─▶ Open ─▶ pump  │ ◀──▶ relay server
//!                        │      ▲           │           │
//!                        │      └─ Reconnecting ◀───────┘
//!                        │   (bounded attempts, delay)  │
//!                        └──────────────┬───────────────┘
//!                                       ▼
//!                          handlers (filtered by kind)
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{
    self, client::IntoClientRequest, handshake::client::Request, http::HeaderValue, Message,
};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::config::{ClientConfig, ValidationError};
use crate::domain::relay::RelayMessage;

use super::handlers::{HandlerRegistry, MessageCallback, Subscription};
use super::outbound::OutboundMessage;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client-side failures.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid client configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("connection failed: {0}")]
    Connect(#[source] Box<tungstenite::Error>),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("client is closed")]
    Closed,
}

/// Connection state as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Connecting,
    Open,
    /// Waiting before reconnect attempt `attempt` (1-based).
    Reconnecting { attempt: u32 },
    /// Gave up or shut down. Final.
    Closed,
}

impl ClientState {
    pub fn is_open(&self) -> bool {
        matches!(self, ClientState::Open)
    }
}

/// Handle to a background relay connection.
///
/// Dropping the handle shuts the connection down.
pub struct RelayClient {
    outbound: mpsc::UnboundedSender<String>,
    handlers: Arc<HandlerRegistry>,
    state: watch::Receiver<ClientState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RelayClient {
    /// Validates `config` and starts connecting in the background.
    ///
    /// Must be called from within a Tokio runtime. Returns before the
    /// connection is open; see [`RelayClient::wait_until_open`].
    pub fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        build_request(&config)?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ClientState::Connecting);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handlers = Arc::new(HandlerRegistry::default());

        let connection = ConnectionLoop {
            config,
            outbound: outbound_rx,
            backlog: VecDeque::new(),
            handlers: handlers.clone(),
            state: state_tx,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(connection.run());

        Ok(Self {
            outbound: outbound_tx,
            handlers,
            state: state_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Stamps and queues a message, returning what will go on the wire.
    ///
    /// Succeeds while disconnected; the message is sent once a connection
    /// opens. Fails only after the client has closed.
    pub fn send(&self, message: OutboundMessage) -> Result<RelayMessage, ClientError> {
        let state = *self.state.borrow();
        if state == ClientState::Closed {
            return Err(ClientError::Closed);
        }

        let message = message.stamp();
        let frame = message.encode()?;
        if !state.is_open() {
            tracing::warn!(state = ?state, "Relay connection isn't open, message queued to send later");
        }
        self.outbound.send(frame).map_err(|_| ClientError::Closed)?;
        Ok(message)
    }

    /// Registers a handler for every inbound message.
    pub fn on_message<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&RelayMessage) + Send + Sync + 'static,
    {
        self.handlers.register(None, Arc::new(callback) as MessageCallback)
    }

    /// Registers a handler for inbound messages whose kind is listed.
    pub fn on_kinds<I, S, F>(&self, kinds: I, callback: F) -> Subscription
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&RelayMessage) + Send + Sync + 'static,
    {
        let kinds: Vec<String> = kinds.into_iter().map(Into::into).collect();
        tracing::debug!(kinds = ?kinds, "Listening for relay messages");
        self.handlers
            .register(Some(kinds), Arc::new(callback) as MessageCallback)
    }

    pub fn state(&self) -> ClientState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// A receiver that observes every state change.
    pub fn state_changes(&self) -> watch::Receiver<ClientState> {
        self.state.clone()
    }

    /// Resolves once the connection is open, or fails once the client has
    /// given up.
    pub async fn wait_until_open(&self) -> Result<(), ClientError> {
        let mut state = self.state.clone();
        let open = state
            .wait_for(|s| s.is_open() || *s == ClientState::Closed)
            .await
            .map_err(|_| ClientError::Closed)?
            .is_open();
        if open {
            Ok(())
        } else {
            Err(ClientError::Closed)
        }
    }

    /// Closes the connection and waits for the background task to finish.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Relay client task failed");
            }
        }
    }
}

fn build_request(config: &ClientConfig) -> Result<Request, ClientError> {
    let endpoint = config.endpoint();
    let mut request =
        endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| ClientError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

    if let Some(origin) = &config.origin {
        let value = HeaderValue::from_str(origin).map_err(|e| ClientError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: format!("invalid origin '{}': {}", origin, e),
        })?;
        request.headers_mut().insert("Origin", value);
    }
    Ok(request)
}

enum Disconnect {
    Lost,
    Shutdown,
}

struct ConnectionLoop {
    config: ClientConfig,
    outbound: mpsc::UnboundedReceiver<String>,
    /// Frames whose write failed; resent first on the next connection.
    backlog: VecDeque<String>,
    handlers: Arc<HandlerRegistry>,
    state: watch::Sender<ClientState>,
    shutdown: oneshot::Receiver<()>,
}

impl ConnectionLoop {
    async fn run(mut self) {
        let endpoint = self.config.endpoint();
        let mut attempts: u32 = 0;

        loop {
            self.state.send_replace(ClientState::Connecting);

            match self.open().await {
                Ok(stream) => {
                    attempts = 0;
                    self.state.send_replace(ClientState::Open);
                    tracing::info!(endpoint = %endpoint, "Relay connection opened");

                    if let Disconnect::Shutdown = self.pump(stream).await {
                        break;
                    }
                    tracing::info!(endpoint = %endpoint, "Relay connection closed");
                }
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Relay connection failed");
                }
            }

            if !self.config.auto_reconnect || attempts >= self.config.max_reconnect_attempts {
                tracing::error!(
                    endpoint = %endpoint,
                    attempts,
                    "Failed to establish connection with relay server"
                );
                break;
            }

            attempts += 1;
            self.state
                .send_replace(ClientState::Reconnecting { attempt: attempts });
            tracing::debug!(
                attempt = attempts,
                delay_ms = self.config.reconnect_timeout_ms,
                "Attempting to reconnect"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.config.reconnect_timeout()) => {}
                _ = &mut self.shutdown => break,
            }
        }

        self.state.send_replace(ClientState::Closed);
    }

    async fn open(&self) -> Result<WsStream, ClientError> {
        let request = build_request(&self.config)?;
        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| ClientError::Connect(Box::new(e)))?;
        Ok(stream)
    }

    /// Moves frames both ways until the connection drops or shutdown is
    /// requested.
    async fn pump(&mut self, stream: WsStream) -> Disconnect {
        let (mut write, mut read) = stream.split();

        if !self.backlog.is_empty() {
            tracing::debug!(queued = self.backlog.len(), "Resending queued messages");
        }
        while let Some(frame) = self.backlog.pop_front() {
            if let Err(e) = write.send(Message::Text(frame.clone())).await {
                tracing::warn!(error = %e, "Failed to resend queued message");
                self.backlog.push_front(frame);
                return Disconnect::Lost;
            }
        }

        loop {
            tokio::select! {
                outbound = self.outbound.recv() => match outbound {
                    Some(frame) => {
                        if let Err(e) = write.send(Message::Text(frame.clone())).await {
                            tracing::warn!(error = %e, "Failed to send message");
                            self.backlog.push_back(frame);
                            return Disconnect::Lost;
                        }
                        tracing::debug!("Sent message");
                    }
                    None => {
                        let _ = write.send(Message::Close(None)).await;
                        return Disconnect::Shutdown;
                    }
                },
                inbound = read.next() => match inbound {
                    Some(Ok(Message::Text(text))) => deliver(&self.handlers, text.as_bytes()),
                    Some(Ok(Message::Binary(bytes))) => deliver(&self.handlers, &bytes),
                    Some(Ok(Message::Close(_))) | None => return Disconnect::Lost,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Relay connection error");
                        return Disconnect::Lost;
                    }
                },
                _ = &mut self.shutdown => {
                    let _ = write.send(Message::Close(None)).await;
                    return Disconnect::Shutdown;
                }
            }
        }
    }
}

fn deliver(handlers: &HandlerRegistry, payload: &[u8]) {
    match RelayMessage::decode(payload) {
        Ok(message) => {
            let delivered = handlers.dispatch(&message);
            tracing::debug!(kind = %message.kind, delivered, "Received message");
        }
        Err(e) => tracing::warn!(error = %e, "Ignoring undecodable message from relay"),
    }
}
