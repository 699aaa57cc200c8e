//! The per-connection session loop.
//!
//! A session owns its channel for its whole life and runs
//! read → decode → respond → write until the first failure or until the
//! peer goes away. Every ending is reported to the observer; nothing is
//! returned to the server as an error.
//!
//! ```text
//!            frame             decoded            written
//! Awaiting ─────────▶ Decoding ───────▶ Responding ───────▶ Awaiting
//!    │                   │                  │
//!    └── close/error ────┴── bad payload ───┴── write error ──▶ Terminated
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};

use crate::domain::foundation::{ConnectionId, StateMachine};
use crate::domain::relay::{
    Acknowledger, RelayMessage, Responder, SessionEnd, SessionError, SessionState,
};
use crate::ports::SessionObserver;

use super::messages::{encode_frame, InboundFrame};

/// Collaborators and limits shared by every session of one listener.
#[derive(Clone)]
pub struct SessionSettings {
    pub responder: Arc<dyn Responder>,
    pub observer: Arc<dyn SessionObserver>,
    pub idle_timeout: Option<Duration>,
}

impl SessionSettings {
    /// Acknowledging sessions without an idle timeout.
    pub fn new(observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            responder: Arc::new(Acknowledger),
            observer,
            idle_timeout: None,
        }
    }

    pub fn with_responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.responder = responder;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}

enum NextFrame {
    Data(Vec<u8>),
    Ended(SessionEnd),
}

/// One live connection.
///
/// Generic over the channel so the loop can run against an in-memory
/// stream in tests; in production `C` is axum's `WebSocket`.
pub struct RelaySession<C> {
    id: ConnectionId,
    peer: Option<SocketAddr>,
    channel: C,
    state: SessionState,
    settings: SessionSettings,
    relayed: u64,
}

impl<C> RelaySession<C>
where
    C: Stream<Item = Result<Message, axum::Error>> + Sink<Message, Error = axum::Error> + Unpin,
{
    pub fn new(channel: C, settings: SessionSettings) -> Self {
        Self {
            id: ConnectionId::new(),
            peer: None,
            channel,
            state: SessionState::AwaitingFrame,
            settings,
            relayed: 0,
        }
    }

    pub fn with_peer(mut self, peer: Option<SocketAddr>) -> Self {
        self.peer = peer;
        self
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session to completion and closes the channel.
    ///
    /// Consumes the session, so the channel is closed exactly once.
    pub async fn run(mut self) -> SessionEnd {
        self.settings.observer.session_opened(&self.id, self.peer);

        let end = match self.relay().await {
            Ok(end) => end,
            Err(err) => SessionEnd::Failed(err),
        };

        self.terminate(&end).await;
        end
    }

    async fn relay(&mut self) -> Result<SessionEnd, SessionError> {
        loop {
            let payload = match self.next_frame().await? {
                NextFrame::Data(payload) => payload,
                NextFrame::Ended(end) => return Ok(end),
            };

            self.advance(SessionState::Decoding);
            let inbound = RelayMessage::decode(&payload)?;

            self.advance(SessionState::Responding);
            let reply = self.settings.responder.respond(&inbound);
            let frame = encode_frame(&reply)?;
            self.channel.send(frame).await.map_err(SessionError::write)?;

            self.relayed += 1;
            self.settings.observer.message_relayed(&self.id, &inbound);
            self.advance(SessionState::AwaitingFrame);
        }
    }

    /// Waits for the next data frame. Control frames are skipped and
    /// restart the idle window.
    async fn next_frame(&mut self) -> Result<NextFrame, SessionError> {
        loop {
            let received = match self.settings.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, self.channel.next()).await {
                    Ok(received) => received,
                    Err(_) => return Ok(NextFrame::Ended(SessionEnd::IdleTimeout)),
                },
                None => self.channel.next().await,
            };

            let message = match received {
                None => return Ok(NextFrame::Ended(SessionEnd::PeerClosed)),
                Some(result) => result.map_err(SessionError::read)?,
            };

            match InboundFrame::from(message) {
                InboundFrame::Data(payload) => return Ok(NextFrame::Data(payload)),
                InboundFrame::Close => return Ok(NextFrame::Ended(SessionEnd::PeerClosed)),
                InboundFrame::Control => {
                    tracing::trace!(connection_id = %self.id, "Control frame");
                }
            }
        }
    }

    async fn terminate(&mut self, end: &SessionEnd) {
        self.advance(SessionState::Terminated);

        if let Err(e) = self.channel.close().await {
            tracing::debug!(connection_id = %self.id, error = %e, "Channel already closed");
        }

        self.settings
            .observer
            .session_closed(&self.id, end, self.relayed);
    }

    fn advance(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal session transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!(connection_id = %self.id, from = %self.state, to = %next, "Session transition");
        self.state = next;
    }
}
