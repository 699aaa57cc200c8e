//! Structured-log implementation of the session observer.

use std::net::SocketAddr;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::{RelayMessage, SessionEnd, UpgradeError};
use crate::ports::SessionObserver;

/// Writes every lifecycle event as a `tracing` event.
///
/// Failures are logged at `warn` with their cause; clean endings at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSessionObserver;

impl SessionObserver for TracingSessionObserver {
    fn upgrade_rejected(&self, peer: Option<SocketAddr>, error: &UpgradeError) {
        tracing::warn!(peer = ?peer, error = %error, "WebSocket upgrade rejected");
    }

    fn session_opened(&self, connection_id: &ConnectionId, peer: Option<SocketAddr>) {
        tracing::info!(
            connection_id = %connection_id,
            peer = ?peer,
            "WebSocket connection established"
        );
    }

    fn message_relayed(&self, connection_id: &ConnectionId, inbound: &RelayMessage) {
        tracing::debug!(
            connection_id = %connection_id,
            kind = %inbound.kind,
            timestamp = inbound.timestamp,
            content = %inbound.content,
            "Received message from client"
        );
    }

    fn session_closed(&self, connection_id: &ConnectionId, end: &SessionEnd, relayed: u64) {
        match end.error() {
            Some(err) => tracing::warn!(
                connection_id = %connection_id,
                reason = end.label(),
                relayed,
                error = %err,
                "WebSocket session failed"
            ),
            None => tracing::info!(
                connection_id = %connection_id,
                reason = end.label(),
                relayed,
                "WebSocket connection closed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::relay::SessionError;
    use std::sync::Arc;

    #[test]
    fn usable_as_port_object() {
        let observer: Arc<dyn SessionObserver> = Arc::new(TracingSessionObserver);
        let id = ConnectionId::new();

        observer.session_opened(&id, None);
        observer.message_relayed(&id, &RelayMessage::client("hi", 1));
        observer.session_closed(&id, &SessionEnd::PeerClosed, 1);
        observer.session_closed(
            &id,
            &SessionEnd::Failed(SessionError::read(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))),
            0,
        );
        observer.upgrade_rejected(None, &UpgradeError::MissingOrigin);
    }
}
