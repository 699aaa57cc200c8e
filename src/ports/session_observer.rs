//! SessionObserver port - Where session lifecycle events are reported.
//!
//! The relay never lets a connection failure escape the session; instead
//! every outcome is handed to an observer. The default adapter writes
//! structured log lines, tests record the events to assert on them.

use std::net::SocketAddr;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::{RelayMessage, SessionEnd, UpgradeError};

/// Receives lifecycle events from the upgrader and from every session.
///
/// Called from many sessions concurrently. Implementations must not block.
pub trait SessionObserver: Send + Sync {
    /// An upgrade request was refused. No session was created.
    fn upgrade_rejected(&self, peer: Option<SocketAddr>, error: &UpgradeError);

    /// A channel was upgraded and its session started.
    fn session_opened(&self, connection_id: &ConnectionId, peer: Option<SocketAddr>);

    /// An inbound message was decoded and answered.
    fn message_relayed(&self, connection_id: &ConnectionId, inbound: &RelayMessage);

    /// The session reached its terminal state and released its channel.
    fn session_closed(&self, connection_id: &ConnectionId, end: &SessionEnd, relayed: u64);
}
