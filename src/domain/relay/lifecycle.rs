//! Session lifecycle states and how a session ends.

use std::fmt;

use crate::domain::foundation::StateMachine;

use super::errors::SessionError;

/// Where a session is in its read → decode → respond cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Blocked until the next frame arrives or the channel fails.
    AwaitingFrame,
    /// A data frame arrived and is being decoded.
    Decoding,
    /// The reply is being written back.
    Responding,
    /// Channel closed and released. Final.
    Terminated,
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (AwaitingFrame, Decoding)
                | (AwaitingFrame, Terminated)
                | (Decoding, Responding)
                | (Decoding, Terminated)
                | (Responding, AwaitingFrame)
                | (Responding, Terminated)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            AwaitingFrame => vec![Decoding, Terminated],
            Decoding => vec![Responding, Terminated],
            Responding => vec![AwaitingFrame, Terminated],
            Terminated => vec![],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::AwaitingFrame => "awaiting_frame",
            SessionState::Decoding => "decoding",
            SessionState::Responding => "responding",
            SessionState::Terminated => "terminated",
        };
        write!(f, "{}", s)
    }
}

/// Why a session reached `Terminated`.
#[derive(Debug)]
pub enum SessionEnd {
    /// The peer sent a close frame or the stream ended.
    PeerClosed,
    /// No frame arrived within the configured idle window.
    IdleTimeout,
    /// A read, decode, encode, or write failure.
    Failed(SessionError),
}

impl SessionEnd {
    pub fn is_failure(&self) -> bool {
        matches!(self, SessionEnd::Failed(_))
    }

    pub fn error(&self) -> Option<&SessionError> {
        match self {
            SessionEnd::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Short machine-friendly label used as a log field.
    pub fn label(&self) -> &'static str {
        match self {
            SessionEnd::PeerClosed => "peer_closed",
            SessionEnd::IdleTimeout => "idle_timeout",
            SessionEnd::Failed(err) => err.kind(),
        }
    }
}

impl From<SessionError> for SessionEnd {
    fn from(err: SessionError) -> Self {
        SessionEnd::Failed(err)
    }
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::PeerClosed => write!(f, "peer closed the connection"),
            SessionEnd::IdleTimeout => write!(f, "idle timeout elapsed"),
            SessionEnd::Failed(err) => write!(f, "{}", err),
        }
    }
}
