//! Relay domain - messages, acknowledgments, and the session lifecycle.
//!
//! Everything here is transport agnostic: the WebSocket adapter feeds raw
//! frame payloads in and writes encoded messages out.

mod errors;
mod lifecycle;
mod message;
mod responder;

pub use errors::{BoxError, DecodeError, SessionError, UpgradeError};
pub use lifecycle::{SessionEnd, SessionState};
pub use message::{RelayMessage, CLIENT_MESSAGE_KIND, SERVER_RESPONSE_KIND};
pub use responder::{acknowledgment_text, Acknowledger, Responder};
