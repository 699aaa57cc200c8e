//! Mapping between WebSocket frames and relay messages.

use axum::extract::ws::Message;

use crate::domain::relay::{RelayMessage, SessionError};

/// What the session loop does with one received frame.
#[derive(Debug, PartialEq, Eq)]
pub enum InboundFrame {
    /// Payload to decode as a relay message.
    Data(Vec<u8>),
    /// Ping or pong. Answered by the transport, not a message.
    Control,
    /// Peer started the closing handshake.
    Close,
}

impl From<Message> for InboundFrame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => InboundFrame::Data(text.into_bytes()),
            Message::Binary(bytes) => InboundFrame::Data(bytes),
            Message::Ping(_) | Message::Pong(_) => InboundFrame::Control,
            Message::Close(_) => InboundFrame::Close,
        }
    }
}

/// Encodes a reply as a text frame.
pub fn encode_frame(message: &RelayMessage) -> Result<Message, SessionError> {
    message
        .encode()
        .map(Message::Text)
        .map_err(SessionError::Encode)
}
