//! The relay wire message.

use serde::{Deserialize, Serialize};

use super::errors::DecodeError;

/// Kind tag clients put on the messages they originate.
pub const CLIENT_MESSAGE_KIND: &str = "client_msg";

/// Kind tag on every message the server writes back.
pub const SERVER_RESPONSE_KIND: &str = "server_response";

/// One message as carried in a single frame.
///
/// Wire shape: `{"string": <kind>, "content": <text>, "timestamp": <integer>}`.
/// All three fields are required; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Role tag. Travels under the `"string"` key, which deployed clients
    /// already send and expect.
    #[serde(rename = "string")]
    pub kind: String,

    pub content: String,

    /// Caller-supplied and opaque to the server.
    pub timestamp: i64,
}

impl RelayMessage {
    pub fn new(kind: impl Into<String>, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
            timestamp,
        }
    }

    /// Builds a client-originated message.
    pub fn client(content: impl Into<String>, timestamp: i64) -> Self {
        Self::new(CLIENT_MESSAGE_KIND, content, timestamp)
    }

    /// Decodes one frame payload.
    ///
    /// Text and binary frames share this path; binary payloads must hold
    /// UTF-8 JSON just like text frames.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Encodes the message as a JSON text frame payload.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn is_server_response(&self) -> bool {
        self.kind == SERVER_RESPONSE_KIND
    }
}
