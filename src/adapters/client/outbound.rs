//! Messages handed to the client before they are stamped and encoded.

use chrono::Utc;

use crate::domain::relay::{RelayMessage, CLIENT_MESSAGE_KIND};

/// A message whose timestamp may still be unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub kind: String,
    pub content: String,
    /// Unix milliseconds. Filled in at send time when `None`.
    pub timestamp: Option<i64>,
}

impl OutboundMessage {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
            timestamp: None,
        }
    }

    /// A `client_msg` with the given content.
    pub fn client(content: impl Into<String>) -> Self {
        Self::new(CLIENT_MESSAGE_KIND, content)
    }

    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Stamps with the current time unless a timestamp was given.
    pub fn stamp(self) -> RelayMessage {
        self.stamp_at(Utc::now().timestamp_millis())
    }

    pub fn stamp_at(self, now_millis: i64) -> RelayMessage {
        RelayMessage::new(self.kind, self.content, self.timestamp.unwrap_or(now_millis))
    }
}
