//! Response synthesis.

use super::message::{RelayMessage, SERVER_RESPONSE_KIND};

/// Produces the reply for one inbound message.
///
/// Implementations must be pure: the same inbound message always yields
/// the same reply, and nothing is carried between calls.
pub trait Responder: Send + Sync {
    fn respond(&self, inbound: &RelayMessage) -> RelayMessage;
}

/// Wraps the inbound content in the acknowledgment template and echoes
/// the timestamp untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Acknowledger;

impl Responder for Acknowledger {
    fn respond(&self, inbound: &RelayMessage) -> RelayMessage {
        RelayMessage::new(
            SERVER_RESPONSE_KIND,
            acknowledgment_text(&inbound.content),
            inbound.timestamp,
        )
    }
}

pub fn acknowledgment_text(content: &str) -> String {
    format!("You said: {}. Thanks for the message! - server.", content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn acknowledges_hello() {
        let reply = Acknowledger.respond(&RelayMessage::client("hello", 1000));
        assert_eq!(
            reply,
            RelayMessage::new(
                "server_response",
                "You said: hello. Thanks for the message! - server.",
                1000
            )
        );
    }

    #[test]
    fn acknowledges_empty_content() {
        let reply = Acknowledger.respond(&RelayMessage::client("", 0));
        assert_eq!(reply.content, "You said: . Thanks for the message! - server.");
        assert_eq!(reply.timestamp, 0);
    }

    #[test]
    fn reply_kind_ignores_inbound_kind() {
        let reply = Acknowledger.respond(&RelayMessage::new("anything", "x", 1));
        assert!(reply.is_server_response());
    }

    proptest! {
        #[test]
        fn timestamp_is_passed_through(content in ".*", timestamp in any::<i64>()) {
            let reply = Acknowledger.respond(&RelayMessage::client(content, timestamp));
            prop_assert_eq!(reply.timestamp, timestamp);
        }

        #[test]
        fn content_depends_only_on_inbound_content(
            content in ".*",
            first_ts in any::<i64>(),
            second_ts in any::<i64>(),
            other_kind in "[a-z_]{0,12}",
        ) {
            let a = Acknowledger.respond(&RelayMessage::client(content.clone(), first_ts));
            let b = Acknowledger.respond(&RelayMessage::new(other_kind, content.clone(), second_ts));
            prop_assert_eq!(&a.content, &b.content);
            prop_assert!(a.content.contains(&content));
        }
    }
}
