//! Relay client adapter.
//!
//! - [`relay_client`] - Reconnecting connection with an outbound queue
//! - [`handlers`] - Kind-filtered inbound handlers and their subscriptions
//! - [`outbound`] - Messages stamped with a send time when none is given

pub mod handlers;
pub mod outbound;
pub mod relay_client;

pub use handlers::{MessageCallback, Subscription};
pub use outbound::OutboundMessage;
pub use relay_client::{ClientError, ClientState, RelayClient};
