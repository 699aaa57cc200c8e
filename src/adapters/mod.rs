//! Adapters - Implementations of port interfaces and transport glue.
//!
//! - `websocket` - Upgrade handler and per-connection session loop
//! - `http` - Router assembly, CORS, and the listening server
//! - `observability` - `SessionObserver` implementations
//! - `client` - Reconnecting WebSocket client for the relay

pub mod client;
pub mod http;
pub mod observability;
pub mod websocket;
