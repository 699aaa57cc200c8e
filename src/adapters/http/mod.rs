//! HTTP adapters - router assembly, CORS, and the listening server.

pub mod cors;
pub mod server;

pub use cors::cors_layer;
pub use server::{app_router, RelayServer};
