//! WebSocket adapter for the relay endpoint.
//!
//! # Architecture
//!
//! ```text
//!  HTTP GET /ws (Upgrade: websocket, Origin: ...)
//!            │
//!            ▼
//! ┌──────────────────────────────────────────────┐
//! │ relay_ws_handler                             │
//! │   ConnectionUpgrader                         │
//! │   ├── OriginPolicy  (exact match or 403)     │
//! │   ├── admission     (optional, 503 if full)  │
//! │   └── frame limits  (max message / buffer)   │
//! └──────────────────────────────────────────────┘
//!            │ on_upgrade (one task per connection)
//!            ▼
//! ┌──────────────────────────────────────────────┐
//! │ RelaySession                                 │
//! │   read → decode → respond → write → ...      │
//! │   first failure or close → Terminated        │
//! └──────────────────────────────────────────────┘
//!            │ lifecycle events
//!            ▼
//!      SessionObserver
//! ```
//!
//! # Components
//!
//! - [`origin`] - Exact-match origin policy
//! - [`upgrade`] - Upgrader built from explicit configuration
//! - [`handler`] - Axum WebSocket upgrade handler and router
//! - [`session`] - Per-connection session loop
//! - [`messages`] - Frame ↔ relay message mapping

pub mod handler;
pub mod messages;
pub mod origin;
pub mod session;
pub mod upgrade;

pub use handler::{relay_ws_handler, websocket_router, RelayState};
pub use messages::{encode_frame, InboundFrame};
pub use origin::OriginPolicy;
pub use session::{RelaySession, SessionSettings};
pub use upgrade::ConnectionUpgrader;
