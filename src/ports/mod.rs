//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionObserver` - Observability sink for upgrades and session outcomes

mod session_observer;

pub use session_observer::SessionObserver;
