//! Observability adapters - implementations of the `SessionObserver` port.

mod tracing_observer;

pub use tracing_observer::TracingSessionObserver;
