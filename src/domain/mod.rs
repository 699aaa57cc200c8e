//! Domain layer containing the relay's business logic and types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, errors, state machine trait)
//! - `relay` - Wire message, acknowledgment responder, session lifecycle

pub mod foundation;
pub mod relay;
