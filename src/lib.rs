//! ws-relay - WebSocket message relay
//!
//! Accepts WebSocket upgrades from one allowed origin and answers every
//! client message with an acknowledgment, one independent session per
//! connection.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
