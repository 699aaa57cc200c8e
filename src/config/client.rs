//! Relay client configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Connection and reconnection settings for a `RelayClient`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Relay endpoint, e.g. `localhost:8080/ws`. `ws://` is assumed when
    /// no scheme is given.
    pub url: String,

    /// `Origin` header sent with the upgrade request
    #[serde(default)]
    pub origin: Option<String>,

    /// Reconnect after the connection closes for any reason
    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,

    /// Consecutive reconnect attempts before giving up
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Delay before each reconnect attempt, in milliseconds
    #[serde(default = "default_reconnect_timeout_ms")]
    pub reconnect_timeout_ms: u64,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            origin: None,
            auto_reconnect: default_auto_reconnect(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_timeout_ms: default_reconnect_timeout_ms(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_reconnect(mut self, max_attempts: u32, timeout: Duration) -> Self {
        self.auto_reconnect = true;
        self.max_reconnect_attempts = max_attempts;
        self.reconnect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn without_reconnect(mut self) -> Self {
        self.auto_reconnect = false;
        self
    }

    /// The endpoint with a WebSocket scheme.
    pub fn endpoint(&self) -> String {
        if self.has_ws_scheme() {
            self.url.clone()
        } else {
            format!("ws://{}", self.url)
        }
    }

    fn has_ws_scheme(&self) -> bool {
        self.url.starts_with("ws://") || self.url.starts_with("wss://")
    }

    pub fn reconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.reconnect_timeout_ms)
    }

    /// Validate client configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("client.url"));
        }
        if self.url.contains("://") && !self.has_ws_scheme() {
            return Err(ValidationError::InvalidClientUrl(self.url.clone()));
        }
        Ok(())
    }
}

fn default_auto_reconnect() -> bool {
    true
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_timeout_ms() -> u64 {
    5000
}
