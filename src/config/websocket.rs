//! WebSocket endpoint configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Ceiling for `max_message_size` and `write_buffer_size` (16 MiB).
///
/// The transport requires its hard write-buffer limit to stay above the
/// soft one, so an unbounded soft limit would fail inside every upgrade.
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Upgrade policy and per-connection limits for the relay endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketConfig {
    /// Route serving the upgrade
    #[serde(default = "default_path")]
    pub path: String,

    /// The single `Origin` value allowed to upgrade (exact, case-sensitive)
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    /// Largest inbound message or frame in bytes; bigger ones end the session
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Outgoing bytes buffered before a flush
    #[serde(default = "default_write_buffer_size")]
    pub write_buffer_size: usize,

    /// Close sessions that wait longer than this for a frame
    pub idle_timeout_secs: Option<u64>,

    /// Upper bound on live sessions; unbounded when unset
    pub max_connections: Option<usize>,
}

impl WebSocketConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    /// Validate WebSocket configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.path.starts_with('/') {
            return Err(ValidationError::InvalidPath);
        }
        if self.allowed_origin.is_empty() {
            return Err(ValidationError::MissingRequired("websocket.allowed_origin"));
        }
        if self.allowed_origin.trim() != self.allowed_origin {
            return Err(ValidationError::InvalidAllowedOrigin);
        }
        if self.max_message_size == 0 {
            return Err(ValidationError::ZeroSize("websocket.max_message_size"));
        }
        if self.write_buffer_size == 0 {
            return Err(ValidationError::ZeroSize("websocket.write_buffer_size"));
        }
        if self.max_message_size > MAX_BUFFER_SIZE {
            return Err(ValidationError::SizeTooLarge("websocket.max_message_size"));
        }
        if self.write_buffer_size > MAX_BUFFER_SIZE {
            return Err(ValidationError::SizeTooLarge("websocket.write_buffer_size"));
        }
        if self.idle_timeout_secs == Some(0) {
            return Err(ValidationError::InvalidIdleTimeout);
        }
        if self.max_connections == Some(0) {
            return Err(ValidationError::InvalidConnectionLimit);
        }
        Ok(())
    }
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            allowed_origin: default_allowed_origin(),
            max_message_size: default_max_message_size(),
            write_buffer_size: default_write_buffer_size(),
            idle_timeout_secs: None,
            max_connections: None,
        }
    }
}

fn default_path() -> String {
    "/ws".to_string()
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_max_message_size() -> usize {
    1024
}

fn default_write_buffer_size() -> usize {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_config_defaults() {
        let config = WebSocketConfig::default();
        assert_eq!(config.path, "/ws");
        assert_eq!(config.allowed_origin, "http://localhost:3000");
        assert_eq!(config.max_message_size, 1024);
        assert_eq!(config.write_buffer_size, 1024);
        assert_eq!(config.idle_timeout(), None);
        assert_eq!(config.max_connections, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_idle_timeout_conversion() {
        let config = WebSocketConfig {
            idle_timeout_secs: Some(45),
            ..Default::default()
        };
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_validation_path_without_slash() {
        let config = WebSocketConfig {
            path: "ws".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPath));
    }

    #[test]
    fn test_validation_empty_origin() {
        let config = WebSocketConfig {
            allowed_origin: String::new(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("websocket.allowed_origin"))
        );
    }

    #[test]
    fn test_validation_padded_origin() {
        let config = WebSocketConfig {
            allowed_origin: " http://localhost:3000".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidAllowedOrigin));
    }

    #[test]
    fn test_validation_zero_sizes() {
        let config = WebSocketConfig {
            max_message_size: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::ZeroSize("websocket.max_message_size"))
        );

        let config = WebSocketConfig {
            write_buffer_size: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::ZeroSize("websocket.write_buffer_size"))
        );
    }

    #[test]
    fn test_validation_oversized_buffers() {
        let config = WebSocketConfig {
            write_buffer_size: usize::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::SizeTooLarge("websocket.write_buffer_size"))
        );

        let config = WebSocketConfig {
            max_message_size: MAX_BUFFER_SIZE + 1,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::SizeTooLarge("websocket.max_message_size"))
        );

        let config = WebSocketConfig {
            max_message_size: MAX_BUFFER_SIZE,
            write_buffer_size: MAX_BUFFER_SIZE,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_optionals() {
        let config = WebSocketConfig {
            idle_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidIdleTimeout));

        let config = WebSocketConfig {
            max_connections: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidConnectionLimit));
    }

    #[test]
    fn test_deserialization_fills_defaults() {
        let json = r#"{"allowed_origin": "https://app.example.com", "max_connections": 8}"#;
        let config: WebSocketConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.allowed_origin, "https://app.example.com");
        assert_eq!(config.max_connections, Some(8));
        assert_eq!(config.path, "/ws");
        assert_eq!(config.max_message_size, 1024);
    }
}
