//! Connection upgrader: origin policy, admission, and frame limits.
//!
//! Built from an explicit [`WebSocketConfig`] so several listeners with
//! different policies can live in one process.

use std::sync::Arc;

use axum::{
    extract::ws::WebSocketUpgrade,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::{WebSocketConfig, MAX_BUFFER_SIZE};
use crate::domain::relay::UpgradeError;

use super::origin::OriginPolicy;

/// Decides whether an upgrade may proceed and configures the channel it
/// produces.
#[derive(Debug)]
pub struct ConnectionUpgrader {
    policy: OriginPolicy,
    max_message_size: usize,
    write_buffer_size: usize,
    admission: Option<Admission>,
}

#[derive(Debug)]
struct Admission {
    limit: usize,
    slots: Arc<Semaphore>,
}

impl ConnectionUpgrader {
    pub fn new(config: &WebSocketConfig) -> Self {
        Self {
            policy: OriginPolicy::new(config.allowed_origin.clone()),
            max_message_size: config.max_message_size.min(MAX_BUFFER_SIZE),
            write_buffer_size: config.write_buffer_size.min(MAX_BUFFER_SIZE),
            admission: config.max_connections.map(|limit| Admission {
                limit,
                slots: Arc::new(Semaphore::new(limit)),
            }),
        }
    }

    pub fn policy(&self) -> &OriginPolicy {
        &self.policy
    }

    pub fn check_origin(&self, headers: &HeaderMap) -> Result<(), UpgradeError> {
        self.policy.check(headers)
    }

    /// Reserves a session slot.
    ///
    /// Returns `None` when admission is unbounded. The permit must live as
    /// long as the session does.
    pub fn admit(&self) -> Result<Option<OwnedSemaphorePermit>, UpgradeError> {
        match &self.admission {
            None => Ok(None),
            Some(admission) => admission
                .slots
                .clone()
                .try_acquire_owned()
                .map(Some)
                .map_err(|_| UpgradeError::AtCapacity {
                    limit: admission.limit,
                }),
        }
    }

    /// Effective outgoing buffer size, capped at [`MAX_BUFFER_SIZE`].
    pub fn write_buffer_size(&self) -> usize {
        self.write_buffer_size
    }

    /// Free session slots, or `None` when admission is unbounded.
    pub fn available_slots(&self) -> Option<usize> {
        self.admission
            .as_ref()
            .map(|admission| admission.slots.available_permits())
    }

    /// Applies the size caps. Oversized inbound messages become read
    /// errors instead of being truncated.
    pub fn configure(&self, ws: WebSocketUpgrade) -> WebSocketUpgrade {
        ws.max_message_size(self.max_message_size)
            .max_frame_size(self.max_message_size)
            .write_buffer_size(self.write_buffer_size)
    }
}

impl IntoResponse for UpgradeError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            UpgradeError::MissingOrigin => (StatusCode::FORBIDDEN, "ORIGIN_MISSING"),
            UpgradeError::OriginMismatch { .. } => (StatusCode::FORBIDDEN, "ORIGIN_NOT_ALLOWED"),
            UpgradeError::Negotiation(_) => (StatusCode::BAD_REQUEST, "UPGRADE_FAILED"),
            UpgradeError::AtCapacity { .. } => (StatusCode::SERVICE_UNAVAILABLE, "AT_CAPACITY"),
        };

        (
            status,
            Json(serde_json::json!({
                "error": self.to_string(),
                "code": code
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    fn config_with_limit(limit: Option<usize>) -> WebSocketConfig {
        WebSocketConfig {
            max_connections: limit,
            ..Default::default()
        }
    }

    #[test]
    fn uses_configured_origin() {
        let config = WebSocketConfig {
            allowed_origin: "https://chat.example.com".to_string(),
            ..Default::default()
        };
        let upgrader = ConnectionUpgrader::new(&config);
        assert_eq!(upgrader.policy().allowed(), "https://chat.example.com");

        let mut headers = HeaderMap::new();
        headers.insert(
            header::ORIGIN,
            HeaderValue::from_static("https://chat.example.com"),
        );
        assert!(upgrader.check_origin(&headers).is_ok());
    }

    #[test]
    fn independent_upgraders_keep_independent_policies() {
        let a = ConnectionUpgrader::new(&WebSocketConfig {
            allowed_origin: "http://a.example".to_string(),
            ..Default::default()
        });
        let b = ConnectionUpgrader::new(&WebSocketConfig {
            allowed_origin: "http://b.example".to_string(),
            ..Default::default()
        });

        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static("http://a.example"));
        assert!(a.check_origin(&headers).is_ok());
        assert!(b.check_origin(&headers).is_err());
    }

    #[test]
    fn oversized_buffers_are_capped() {
        let upgrader = ConnectionUpgrader::new(&WebSocketConfig {
            write_buffer_size: usize::MAX,
            ..Default::default()
        });
        assert_eq!(upgrader.write_buffer_size(), MAX_BUFFER_SIZE);

        let upgrader = ConnectionUpgrader::new(&WebSocketConfig::default());
        assert_eq!(upgrader.write_buffer_size(), 1024);
    }

    #[test]
    fn unbounded_admission_never_refuses() {
        let upgrader = ConnectionUpgrader::new(&config_with_limit(None));
        assert_eq!(upgrader.available_slots(), None);
        for _ in 0..100 {
            assert!(matches!(upgrader.admit(), Ok(None)));
        }
    }

    #[test]
    fn bounded_admission_refuses_when_full_and_recovers() {
        let upgrader = ConnectionUpgrader::new(&config_with_limit(Some(2)));

        let first = upgrader.admit().unwrap();
        let _second = upgrader.admit().unwrap();
        assert_eq!(upgrader.available_slots(), Some(0));
        assert_eq!(
            upgrader.admit().unwrap_err(),
            UpgradeError::AtCapacity { limit: 2 }
        );

        drop(first);
        assert_eq!(upgrader.available_slots(), Some(1));
        assert!(upgrader.admit().unwrap().is_some());
    }

    #[test]
    fn rejection_statuses() {
        assert_eq!(
            UpgradeError::MissingOrigin.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            UpgradeError::OriginMismatch {
                presented: "x".to_string()
            }
            .into_response()
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            UpgradeError::Negotiation("bad".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            UpgradeError::AtCapacity { limit: 1 }.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
