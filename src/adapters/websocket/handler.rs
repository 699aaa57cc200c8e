//! WebSocket upgrade handler for the relay endpoint.
//!
//! Handles the HTTP → WebSocket upgrade and hands the channel to a session:
//! 1. Check the `Origin` header against the configured policy
//! 2. Validate the upgrade negotiation
//! 3. Reserve a session slot when admission is bounded
//! 4. Upgrade with the configured size caps
//! 5. Run one session on its own task until it terminates

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::config::WebSocketConfig;
use crate::domain::relay::{Responder, UpgradeError};
use crate::ports::SessionObserver;

use super::{
    session::{RelaySession, SessionSettings},
    upgrade::ConnectionUpgrader,
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct RelayState {
    /// Origin policy, admission, and frame limits.
    pub upgrader: Arc<ConnectionUpgrader>,
    /// Handed to every session this listener starts.
    pub session: SessionSettings,
}

impl RelayState {
    /// Create relay state from endpoint configuration.
    pub fn new(config: &WebSocketConfig, observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            upgrader: Arc::new(ConnectionUpgrader::new(config)),
            session: SessionSettings::new(observer).with_idle_timeout(config.idle_timeout()),
        }
    }

    /// Replace the default acknowledging responder.
    pub fn with_responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.session = self.session.with_responder(responder);
        self
    }
}

/// Handle WebSocket upgrade requests for the relay.
///
/// Rejections are reported to the observer and answered with an HTTP error;
/// no session is created for them.
pub async fn relay_ws_handler(
    State(state): State<RelayState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let observer = state.session.observer.clone();

    if let Err(err) = state.upgrader.check_origin(&headers) {
        observer.upgrade_rejected(peer, &err);
        return err.into_response();
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            observer.upgrade_rejected(peer, &UpgradeError::Negotiation(rejection.body_text()));
            return rejection.into_response();
        }
    };

    let permit = match state.upgrader.admit() {
        Ok(permit) => permit,
        Err(err) => {
            observer.upgrade_rejected(peer, &err);
            return err.into_response();
        }
    };

    let settings = state.session.clone();
    state
        .upgrader
        .configure(ws)
        .on_failed_upgrade(move |e: axum::Error| {
            observer.upgrade_rejected(peer, &UpgradeError::Negotiation(e.to_string()));
        })
        .on_upgrade(move |socket| async move {
            // Slot stays reserved until the session terminates.
            let _permit = permit;
            RelaySession::new(socket, settings).with_peer(peer).run().await;
        })
}

/// Create axum router for the relay endpoint.
///
/// # Example
///
/// ```ignore
/// let app = websocket_router("/ws").with_state(relay_state);
/// ```
pub fn websocket_router(path: &str) -> Router<RelayState> {
    Router::new().route(path, get(relay_ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ConnectionId;
    use crate::domain::relay::{RelayMessage, SessionEnd};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct RejectionLog {
        rejected: Mutex<Vec<UpgradeError>>,
    }

    impl SessionObserver for RejectionLog {
        fn upgrade_rejected(&self, _peer: Option<SocketAddr>, error: &UpgradeError) {
            self.rejected.lock().unwrap().push(error.clone());
        }
        fn session_opened(&self, _connection_id: &ConnectionId, _peer: Option<SocketAddr>) {}
        fn message_relayed(&self, _connection_id: &ConnectionId, _inbound: &RelayMessage) {}
        fn session_closed(&self, _connection_id: &ConnectionId, _end: &SessionEnd, _relayed: u64) {}
    }

    fn app(log: &Arc<RejectionLog>) -> Router {
        let state = RelayState::new(&WebSocketConfig::default(), log.clone());
        websocket_router("/ws").with_state(state)
    }

    fn upgrade_request(origin: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .uri("/ws")
            .header(header::CONNECTION, "upgrade")
            .header(header::UPGRADE, "websocket")
            .header(header::SEC_WEBSOCKET_VERSION, "13")
            .header(header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ==");
        if let Some(origin) = origin {
            builder = builder.header(header::ORIGIN, origin);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn wrong_origin_is_forbidden() {
        let log = Arc::new(RejectionLog::default());
        let resp = app(&log)
            .oneshot(upgrade_request(Some("http://evil.example")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["code"], "ORIGIN_NOT_ALLOWED");
        assert_eq!(
            log.rejected.lock().unwrap().as_slice(),
            &[UpgradeError::OriginMismatch {
                presented: "http://evil.example".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn missing_origin_is_forbidden() {
        let log = Arc::new(RejectionLog::default());
        let resp = app(&log).oneshot(upgrade_request(None)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            log.rejected.lock().unwrap().as_slice(),
            &[UpgradeError::MissingOrigin]
        );
    }

    #[tokio::test]
    async fn allowed_origin_without_upgradable_connection_fails_negotiation() {
        // oneshot requests carry no hyper upgrade handle, so negotiation
        // fails after the origin check has passed.
        let log = Arc::new(RejectionLog::default());
        let resp = app(&log)
            .oneshot(upgrade_request(Some("http://localhost:3000")))
            .await
            .unwrap();

        assert_ne!(resp.status(), StatusCode::FORBIDDEN);
        assert!(resp.status().is_client_error());
        let rejected = log.rejected.lock().unwrap();
        assert_eq!(rejected.len(), 1);
        assert!(matches!(rejected[0], UpgradeError::Negotiation(_)));
    }

    #[tokio::test]
    async fn plain_get_with_allowed_origin_is_not_upgraded() {
        let log = Arc::new(RejectionLog::default());
        let req = Request::builder()
            .uri("/ws")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let resp = app(&log).oneshot(req).await.unwrap();

        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn other_paths_are_not_served() {
        let log = Arc::new(RejectionLog::default());
        let req = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();

        let resp = app(&log).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(log.rejected.lock().unwrap().is_empty());
    }

    #[test]
    fn relay_state_applies_idle_timeout() {
        let config = WebSocketConfig {
            idle_timeout_secs: Some(12),
            ..Default::default()
        };
        let state = RelayState::new(&config, Arc::new(RejectionLog::default()));
        assert_eq!(
            state.session.idle_timeout,
            Some(std::time::Duration::from_secs(12))
        );
    }
}
