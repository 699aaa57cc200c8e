//! Listener setup and serving for the relay router.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, RelayState};
use crate::config::AppConfig;
use crate::ports::SessionObserver;

use super::cors::cors_layer;

/// Build the full HTTP application: relay endpoint plus tracing and CORS.
pub fn app_router(config: &AppConfig, state: RelayState) -> Router {
    websocket_router(&config.websocket.path)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.server)),
        )
}

/// A bound relay listener.
///
/// Every accepted connection is served on its own task; upgraded sessions
/// share nothing but the read-only [`RelayState`].
pub struct RelayServer {
    listener: TcpListener,
    router: Router,
}

impl RelayServer {
    /// Bind using the default acknowledging responder.
    pub async fn bind(config: &AppConfig, observer: Arc<dyn SessionObserver>) -> io::Result<Self> {
        let state = RelayState::new(&config.websocket, observer);
        Self::bind_with_state(config, state).await
    }

    /// Bind with caller-supplied relay state.
    pub async fn bind_with_state(config: &AppConfig, state: RelayState) -> io::Result<Self> {
        let listener = TcpListener::bind(config.server.bind_address()).await?;
        Ok(Self {
            listener,
            router: app_router(config, state),
        })
    }

    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` completes.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
    }

    /// Serve forever.
    pub async fn serve(self) -> io::Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::observability::TracingSessionObserver;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config
    }

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let server = RelayServer::bind(&test_config(), Arc::new(TracingSessionObserver))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn app_router_serves_configured_path() {
        let mut config = test_config();
        config.websocket.path = "/relay".to_string();
        let state = RelayState::new(&config.websocket, Arc::new(TracingSessionObserver));
        let app = app_router(&config, state);

        let req = Request::builder()
            .uri("/relay")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = Request::builder().uri("/ws").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown_signal() {
        let server = RelayServer::bind(&test_config(), Arc::new(TracingSessionObserver))
            .await
            .unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            server.serve_with_shutdown(async {}),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }
}
