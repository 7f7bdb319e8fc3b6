//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the relay, health and admin routes
//! - Wire up middleware (request ID, tracing, timeout, limits, rate limiting)
//! - Serve over plain TCP or TLS with graceful shutdown

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::RelayConfig;
use crate::health::RelayerHealth;
use crate::http::handlers;
use crate::http::request::X_REQUEST_ID;
use crate::observability::RelayStats;
use crate::relay::RelayService;
use crate::security::{apply_body_limit, apply_security_headers, rate_limit_middleware, RateLimiter};

/// Time allowed for in-flight requests once shutdown starts (TLS listener).
const TLS_DRAIN_SECS: u64 = 30;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: RelayService,
    pub health: Arc<RelayerHealth>,
    pub stats: Arc<RelayStats>,
    pub chain_id: u64,
    pub low_balance_wei: u128,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: RelayService, health: Arc<RelayerHealth>, config: &RelayConfig) -> Self {
        Self {
            service,
            health,
            stats: Arc::new(RelayStats::default()),
            chain_id: config.chain.chain_id,
            low_balance_wei: config.chain.low_balance_wei,
            started_at: Instant::now(),
        }
    }
}

/// HTTP server for the relay API.
pub struct RelayServer {
    router: Router,
}

impl RelayServer {
    pub fn new(config: &RelayConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// The fully layered router, for serving or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut api = Router::new()
            .route("/api/v1/relay", post(handlers::relay))
            .route("/api/v1/positions", get(handlers::positions))
            .route("/api/v1/nonce/{position}/{address}", get(handlers::nonce));

        if config.rate_limit.enabled {
            let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
            api = api.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
        }

        let mut router = api
            .route("/health", get(handlers::health))
            .with_state(state.clone());

        if config.admin.enabled {
            router = router.merge(setup_admin_router(state, &config.admin.api_key));
        }

        router = apply_body_limit(router, config.security.max_body_size);
        if config.security.enable_headers {
            router = apply_security_headers(router);
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");
                        tracing::info_span!(
                            "request",
                            request_id = %request_id,
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve TLS on `addr` until `shutdown` resolves.
    pub async fn run_tls<F>(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: F,
    ) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown.await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ContractRegistry;
    use crate::relay::testing::{RecordingSubmitter, StaticOracle};
    use alloy::primitives::Address;
    use axum::http::StatusCode;
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    fn server(mut config: RelayConfig) -> RelayServer {
        // oneshot requests carry no ConnectInfo
        config.rate_limit.enabled = false;
        let mut positions = BTreeMap::new();
        positions.insert("president".to_string(), Address::repeat_byte(0xcc));
        let service = RelayService::new(
            Arc::new(ContractRegistry::new(positions).unwrap()),
            Arc::new(StaticOracle::new(5)),
            Arc::new(RecordingSubmitter::succeeding()),
        );
        let health = Arc::new(RelayerHealth::new(Address::repeat_byte(1)));
        let state = AppState::new(service, health, &config);
        RelayServer::new(&config, state)
    }

    async fn get(server: &RelayServer, uri: &str, auth: Option<&str>) -> axum::response::Response {
        let mut request = Request::get(uri);
        if let Some(token) = auth {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        server.router().oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_health_has_request_id_and_headers() {
        let server = server(RelayConfig::default());
        let response = get(&server, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn test_incoming_request_id_is_kept() {
        let server = server(RelayConfig::default());
        let response = server
            .router()
            .oneshot(
                Request::get("/health")
                    .header(X_REQUEST_ID, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "req-42");
    }

    #[tokio::test]
    async fn test_nonce_route() {
        let server = server(RelayConfig::default());
        let uri = format!("/api/v1/nonce/president/{}", Address::repeat_byte(0xaa));
        let response = get(&server, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get(&server, "/api/v1/nonce/treasurer/0x0000000000000000000000000000000000000001", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = get(&server, "/api/v1/nonce/president/nope", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_routes_require_token() {
        let mut config = RelayConfig::default();
        config.admin.enabled = true;
        config.admin.api_key = "s3cret-admin-key".to_string();
        let server = server(config);

        assert_eq!(get(&server, "/admin/status", None).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get(&server, "/admin/status", Some("wrong")).await.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get(&server, "/admin/relayer", Some("s3cret-admin-key")).await.status(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_admin_routes_absent_when_disabled() {
        let server = server(RelayConfig::default());
        assert_eq!(get(&server, "/admin/status", None).await.status(), StatusCode::NOT_FOUND);
    }
}
