use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router, routing::get};
use grantry_auth::{GrantState, SystemClock};
use grantry_auth_memory::{InMemoryClientStorage, InMemoryCredentialStore, spawn_reaper};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;

pub struct GrantryServer {
    addr: SocketAddr,
    app: Router,
    reaper: JoinHandle<()>,
}

/// In-memory stores plus the wired grant services.
pub struct AppServices {
    pub state: GrantState,
    pub credentials: Arc<InMemoryCredentialStore>,
}

pub fn build_services(cfg: &AppConfig) -> AppServices {
    let clock = SystemClock::shared();
    let clients = Arc::new(InMemoryClientStorage::new());
    let credentials = Arc::new(InMemoryCredentialStore::new(clock.clone()));
    let state = GrantState::new(clients, credentials.credentials(), clock, &cfg.auth);

    tracing::info!(
        code_lifetime = ?cfg.auth.oauth.authorization_code_lifetime,
        access_token_lifetime = ?cfg.auth.oauth.access_token_lifetime,
        implicit_owner_approval = cfg.auth.oauth.implicit_owner_approval,
        "Grant services initialized"
    );
    if cfg.auth.oauth.implicit_owner_approval {
        tracing::warn!(
            "auth.oauth.implicit_owner_approval is enabled; codes are issued without a logged-in user"
        );
    }

    AppServices { state, credentials }
}

pub fn build_router(cfg: &AppConfig, state: GrantState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(grantry_auth::http::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.route = %req.uri().path(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            cfg.server.body_limit_bytes,
        ))
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Must be called from inside a Tokio runtime.
    pub fn build(self) -> GrantryServer {
        let services = build_services(&self.config);
        let reaper = spawn_reaper(
            services.credentials.clone(),
            self.config.auth.oauth.reap_interval,
        );
        let app = build_router(&self.config, services.state);

        GrantryServer {
            addr: self.addr,
            app,
            reaper,
        }
    }
}

impl GrantryServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        let served = axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        self.reaper.abort();
        served?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
