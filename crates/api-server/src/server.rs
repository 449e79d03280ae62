//! API server: builds the router and starts the HTTP and metrics listeners.

use crate::rest::{self, AppState};
use crate::store::PassdeskStore;
use crate::{analytics_rest, loyalty_rest};
use axum::routing::{get, post};
use axum::Router;
use passdesk_core::config::AppConfig;
use passdesk_loyalty::TierEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Main API server.
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let engine = Arc::new(TierEngine::new(&config.loyalty));
        let store = Arc::new(PassdeskStore::new());

        if config.demo.enabled {
            let tenant = store.seed_demo(&config.demo.api_key, &engine)?;
            info!(tenant_id = %tenant.id, "Demo tenant available");
        }

        let state = AppState {
            store,
            engine,
            admin_key: config.auth.admin_key.clone(),
            node_id: config.node_id.clone(),
            start_time: Instant::now(),
        };
        Ok(Self { config, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// All routes with middleware applied.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Operational endpoints
        .route("/health", get(rest::health_check))
        // Tenants
        .route("/api/v1/tenants", post(rest::create_tenant))
        // Tier program
        .route(
            "/api/v1/program",
            get(loyalty_rest::get_program).put(loyalty_rest::update_program),
        )
        // Members
        .route(
            "/api/v1/members",
            get(rest::list_members).post(rest::enroll_member),
        )
        .route("/api/v1/imports/members", post(rest::bulk_enroll))
        .route("/api/v1/members/:id", get(rest::get_member))
        .route("/api/v1/members/:id/tier", get(loyalty_rest::member_tier))
        // POS simulation
        .route("/api/v1/pos/transactions", post(loyalty_rest::simulate_transaction))
        // Wallet provider webhooks
        .route("/api/v1/webhooks/wallet", post(rest::wallet_webhook))
        // Analytics
        .route(
            "/api/v1/analytics/enrollment",
            get(analytics_rest::enrollment_analytics),
        )
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
