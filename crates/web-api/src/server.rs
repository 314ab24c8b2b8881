use crate::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use drivewise_engine::ComplianceEngine;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    engine: Arc<ComplianceEngine>,
}

impl ApiServer {
    #[must_use]
    pub const fn new(engine: Arc<ComplianceEngine>) -> Self {
        Self { engine }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/sensor-data", post(handlers::process_sensor_data))
            .route("/api/leaderboard", get(handlers::get_leaderboard))
            .route(
                "/api/leaderboard/vehicle/:vehicle_id",
                get(handlers::get_vehicle_ranking),
            )
            .route(
                "/api/vehicle/:vehicle_id/compliance",
                get(handlers::get_vehicle_compliance),
            )
            .route(
                "/api/vehicle/:vehicle_id/tokens",
                get(handlers::get_reward_tokens),
            )
            .route(
                "/api/vehicle/:vehicle_id/spend-tokens",
                post(handlers::spend_tokens),
            )
            .route(
                "/api/vehicle/:vehicle_id/dashboard",
                get(handlers::get_dashboard_stats),
            )
            .route("/api/blockchain/sync", post(handlers::sync_to_blockchain))
            .route(
                "/api/blockchain/leaderboard/update",
                post(handlers::update_blockchain_leaderboard),
            )
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.engine.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve
    /// requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
