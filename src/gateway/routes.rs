use crate::gateway::chat;
use crate::gateway::models;
use crate::gateway::server::GatewayState;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;

/// Build all routes for the relay.
pub fn build_routes(state: GatewayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let index = ServeFile::new(state.config.server.static_dir.join("index.html"));

    Router::new()
        // Index page
        .route_service("/", index)
        // Health
        .route("/api/health", get(health_handler))
        // Model catalog
        .route("/api/models", get(models::models_handler))
        // Chat relay
        .route("/api/chat", post(chat::chat_handler))
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime: u64,
}

async fn health_handler(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime,
    })
}
