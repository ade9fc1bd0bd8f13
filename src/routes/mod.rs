//! Rutas HTTP
//!
//! Cada página del panel tiene su propio router; aquí se montan bajo `/api`.

pub mod mission_completed_routes;
pub mod mission_report_routes;
pub mod mission_start_routes;
pub mod session_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_for;
use crate::state::AppState;

/// Router completo de la aplicación con estado, CORS y trazas
pub fn create_app_router(state: AppState) -> Router {
    let cors = cors_for(&state.config);

    Router::new()
        .route("/health", get(health))
        .nest("/api/sessions", session_routes::create_session_router())
        .nest("/api/mission-start", mission_start_routes::create_mission_start_router())
        .nest("/api/mission-report", mission_report_routes::create_mission_report_router())
        .nest(
            "/api/mission-completed",
            mission_completed_routes::create_mission_completed_router(),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "charge_expedition",
        "timestamp": chrono::Local::now().to_rfc3339(),
    }))
}
