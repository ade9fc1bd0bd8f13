use axum::{
    extract::{Path, State},
    routing::{delete, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::models::session::SessionContext;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_session_router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_session))
        .route("/:session_id", delete(end_session))
}

async fn start_session(State(state): State<AppState>) -> Json<ApiResponse<SessionContext>> {
    let session = state.start_session().await;
    Json(ApiResponse::success_with_message(
        session,
        "Session started".to_string(),
    ))
}

async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.end_session(session_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Session ended"
    })))
}
