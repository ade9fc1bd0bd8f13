use axum::{extract::State, routing::get, Json, Router};

use crate::controllers::mission_start_controller::MissionStartController;
use crate::models::analytics::MissionBriefing;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_mission_start_router() -> Router<AppState> {
    Router::new().route("/briefing", get(get_briefing))
}

async fn get_briefing(State(state): State<AppState>) -> Result<Json<MissionBriefing>, AppError> {
    let controller = MissionStartController::new(state);
    Ok(Json(controller.briefing().await?))
}
