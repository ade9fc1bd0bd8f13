use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::controllers::mission_completed_controller::MissionCompletedController;
use crate::models::analytics::MissionReview;
use crate::models::mission::Strategy;
use crate::state::AppState;
use crate::utils::errors::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct StrategyQuery {
    pub strategy: Option<String>,
}

pub fn create_mission_completed_router() -> Router<AppState> {
    Router::new().route("/summary", get(get_summary))
}

async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<StrategyQuery>,
) -> Result<Json<MissionReview>, AppError> {
    // la primera opción del selector es el Plan A
    let strategy = match query.strategy.as_deref() {
        Some(raw) => raw.parse()?,
        None => Strategy::A,
    };
    let controller = MissionCompletedController::new(state);
    Ok(Json(controller.summary(strategy).await?))
}
