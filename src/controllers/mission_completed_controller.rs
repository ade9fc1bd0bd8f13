//! Controlador de la página de revisión de misión completada

use crate::models::analytics::MissionReview;
use crate::models::mission::Strategy;
use crate::services::mission_aggregator::mission_review;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub const NO_REVIEW_MESSAGE: &str = "当前所选策略没有可用的复盘数据。";

pub struct MissionCompletedController {
    state: AppState,
}

impl MissionCompletedController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn summary(&self, strategy: Strategy) -> AppResult<MissionReview> {
        let reports = &self.state.reports;
        let outcomes = reports.load_final_report().await?;
        let log_a = reports.load_report(Strategy::A).await?;
        let log_b = reports.load_report(Strategy::B).await?;
        // sólo existe el hotel calculado para A; B lo reutiliza
        let hotel = reports.load_hotel(Strategy::A).await?;

        let simulation_log = match strategy {
            Strategy::A => &log_a,
            Strategy::B => &log_b,
        };

        mission_review(strategy, hotel.display_name().to_string(), &outcomes, simulation_log)
            .ok_or_else(|| AppError::NotFound(NO_REVIEW_MESSAGE.to_string()))
    }
}
