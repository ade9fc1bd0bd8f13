//! Controlador de la página de inicio (briefing de la misión)

use crate::models::analytics::MissionBriefing;
use crate::services::briefing_service::build_briefing;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct MissionStartController {
    state: AppState,
}

impl MissionStartController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn briefing(&self) -> AppResult<MissionBriefing> {
        let plan = self.state.reports.load_plan_stations().await?;
        let national = self.state.reports.load_national_stations().await?;
        let config = &self.state.config;

        Ok(build_briefing(
            &plan,
            &national,
            &config.city_filter,
            config.estimated_days,
            config.base_location.clone(),
        ))
    }
}
