//! Modelos de estrategia y resultados de misión

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::errors::{bad_request_error, AppError};

/// Estrategia de planificación producida aguas arriba (prefijo de archivos)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    A,
    B,
}

impl Strategy {
    pub fn prefix(&self) -> &'static str {
        match self {
            Strategy::A => "A",
            Strategy::B => "B",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Strategy::A => "Plan A: Completeness First",
            Strategy::B => "Plan B: Counts First",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Strategy::A => "Plan A",
            Strategy::B => "Plan B",
        }
    }

    pub fn report_file(&self) -> String {
        format!("report_{}_enriched.csv", self.prefix())
    }

    pub fn hotel_file(&self) -> String {
        format!("best_hotel_info_{}.json", self.prefix())
    }
}

impl FromStr for Strategy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "A" | "a" | "Plan A" | "Plan A: Completeness First" => Ok(Strategy::A),
            "B" | "b" | "Plan B" | "Plan B: Counts First" => Ok(Strategy::B),
            other => Err(bad_request_error(&format!("Unknown strategy '{}'", other))),
        }
    }
}

pub const SUCCESS_STATUS: &str = "成功";
pub const FAILURE_STATUS: &str = "失败";

/// Resultado de una prueba ya ejecutada (`final_mission_report.csv`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionOutcome {
    pub strategy: String,
    pub station_name: String,
    pub operator_name: String,
    pub status: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub failure_reason: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl MissionOutcome {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    pub fn is_failure(&self) -> bool {
        self.status == FAILURE_STATUS
    }

    pub fn belongs_to(&self, strategy: Strategy) -> bool {
        self.strategy == strategy.prefix()
    }
}
