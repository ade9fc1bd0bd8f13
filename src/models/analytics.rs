//! Modelos de métricas de la misión
//!
//! Resúmenes calculados por el agregador para las tres páginas del panel:
//! briefing (inicio), reporte en curso y revisión final.

use serde::Serialize;

use super::station::{BaseLocation, CpoCategory};

/// Cabecera del reporte diario: progreso bajo el filtro de día
#[derive(Debug, Clone, Serialize)]
pub struct MissionOverview {
    pub title: String,
    pub hotel_name: String,
    pub day_filter: String,
    pub available_days: Vec<u32>,
    pub total_days: u32,
    pub total_targets: u32,
    pub tested_targets: u32,
    /// Porcentaje entero (truncado) de objetivos cubiertos
    pub completion_rate: u32,
    pub map_station_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: CpoCategory,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerTypeDistribution {
    pub dc_count: usize,
    pub ac_count: usize,
    pub unknown_count: usize,
    /// Proporciones sobre los tipos conocidos (AC + DC)
    pub dc_percentage: f64,
    pub ac_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CpoCoverage {
    pub city: String,
    pub city_cpos: usize,
    pub national_cpos: usize,
    pub plan_cpos: usize,
    pub city_vs_national_percentage: f64,
    pub plan_vs_city_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OemStation {
    pub station_name: String,
    pub brand_keyword: String,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationMarker {
    pub station_name: String,
    pub operator_name: String,
    pub category: CpoCategory,
    pub latitude: f64,
    pub longitude: f64,
}

/// Página de inicio: inteligencia previa a la expedición
#[derive(Debug, Clone, Serialize)]
pub struct MissionBriefing {
    pub total_targets: usize,
    pub estimated_days: u32,
    pub coverage: CpoCoverage,
    pub power_types: PowerTypeDistribution,
    pub categories: Vec<CategoryCount>,
    pub oem_brands: Vec<String>,
    pub oem_stations: Vec<OemStation>,
    pub markers: Vec<StationMarker>,
    pub base: BaseLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpoPerformance {
    pub operator_name: String,
    pub tests: usize,
    pub successes: usize,
    pub failures: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReasonCount {
    pub reason: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeMarker {
    pub station_name: String,
    pub operator_name: String,
    pub status: String,
    pub failure_reason: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Página de revisión de una estrategia ya ejecutada
#[derive(Debug, Clone, Serialize)]
pub struct MissionReview {
    pub strategy: String,
    pub hotel_name: String,
    pub total_tests: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub success_rate: f64,
    pub total_days: Option<u32>,
    pub tested_cpos: usize,
    pub perfect_mission: bool,
    pub failure_reasons: Vec<FailureReasonCount>,
    pub cpo_performance: Vec<CpoPerformance>,
    pub success_layer: Vec<OutcomeMarker>,
    pub failure_layer: Vec<OutcomeMarker>,
}
