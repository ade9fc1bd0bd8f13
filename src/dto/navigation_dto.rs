use serde::{Deserialize, Serialize};

use crate::models::route::{DayFilter, RouteSegment};
use crate::utils::errors::AppResult;

/// Query `?day=` compartido por las páginas de reporte
#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub day: Option<String>,
}

impl DayQuery {
    pub fn filter(&self) -> AppResult<DayFilter> {
        DayFilter::from_query(self.day.as_deref())
    }
}

/// Fila de la tabla de navegación
#[derive(Debug, Serialize)]
pub struct SegmentView {
    pub index: usize,
    pub day: u32,
    pub caption: String,
    pub segment: RouteSegment,
    pub navigation_url: String,
}

// Request para elegir el segmento del QR (índice dentro del filtro actual)
#[derive(Debug, Deserialize)]
pub struct SelectSegmentRequest {
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct SelectSegmentResponse {
    pub caption: String,
    pub navigation_url: String,
}

/// Panel lateral del QR de navegación
#[derive(Debug, Clone, Serialize)]
pub struct QrPanel {
    pub caption: String,
    pub image_caption: String,
    pub url: Option<String>,
    /// PNG en base64 (QR real o imagen de ejemplo)
    pub image_base64: Option<String>,
    pub placeholder: bool,
    pub segment_index: Option<usize>,
}
