//! Modelo de Route
//!
//! Filas del reporte diario de ruta (`report_<S>_enriched.csv`) y los
//! segmentos navegables origen → destino derivados de ellas.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::errors::{bad_request_error, AppError};
use crate::utils::validation::validate_coordinates;

lazy_static! {
    /// Marca que el planificador pone en las filas de cierre de jornada
    static ref MISSION_COMPLETE_MARKER: Regex =
        Regex::new(r"(?i)完成測試|mission complete").expect("valid mission marker regex");
}

/// ¿La etiqueta de origen/destino es una fila de cierre y no una estación?
pub fn is_mission_complete(label: &str) -> bool {
    MISSION_COMPLETE_MARKER.is_match(label)
}

/// Fila del reporte de ruta tal como la escribe el planificador
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "第幾天")]
    pub day: u32,
    #[serde(rename = "累積目標數", default, deserialize_with = "csv::invalid_option")]
    pub cumulative_targets: Option<u32>,
    #[serde(rename = "出發地")]
    pub origin: String,
    #[serde(rename = "出發地經度", default, deserialize_with = "csv::invalid_option")]
    pub origin_lng: Option<f64>,
    #[serde(rename = "出發地緯度", default, deserialize_with = "csv::invalid_option")]
    pub origin_lat: Option<f64>,
    #[serde(rename = "目的地")]
    pub destination: String,
    #[serde(rename = "目的地經度", default, deserialize_with = "csv::invalid_option")]
    pub destination_lng: Option<f64>,
    #[serde(rename = "目的地緯度", default, deserialize_with = "csv::invalid_option")]
    pub destination_lat: Option<f64>,
}

impl ReportRow {
    /// Convertir la fila en segmento navegable.
    ///
    /// Devuelve `None` para filas de cierre (origen o destino con la marca de
    /// misión completada) y para filas sin coordenadas válidas.
    pub fn to_segment(&self) -> Option<RouteSegment> {
        if is_mission_complete(&self.origin) || is_mission_complete(&self.destination) {
            return None;
        }

        let origin = LngLat::checked(self.origin_lng?, self.origin_lat?)?;
        let destination = LngLat::checked(self.destination_lng?, self.destination_lat?)?;

        Some(RouteSegment {
            day: self.day,
            origin: Waypoint {
                name: self.origin.clone(),
                position: origin,
            },
            destination: Waypoint {
                name: self.destination.clone(),
                position: destination,
            },
        })
    }
}

/// Par longitud/latitud (orden de los servicios de mapas chinos)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn checked(lng: f64, lat: f64) -> Option<Self> {
        match validate_coordinates(lat, lng) {
            Ok(()) => Some(Self { lng, lat }),
            Err(e) => {
                log::warn!("⚠️ Coordenadas descartadas ({}, {}): {}", lng, lat, e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub position: LngLat,
}

/// Segmento de ruta de un día: origen → destino
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub day: u32,
    pub origin: Waypoint,
    pub destination: Waypoint,
}

impl RouteSegment {
    pub fn caption(&self) -> String {
        format!("{} → {}", self.origin.name, self.destination.name)
    }
}

/// Filtro por día del panel lateral ("全部" = todos)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    #[default]
    All,
    Day(u32),
}

impl DayFilter {
    pub fn matches(&self, row: &ReportRow) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Day(day) => row.day == *day,
        }
    }

    pub fn apply<'a>(&self, rows: &'a [ReportRow]) -> Vec<&'a ReportRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }

    pub fn from_query(value: Option<&str>) -> Result<Self, AppError> {
        match value {
            None => Ok(DayFilter::All),
            Some(raw) => raw.parse(),
        }
    }
}

impl FromStr for DayFilter {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() || value == "全部" || value.eq_ignore_ascii_case("all") {
            return Ok(DayFilter::All);
        }
        value
            .parse::<u32>()
            .map(DayFilter::Day)
            .map_err(|_| bad_request_error(&format!("Invalid day filter '{}'", value)))
    }
}

impl std::fmt::Display for DayFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayFilter::All => f.write_str("全部"),
            DayFilter::Day(day) => write!(f, "{}", day),
        }
    }
}

/// Días disponibles en el reporte, ordenados y sin duplicados
pub fn available_days(rows: &[ReportRow]) -> Vec<u32> {
    let mut days: Vec<u32> = rows.iter().map(|row| row.day).collect();
    days.sort_unstable();
    days.dedup();
    days
}
