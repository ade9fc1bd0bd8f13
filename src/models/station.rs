//! Modelos de estaciones de carga y del hotel base

use serde::{Deserialize, Serialize};

/// Estación objetivo del plan (`stations_D_gz.csv`, `all_map_stations.csv`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub station_name: String,
    pub operator_name: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub brand_keyword: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub power_type_final: Option<PowerType>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub rating: Option<f64>,
}

/// Tipo de potencia ya clasificado por el preprocesado (Is_AC / Is_DC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerType {
    #[serde(rename = "AC")]
    Ac,
    #[serde(rename = "DC")]
    Dc,
    Unknown,
}

/// Fila del censo nacional de estaciones (`national_charge_station.csv`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NationalStation {
    pub operator_name: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub city: Option<String>,
}

/// Categoría de marca de la estación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpoCategory {
    #[serde(rename = "友商品牌 (OEM)")]
    Oem,
    #[serde(rename = "主要品牌 (Primary CPO)")]
    Primary,
    #[serde(rename = "当地品牌 (Local CPO)")]
    Local,
}

impl CpoCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CpoCategory::Oem => "友商品牌 (OEM)",
            CpoCategory::Primary => "主要品牌 (Primary CPO)",
            CpoCategory::Local => "当地品牌 (Local CPO)",
        }
    }
}

/// Hotel elegido como base de operaciones (`best_hotel_info_<S>.json`)
///
/// Sólo el nombre tiene clave fija; el resto del JSON se conserva tal cual.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HotelInfo {
    #[serde(rename = "Hotel Name", default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HotelInfo {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("N/A")
    }
}

/// Punto fijo de la base de operaciones en el mapa de briefing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}
