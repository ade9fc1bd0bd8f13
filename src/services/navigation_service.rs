//! Generador de enlaces de navegación
//!
//! Convierte un segmento origen → destino en un deep link de la app de
//! mapas. El enlace es determinista: el panel del QR lo usa como única clave
//! para volver a encontrar el segmento.

use crate::config::environment::EnvironmentConfig;
use crate::models::route::{LngLat, ReportRow, RouteSegment};

#[derive(Debug, Clone)]
pub struct NavigationLinkGenerator {
    map_host: String,
    policy: u32,
    src_tag: String,
}

impl NavigationLinkGenerator {
    pub fn new(map_host: impl Into<String>, policy: u32, src_tag: impl Into<String>) -> Self {
        Self {
            map_host: map_host.into(),
            policy,
            src_tag: src_tag.into(),
        }
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(
            config.nav_map_host.clone(),
            config.nav_policy,
            config.nav_src_tag.clone(),
        )
    }

    /// Deep link de conducción para el segmento
    pub fn build_link(&self, segment: &RouteSegment) -> String {
        format!(
            "https://{}/dir?type=car&policy={}\
             &from%5Bname%5D={}&from%5Blnglat%5D={}\
             &to%5Bname%5D={}&to%5Blnglat%5D={}\
             &src={}",
            self.map_host,
            self.policy,
            urlencoding::encode(&segment.origin.name),
            lnglat(&segment.origin.position),
            urlencoding::encode(&segment.destination.name),
            lnglat(&segment.destination.position),
            urlencoding::encode(&self.src_tag),
        )
    }
}

impl Default for NavigationLinkGenerator {
    fn default() -> Self {
        Self::new("ditu.amap.com", 2, "yourAppName")
    }
}

/// `113.0` se escribe `113.0`, igual que el texto del reporte
fn lnglat(position: &LngLat) -> String {
    format!("{:?},{:?}", position.lng, position.lat)
}

/// Segmentos navegables de las filas filtradas, en el orden del reporte
pub fn navigable_segments(rows: &[&ReportRow]) -> Vec<RouteSegment> {
    rows.iter().filter_map(|row| row.to_segment()).collect()
}
