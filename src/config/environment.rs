//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Todos los valores tienen un default que reproduce la expedición de Guangzhou.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::mission::Strategy;
use crate::models::station::BaseLocation;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    /// Directorio con los artefactos generados aguas arriba
    pub data_dir: PathBuf,
    /// Log append-only de registros de campo
    pub records_file: PathBuf,
    /// Estrategia fija de la página de reporte
    pub report_strategy: Strategy,
    pub nav_map_host: String,
    pub nav_policy: u32,
    pub nav_src_tag: String,
    pub qr_placeholder_path: Option<PathBuf>,
    pub city_filter: String,
    pub estimated_days: u32,
    pub base_location: BaseLocation,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from(env_or("DATA_DIR", "."));
        let records_file = env::var("RECORDS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("mission_test_records.csv"));

        Self {
            environment: env_or("ENVIRONMENT", "development"),
            port: env_parse("PORT", 3000),
            host: env_or("HOST", "0.0.0.0"),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            records_file,
            report_strategy: env_parse("REPORT_STRATEGY", Strategy::B),
            nav_map_host: env_or("NAV_MAP_HOST", "ditu.amap.com"),
            nav_policy: env_parse("NAV_POLICY", 2),
            nav_src_tag: env_or("NAV_SRC_TAG", "yourAppName"),
            qr_placeholder_path: Some(
                env::var("QR_PLACEHOLDER_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| data_dir.join("image/qrcode/qrcode_ex.png")),
            ),
            city_filter: env_or("CITY_FILTER", "广州市"),
            estimated_days: env_parse("ESTIMATED_DAYS", 8),
            base_location: BaseLocation {
                name: env_or("BASE_NAME", "广州 W 酒店"),
                latitude: env_parse("BASE_LATITUDE", 23.121988),
                longitude: env_parse("BASE_LONGITUDE", 113.328508),
            },
            data_dir,
        }
    }
}

impl EnvironmentConfig {
    /// Configuración con todos los archivos bajo un mismo directorio
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            records_file: data_dir.join("mission_test_records.csv"),
            qr_placeholder_path: Some(data_dir.join("image/qrcode/qrcode_ex.png")),
            data_dir,
            ..Self::default()
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección de escucha del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("⚠️ {}='{}' no es válido, usando {:?}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
