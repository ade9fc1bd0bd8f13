//! Repositorio de artefactos de planificación
//!
//! Lee los archivos generados aguas arriba (reportes de ruta, estaciones,
//! hotel base, resultados finales). Un archivo ausente se reporta con su
//! nombre para que la página se detenga sin renderizar nada parcial.

use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::mission::{MissionOutcome, Strategy};
use crate::models::route::ReportRow;
use crate::models::station::{HotelInfo, NationalStation, Station};
use crate::repositories::record_repository::UTF8_BOM;
use crate::utils::errors::{AppError, AppResult};

pub const MAP_STATIONS_FILE: &str = "all_map_stations.csv";
pub const PLAN_STATIONS_FILE: &str = "stations_D_gz.csv";
pub const NATIONAL_STATIONS_FILE: &str = "national_charge_station.csv";
pub const FINAL_REPORT_FILE: &str = "final_mission_report.csv";

/// Todo lo que necesita la página de reporte para una estrategia
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub strategy: Strategy,
    pub report: Vec<ReportRow>,
    pub map_stations: Vec<Station>,
    pub hotel: HotelInfo,
}

#[derive(Debug, Clone)]
pub struct ReportRepository {
    data_dir: PathBuf,
}

impl ReportRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn read_file(&self, file_name: &str) -> AppResult<Vec<u8>> {
        let path = self.data_dir.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::MissingInputFile(file_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read_csv<T: DeserializeOwned>(&self, file_name: &str) -> AppResult<Vec<T>> {
        let bytes = self.read_file(file_name).await?;
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
        let rows = csv::Reader::from_reader(content)
            .deserialize()
            .collect::<Result<Vec<T>, csv::Error>>()?;

        log::debug!("📊 {} filas cargadas de {}", rows.len(), file_name);
        Ok(rows)
    }

    pub async fn load_report(&self, strategy: Strategy) -> AppResult<Vec<ReportRow>> {
        self.read_csv(&strategy.report_file()).await
    }

    pub async fn load_map_stations(&self) -> AppResult<Vec<Station>> {
        self.read_csv(MAP_STATIONS_FILE).await
    }

    pub async fn load_plan_stations(&self) -> AppResult<Vec<Station>> {
        self.read_csv(PLAN_STATIONS_FILE).await
    }

    pub async fn load_national_stations(&self) -> AppResult<Vec<NationalStation>> {
        self.read_csv(NATIONAL_STATIONS_FILE).await
    }

    pub async fn load_final_report(&self) -> AppResult<Vec<MissionOutcome>> {
        self.read_csv(FINAL_REPORT_FILE).await
    }

    pub async fn load_hotel(&self, strategy: Strategy) -> AppResult<HotelInfo> {
        let bytes = self.read_file(&strategy.hotel_file()).await?;
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
        Ok(serde_json::from_slice(content)?)
    }

    /// Reporte + estaciones del mapa + hotel, todo o nada
    pub async fn load_report_bundle(&self, strategy: Strategy) -> AppResult<ReportBundle> {
        let report = self.load_report(strategy).await?;
        let map_stations = self.load_map_stations().await?;
        let hotel = self.load_hotel(strategy).await?;

        tracing::info!(
            "🗂️ Estrategia {} cargada: {} filas de ruta, {} estaciones en mapa",
            strategy.prefix(),
            report.len(),
            map_stations.len()
        );

        Ok(ReportBundle {
            strategy,
            report,
            map_stations,
            hotel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT_CSV: &str = "\
第幾天,累積目標數,出發地,出發地經度,出發地緯度,目的地,目的地經度,目的地緯度,距離
1,1,广州 W 酒店,113.328508,23.121988,星星充电 珠江新城,113.3245,23.1190,2.1
1,2,星星充电 珠江新城,113.3245,23.1190,特来电 天河站,113.3612,23.1401,5.4
1,2,特来电 天河站,113.3612,23.1401,Day 1 完成測試,,,
";

    async fn write(dir: &Path, name: &str, content: &str) {
        tokio::fs::write(dir.join(name), content).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let repository = ReportRepository::new(dir.path());

        match repository.load_report(Strategy::B).await {
            Err(AppError::MissingInputFile(name)) => assert_eq!(name, "report_B_enriched.csv"),
            other => panic!("unexpected result: {:?}", other.map(|rows| rows.len())),
        }
    }

    #[tokio::test]
    async fn test_load_report_with_closing_row() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "report_B_enriched.csv", REPORT_CSV).await;
        let repository = ReportRepository::new(dir.path());

        let rows = repository.load_report(Strategy::B).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].cumulative_targets, Some(2));
        assert_eq!(rows[2].destination_lng, None);
        assert!(rows[2].to_segment().is_none());
    }

    #[tokio::test]
    async fn test_bundle_requires_every_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "report_B_enriched.csv", REPORT_CSV).await;
        write(
            dir.path(),
            "all_map_stations.csv",
            "station_name,operator_name,brand_keyword,latitude,longitude,power_type_final,rating\n\
             星星充电 珠江新城,星星充电,,23.1190,113.3245,DC,4.5\n",
        )
        .await;
        let repository = ReportRepository::new(dir.path());

        match repository.load_report_bundle(Strategy::B).await {
            Err(AppError::MissingInputFile(name)) => assert_eq!(name, "best_hotel_info_B.json"),
            other => panic!("unexpected result: {:?}", other.map(|b| b.report.len())),
        }

        write(dir.path(), "best_hotel_info_B.json", r#"{"Hotel Name": "广州 W 酒店", "score": 0.92}"#).await;
        let bundle = repository.load_report_bundle(Strategy::B).await.unwrap();
        assert_eq!(bundle.hotel.display_name(), "广州 W 酒店");
        assert_eq!(bundle.hotel.extra["score"], 0.92);
        assert_eq!(bundle.map_stations[0].brand_keyword, None);
    }
}
