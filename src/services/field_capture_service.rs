//! Formulario de captura de campo
//!
//! Construye un `Record` a partir de los widgets del formulario y de los dos
//! instantes capturados en la sesión, y lo entrega al almacén de registros.

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

use crate::dto::record_dto::{FormSchema, FormView, RecordForm, SubmitReceipt, RecordSummary};
use crate::models::record::*;
use crate::models::route::{is_mission_complete, DayFilter, ReportRow};
use crate::models::session::SessionTimestamps;
use crate::repositories::record_repository::RecordStore;
use crate::utils::errors::{validation_error, AppResult};
use validator::Validate;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const NO_STATION_MESSAGE: &str = "當前沒有可選的測試站點。";
pub const DOWNLOAD_PATH: &str = "/api/mission-report/records/download";

/// Botón "紀錄開始時間": sobrescribe el instante de inicio
pub fn capture_start_time(timestamps: &mut SessionTimestamps, now: NaiveDateTime) -> String {
    timestamps.start_time = now.format(TIMESTAMP_FORMAT).to_string();
    timestamps.start_time.clone()
}

/// Botón "紀錄結束時間": sobrescribe el instante de fin
pub fn capture_end_time(timestamps: &mut SessionTimestamps, now: NaiveDateTime) -> String {
    timestamps.end_time = now.format(TIMESTAMP_FORMAT).to_string();
    timestamps.end_time.clone()
}

/// Destinos seleccionables: únicos, en orden de aparición, sin filas de cierre
pub fn eligible_stations(rows: &[&ReportRow]) -> Vec<String> {
    let mut stations: Vec<String> = Vec::new();
    for row in rows {
        if is_mission_complete(&row.destination) {
            continue;
        }
        if !stations.iter().any(|s| s == &row.destination) {
            stations.push(row.destination.clone());
        }
    }
    stations
}

/// Esquema del formulario, o el aviso si no queda ninguna estación
pub fn form_view(filter: DayFilter, stations: Vec<String>, timestamps: &SessionTimestamps) -> FormView {
    if stations.is_empty() {
        return FormView {
            available: false,
            message: Some(NO_STATION_MESSAGE.to_string()),
            schema: None,
        };
    }

    FormView {
        available: true,
        message: None,
        schema: Some(FormSchema {
            day_filter: filter.to_string(),
            columns: Record::COLUMNS.to_vec(),
            stations,
            use_cases: UseCase::options(),
            statuses: TestStatus::options(),
            start_methods: StartMethod::options(),
            end_methods: EndMethod::options(),
            end_reasons: EndReason::options(),
            test_results: TestResult::options(),
            error_categories: ErrorCategory::options(),
            timestamps: timestamps.clone(),
        }),
    }
}

/// Texto libre de una opción "其他/Other": obligatorio si está elegida, vacío si no
fn override_text(is_other: bool, text: String, field: &'static str) -> AppResult<String> {
    if !is_other {
        return Ok(String::new());
    }
    if text.trim().is_empty() {
        return Err(validation_error(field, "override text is required when the other option is selected"));
    }
    Ok(text)
}

/// Construir el registro; las opciones desconocidas se rechazan
pub fn build_record(
    form: RecordForm,
    timestamps: &SessionTimestamps,
    today: NaiveDate,
) -> AppResult<Record> {
    form.validate()?;

    let use_case: UseCase = form.use_case.parse()?;
    let status: TestStatus = form.status.parse()?;
    let start_method: StartMethod = form.start_method.parse()?;
    let end_method: EndMethod = form.end_method.parse()?;
    let end_reason: EndReason = form.end_reason.parse()?;
    let test_result: TestResult = form.test_result.parse()?;
    let error_category: ErrorCategory = form.error_category.parse()?;

    Ok(Record {
        date: today,
        station: form.station,
        use_case,
        status,
        cpo_name: form.cpo_name,
        manufacturer: form.manufacturer,
        model: form.model,
        voltage: form.voltage,
        current: form.current,
        power: form.power,
        start_method,
        start_method_other: override_text(start_method.is_other(), form.start_method_other, "start_method_other")?,
        start_time: timestamps.start_time.clone(),
        start_soc: form.start_soc,
        end_time: timestamps.end_time.clone(),
        end_soc: form.end_soc,
        end_method,
        end_method_other: override_text(end_method.is_other(), form.end_method_other, "end_method_other")?,
        end_reason,
        end_reason_other: override_text(end_reason.is_other(), form.end_reason_other, "end_reason_other")?,
        test_result,
        error_category,
        error_category_other: override_text(
            error_category.is_other(),
            form.error_category_other,
            "error_category_other",
        )?,
        remark: form.remark,
    })
}

/// Envío del formulario hacia el almacén de registros
#[derive(Clone)]
pub struct FieldCaptureService {
    store: Arc<dyn RecordStore>,
}

impl FieldCaptureService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Añadir el registro y devolver la ubicación del log completo.
    /// El estado del formulario no se limpia.
    pub async fn submit(&self, record: Record) -> AppResult<SubmitReceipt> {
        let total_records = self.store.append(&record).await?;

        tracing::info!(
            "✅ Registro de '{}' ({}) guardado, {} en total",
            record.station,
            record.use_case,
            total_records
        );

        Ok(SubmitReceipt {
            summary: RecordSummary::from(&record),
            record,
            total_records,
            file_name: self.store.file_name(),
            download_url: DOWNLOAD_PATH.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::fixtures::row;
    use crate::repositories::record_repository::CsvRecordStore;
    use crate::utils::errors::AppError;

    fn form(station: &str) -> RecordForm {
        RecordForm {
            station: station.to_string(),
            use_case: "AC_UC1_17460722".to_string(),
            status: "正常測試".to_string(),
            cpo_name: String::new(),
            manufacturer: String::new(),
            model: String::new(),
            voltage: String::new(),
            current: String::new(),
            power: String::new(),
            start_method: "掃描 QRcode".to_string(),
            start_method_other: String::new(),
            start_soc: String::new(),
            end_soc: String::new(),
            end_method: "reached target SOC".to_string(),
            end_method_other: String::new(),
            end_reason: "手動結束".to_string(),
            end_reason_other: String::new(),
            test_result: "Pass".to_string(),
            error_category: "GBT".to_string(),
            error_category_other: String::new(),
            remark: String::new(),
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 18)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 18).unwrap()
    }

    #[test]
    fn test_capture_overwrites_slot() {
        let mut timestamps = SessionTimestamps::default();

        assert_eq!(capture_start_time(&mut timestamps, at(9, 5, 7)), "2025-08-18 09:05:07");
        capture_start_time(&mut timestamps, at(9, 6, 0));
        assert_eq!(timestamps.start_time, "2025-08-18 09:06:00");
        assert!(timestamps.end_time.is_empty());

        capture_end_time(&mut timestamps, at(10, 0, 0));
        assert_eq!(timestamps.end_time, "2025-08-18 10:00:00");
    }

    #[test]
    fn test_build_record_accepts_empty_free_text() {
        let timestamps = SessionTimestamps::default();
        let record = build_record(form("Station X"), &timestamps, today()).unwrap();

        assert_eq!(record.station, "Station X");
        assert_eq!(record.use_case, UseCase::Ac1);
        assert_eq!(record.test_result, TestResult::Pass);
        assert!(record.voltage.is_empty());
        assert!(record.start_time.is_empty());
        assert_eq!(record.date, today());
    }

    #[test]
    fn test_build_record_uses_session_timestamps() {
        let mut timestamps = SessionTimestamps::default();
        capture_start_time(&mut timestamps, at(9, 0, 0));
        capture_end_time(&mut timestamps, at(9, 45, 30));

        let record = build_record(form("Station X"), &timestamps, today()).unwrap();
        assert_eq!(record.start_time, "2025-08-18 09:00:00");
        assert_eq!(record.end_time, "2025-08-18 09:45:30");
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let mut bad = form("Station X");
        bad.error_category = "Battery".to_string();

        match build_record(bad, &SessionTimestamps::default(), today()) {
            Err(AppError::UnrecognizedCategory { field, value }) => {
                assert_eq!(field, "Error Describe");
                assert_eq!(value, "Battery");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_other_requires_override_text() {
        let mut missing = form("Station X");
        missing.start_method = "其他".to_string();
        assert!(matches!(
            build_record(missing, &SessionTimestamps::default(), today()),
            Err(AppError::Validation(_))
        ));

        let mut filled = form("Station X");
        filled.start_method = "其他".to_string();
        filled.start_method_other = "NFC 卡".to_string();
        filled.end_method = "Other".to_string();
        filled.end_method_other = "急停按鈕".to_string();
        let record = build_record(filled, &SessionTimestamps::default(), today()).unwrap();
        assert_eq!(record.start_method_display(), "NFC 卡");
        assert_eq!(record.end_method_display(), "急停按鈕");
    }

    #[test]
    fn test_override_ignored_when_not_other() {
        let mut stray = form("Station X");
        stray.end_reason_other = "leftover".to_string();

        let record = build_record(stray, &SessionTimestamps::default(), today()).unwrap();
        assert!(record.end_reason_other.is_empty());
    }

    #[test]
    fn test_blank_station_is_rejected() {
        assert!(matches!(
            build_record(form("  "), &SessionTimestamps::default(), today()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_eligible_stations() {
        let rows = vec![
            row(1, 1, "Hotel", "S1"),
            row(1, 2, "S1", "S2"),
            row(1, 2, "S2", "S1"),
            row(1, 2, "S2", "Day 1 完成測試"),
        ];
        let refs: Vec<&ReportRow> = rows.iter().collect();
        assert_eq!(eligible_stations(&refs), vec!["S1", "S2"]);

        let closing = vec![row(2, 2, "S2", "完成測試")];
        let refs: Vec<&ReportRow> = closing.iter().collect();
        assert!(eligible_stations(&refs).is_empty());
    }

    #[test]
    fn test_form_view_without_stations_shows_message() {
        let view = form_view(DayFilter::Day(2), Vec::new(), &SessionTimestamps::default());
        assert!(!view.available);
        assert_eq!(view.message.as_deref(), Some(NO_STATION_MESSAGE));
        assert!(view.schema.is_none());

        let view = form_view(DayFilter::All, vec!["S1".to_string()], &SessionTimestamps::default());
        let schema = view.schema.unwrap();
        assert_eq!(schema.day_filter, "全部");
        assert_eq!(schema.use_cases.len(), 6);
        assert_eq!(schema.columns.len(), 24);
        assert_eq!(schema.columns[1], "站點");
    }

    #[tokio::test]
    async fn test_submit_appends_and_keeps_counting() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CsvRecordStore::new(dir.path().join("mission_test_records.csv")));
        let service = FieldCaptureService::new(store.clone());
        let timestamps = SessionTimestamps::default();

        let first = build_record(form("Station X"), &timestamps, today()).unwrap();
        let receipt = service.submit(first).await.unwrap();
        assert_eq!(receipt.total_records, 1);
        assert_eq!(receipt.file_name, "mission_test_records.csv");
        assert_eq!(receipt.summary.use_case, "AC_UC1_17460722");

        let second = build_record(form("Station Y"), &timestamps, today()).unwrap();
        assert_eq!(service.submit(second).await.unwrap().total_records, 2);
    }

    #[tokio::test]
    async fn test_submit_succeeds_with_malformed_earlier_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mission_test_records.csv");
        let seeded = format!("{}\nbroken,row\n", Record::COLUMNS.join(","));
        tokio::fs::write(&path, seeded).await.unwrap();

        let store = Arc::new(CsvRecordStore::new(&path));
        let service = FieldCaptureService::new(store.clone());
        let record = build_record(form("Station X"), &SessionTimestamps::default(), today()).unwrap();

        let receipt = service.submit(record).await.unwrap();
        assert_eq!(receipt.total_records, 2);

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content.matches("Station X").count(), 1);
    }
}
