use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::record::Record;
use crate::models::session::SessionTimestamps;

/// Valores actuales de los widgets del formulario de campo.
///
/// Las opciones cerradas llegan como su etiqueta visible; el servicio las
/// convierte y rechaza las desconocidas.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordForm {
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub station: String,
    pub use_case: String,
    pub status: String,

    #[serde(default)]
    pub cpo_name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub voltage: String,
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub power: String,

    pub start_method: String,
    #[serde(default)]
    pub start_method_other: String,
    #[serde(default)]
    pub start_soc: String,
    #[serde(default)]
    pub end_soc: String,

    pub end_method: String,
    #[serde(default)]
    pub end_method_other: String,
    pub end_reason: String,
    #[serde(default)]
    pub end_reason_other: String,

    pub test_result: String,
    pub error_category: String,
    #[serde(default)]
    pub error_category_other: String,

    #[serde(default)]
    pub remark: String,
}

/// Opciones y estado para dibujar el formulario
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub day_filter: String,
    /// Columnas del log, en el orden en que se escriben
    pub columns: Vec<&'static str>,
    pub stations: Vec<String>,
    pub use_cases: Vec<&'static str>,
    pub statuses: Vec<&'static str>,
    pub start_methods: Vec<&'static str>,
    pub end_methods: Vec<&'static str>,
    pub end_reasons: Vec<&'static str>,
    pub test_results: Vec<&'static str>,
    pub error_categories: Vec<&'static str>,
    pub timestamps: SessionTimestamps,
}

/// Formulario disponible, o el aviso informativo cuando no hay estaciones
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<FormSchema>,
}

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub field: &'static str,
    pub value: String,
}

/// Vista corta del registro con las opciones "其他/Other" ya resueltas
#[derive(Debug, Serialize)]
pub struct RecordSummary {
    pub station: String,
    pub use_case: String,
    pub test_result: String,
    pub start_method: String,
    pub end_method: String,
    pub end_reason: String,
    pub error_describe: String,
}

impl From<&Record> for RecordSummary {
    fn from(record: &Record) -> Self {
        Self {
            station: record.station.clone(),
            use_case: record.use_case.to_string(),
            test_result: record.test_result.to_string(),
            start_method: record.start_method_display().to_string(),
            end_method: record.end_method_display().to_string(),
            end_reason: record.end_reason_display().to_string(),
            error_describe: record.error_category_display().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitReceipt {
    pub record: Record,
    pub summary: RecordSummary,
    pub total_records: usize,
    pub file_name: String,
    pub download_url: String,
}
