//! Modelo de Record
//!
//! Un registro es una observación manual de prueba en un punto de carga.
//! Los nombres serializados de cada campo son exactamente las columnas del
//! archivo `mission_test_records.csv`, así que el orden de los campos del
//! struct define el orden de las columnas.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::errors::AppError;

/// Declara una opción cerrada del formulario: variantes, etiqueta visible
/// (que es también el valor serializado) y el parseo estricto desde la etiqueta.
macro_rules! form_choice {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn options() -> Vec<&'static str> {
                Self::ALL.iter().map(|choice| choice.label()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok($name::$variant),)+
                    other => Err(AppError::UnrecognizedCategory {
                        field: $field.to_string(),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

form_choice! {
    /// Caso de uso del protocolo de prueba
    UseCase, field = "Use Case" {
        Ac1 => "AC_UC1_17460722",
        Ac2 => "AC_UC2_7460719",
        Ac3 => "AC_UC3_17460723",
        Dc4 => "DC_UC4_17460724",
        Dc5 => "DC_UC5_17460720",
        Dc6 => "DC_UC6_17460721",
    }
}

form_choice! {
    TestStatus, field = "狀態" {
        Normal => "正常測試",
        CannotTest => "無法測試",
    }
}

form_choice! {
    /// Forma de iniciar la sesión de carga
    StartMethod, field = "開啟電裝方式" {
        QrCode => "掃描 QRcode",
        Card => "插卡",
        App => "APP 操作",
        Other => "其他",
    }
}

form_choice! {
    EndMethod, field = "結束方法" {
        TargetSoc => "reached target SOC",
        Lat => "LAT",
        Cid => "CID",
        Rfid => "RFID",
        App => "APP",
        Other => "Other",
    }
}

form_choice! {
    EndReason, field = "充電結束原因" {
        Manual => "手動結束",
        TargetReached => "達到目標電量",
        Other => "其他",
    }
}

form_choice! {
    TestResult, field = "測試結果" {
        Pass => "Pass",
        Failed => "Failed",
    }
}

form_choice! {
    /// Origen del fallo observado
    ErrorCategory, field = "Error Describe" {
        Gbt => "GBT",
        Charger => "Charger",
        Abk => "ABK",
        Hvs => "HVS",
        Ccu => "CCU",
        Lat => "LAT",
        Cid => "CID",
        Phud => "PHUD",
        Other => "Other",
    }
}

impl StartMethod {
    pub fn is_other(&self) -> bool {
        matches!(self, StartMethod::Other)
    }
}

impl EndMethod {
    pub fn is_other(&self) -> bool {
        matches!(self, EndMethod::Other)
    }
}

impl EndReason {
    pub fn is_other(&self) -> bool {
        matches!(self, EndReason::Other)
    }
}

impl ErrorCategory {
    pub fn is_other(&self) -> bool {
        matches!(self, ErrorCategory::Other)
    }
}

/// Registro de prueba de campo - una fila del log append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "日期")]
    pub date: NaiveDate,
    #[serde(rename = "站點")]
    pub station: String,
    #[serde(rename = "Use Case")]
    pub use_case: UseCase,
    #[serde(rename = "狀態")]
    pub status: TestStatus,
    #[serde(rename = "CPO Name")]
    pub cpo_name: String,
    #[serde(rename = "製造商")]
    pub manufacturer: String,
    #[serde(rename = "MODEL")]
    pub model: String,
    #[serde(rename = "電壓(V)")]
    pub voltage: String,
    #[serde(rename = "電流(A)")]
    pub current: String,
    #[serde(rename = "功率(kW)")]
    pub power: String,
    #[serde(rename = "開啟電裝方式")]
    pub start_method: StartMethod,
    #[serde(rename = "開啟電裝方式_其他說明")]
    pub start_method_other: String,
    #[serde(rename = "開始時間")]
    pub start_time: String,
    #[serde(rename = "開始電量(%)")]
    pub start_soc: String,
    #[serde(rename = "結束時間")]
    pub end_time: String,
    #[serde(rename = "結束電量(%)")]
    pub end_soc: String,
    #[serde(rename = "結束方法")]
    pub end_method: EndMethod,
    #[serde(rename = "結束方法_其他說明")]
    pub end_method_other: String,
    #[serde(rename = "充電結束原因")]
    pub end_reason: EndReason,
    #[serde(rename = "充電結束原因_其他說明")]
    pub end_reason_other: String,
    #[serde(rename = "測試結果")]
    pub test_result: TestResult,
    #[serde(rename = "Error Describe")]
    pub error_category: ErrorCategory,
    #[serde(rename = "Error Describe_其他說明")]
    pub error_category_other: String,
    #[serde(rename = "備註")]
    pub remark: String,
}

impl Record {
    /// Nombres de columna en el orden en que se escriben
    pub const COLUMNS: [&'static str; 24] = [
        "日期",
        "站點",
        "Use Case",
        "狀態",
        "CPO Name",
        "製造商",
        "MODEL",
        "電壓(V)",
        "電流(A)",
        "功率(kW)",
        "開啟電裝方式",
        "開啟電裝方式_其他說明",
        "開始時間",
        "開始電量(%)",
        "結束時間",
        "結束電量(%)",
        "結束方法",
        "結束方法_其他說明",
        "充電結束原因",
        "充電結束原因_其他說明",
        "測試結果",
        "Error Describe",
        "Error Describe_其他說明",
        "備註",
    ];

    /// Etiqueta visible del método de inicio, usando la descripción libre si es "其他"
    pub fn start_method_display(&self) -> &str {
        display_with_other(self.start_method.is_other(), self.start_method.label(), &self.start_method_other)
    }

    pub fn end_method_display(&self) -> &str {
        display_with_other(self.end_method.is_other(), self.end_method.label(), &self.end_method_other)
    }

    pub fn end_reason_display(&self) -> &str {
        display_with_other(self.end_reason.is_other(), self.end_reason.label(), &self.end_reason_other)
    }

    pub fn error_category_display(&self) -> &str {
        display_with_other(self.error_category.is_other(), self.error_category.label(), &self.error_category_other)
    }
}

fn display_with_other<'a>(is_other: bool, label: &'a str, other: &'a str) -> &'a str {
    if is_other && !other.is_empty() {
        other
    } else {
        label
    }
}
