//! Estado de sesión del operador
//!
//! Cada sesión interactiva tiene su propio contexto explícito: los dos
//! instantes capturados del formulario y la selección de navegación que
//! alimenta el panel del QR. Nada de esto se persiste.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Instantes pendientes del formulario; vacío significa "no capturado"
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionTimestamps {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub timestamps: SessionTimestamps,
    /// URL de navegación seleccionada (una como máximo, la última gana)
    pub pending_navigation: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            timestamps: SessionTimestamps::default(),
            pending_navigation: None,
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
