//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean exactamente a las
//! columnas de los archivos CSV/JSON de la expedición.

pub mod analytics;
pub mod mission;
pub mod record;
pub mod route;
pub mod session;
pub mod station;
