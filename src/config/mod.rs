//! Configuración del proyecto
//!
//! Este módulo contiene las variables de entorno y rutas de datos del sistema.

pub mod environment;

pub use environment::*;
