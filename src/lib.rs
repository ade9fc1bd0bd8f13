//! Backend de la expedición de pruebas de carga
//!
//! Sirve las tres páginas del panel (inicio, reporte en curso y misión
//! completada) y mantiene el log de registros de campo en CSV.

pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app_router;
pub use state::AppState;
