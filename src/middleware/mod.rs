//! Middleware del sistema
//!
//! Por ahora solo CORS: el panel de la expedición se sirve desde otro origen.

pub mod cors;

pub use cors::*;
