//! Services module
//!
//! Este módulo contiene la lógica de negocio de la expedición: formulario de
//! campo, enlaces y QR de navegación, y agregados de la misión.

pub mod briefing_service;
pub mod field_capture_service;
pub mod mission_aggregator;
pub mod navigation_service;
pub mod qr_service;

pub use field_capture_service::FieldCaptureService;
pub use navigation_service::NavigationLinkGenerator;
pub use qr_service::QrPublisher;
