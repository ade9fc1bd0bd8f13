//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: configuración, repositorios, servicios y el
//! registro de sesiones del operador.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::models::session::SessionContext;
use crate::repositories::record_repository::{CsvRecordStore, RecordStore};
use crate::repositories::report_repository::ReportRepository;
use crate::services::field_capture_service::FieldCaptureService;
use crate::services::navigation_service::NavigationLinkGenerator;
use crate::services::qr_service::QrPublisher;
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub records: Arc<dyn RecordStore>,
    pub reports: ReportRepository,
    pub field_capture: FieldCaptureService,
    pub navigation: NavigationLinkGenerator,
    pub qr: QrPublisher,
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionContext>>>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig) -> Self {
        let records: Arc<dyn RecordStore> = Arc::new(CsvRecordStore::new(config.records_file.clone()));
        Self::with_record_store(config, records)
    }

    /// Estado con un almacén de registros explícito
    pub fn with_record_store(config: EnvironmentConfig, records: Arc<dyn RecordStore>) -> Self {
        let navigation = NavigationLinkGenerator::from_config(&config);
        Self {
            reports: ReportRepository::new(config.data_dir.clone()),
            field_capture: FieldCaptureService::new(records.clone()),
            qr: QrPublisher::new(navigation.clone(), config.qr_placeholder_path.clone()),
            navigation,
            records,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Abrir una sesión nueva con el estado vacío
    pub async fn start_session(&self) -> SessionContext {
        let session = SessionContext::new();
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());
        log::info!("🟢 Sesión {} iniciada ({} activas)", session.id, sessions.len());
        session
    }

    /// Cerrar la sesión; descarta instantes y selección pendiente
    pub async fn end_session(&self, id: Uuid) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.remove(&id) {
            Some(_) => {
                log::info!("🔴 Sesión {} cerrada ({} activas)", id, sessions.len());
                Ok(())
            }
            None => Err(not_found_error("Session", &id.to_string())),
        }
    }

    pub async fn session(&self, id: Uuid) -> AppResult<SessionContext> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error("Session", &id.to_string()))
    }

    /// Modificar el contexto de una sesión bajo el lock de escritura
    pub async fn update_session<T>(
        &self,
        id: Uuid,
        update: impl FnOnce(&mut SessionContext) -> T,
    ) -> AppResult<T> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Session", &id.to_string()))?;
        Ok(update(session))
    }
}
