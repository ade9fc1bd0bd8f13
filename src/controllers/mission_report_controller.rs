//! Controlador de la página de reporte en curso
//!
//! Orquesta el filtro de día, la tabla de navegación, el panel del QR y el
//! formulario de registro de campo sobre la estrategia configurada.

use chrono::Local;
use uuid::Uuid;

use crate::dto::navigation_dto::{QrPanel, SegmentView, SelectSegmentResponse};
use crate::dto::record_dto::{CaptureResponse, FormView, RecordForm, SubmitReceipt};
use crate::models::analytics::MissionOverview;
use crate::models::record::Record;
use crate::models::route::{DayFilter, RouteSegment};
use crate::repositories::report_repository::ReportBundle;
use crate::services::field_capture_service::{
    build_record, capture_end_time, capture_start_time, eligible_stations, form_view,
};
use crate::services::mission_aggregator::mission_overview;
use crate::services::navigation_service::navigable_segments;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppError, AppResult};

pub struct MissionReportController {
    state: AppState,
}

impl MissionReportController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    async fn bundle(&self) -> AppResult<ReportBundle> {
        self.state
            .reports
            .load_report_bundle(self.state.config.report_strategy)
            .await
    }

    async fn filtered_segments(&self, filter: DayFilter) -> AppResult<Vec<RouteSegment>> {
        let bundle = self.bundle().await?;
        Ok(navigable_segments(&filter.apply(&bundle.report)))
    }

    pub async fn overview(&self, filter: DayFilter) -> AppResult<MissionOverview> {
        let bundle = self.bundle().await?;
        let title = format!("Dashboard of Charging Test: {}", bundle.strategy.short_name());

        Ok(mission_overview(
            title,
            bundle.hotel.display_name().to_string(),
            &bundle.report,
            filter,
            bundle.map_stations.len(),
        ))
    }

    pub async fn segments(&self, filter: DayFilter) -> AppResult<Vec<SegmentView>> {
        let segments = self.filtered_segments(filter).await?;
        Ok(segments
            .into_iter()
            .enumerate()
            .map(|(index, segment)| SegmentView {
                index,
                day: segment.day,
                caption: segment.caption(),
                navigation_url: self.state.navigation.build_link(&segment),
                segment,
            })
            .collect())
    }

    pub async fn form(&self, session_id: Uuid, filter: DayFilter) -> AppResult<FormView> {
        let session = self.state.session(session_id).await?;
        let bundle = self.bundle().await?;
        let stations = eligible_stations(&filter.apply(&bundle.report));

        Ok(form_view(filter, stations, &session.timestamps))
    }

    pub async fn capture_start(&self, session_id: Uuid) -> AppResult<CaptureResponse> {
        let now = Local::now().naive_local();
        let value = self
            .state
            .update_session(session_id, |session| capture_start_time(&mut session.timestamps, now))
            .await?;

        log::info!("⏱️ Sesión {}: inicio {}", session_id, value);
        Ok(CaptureResponse {
            field: "start_time",
            value,
        })
    }

    pub async fn capture_end(&self, session_id: Uuid) -> AppResult<CaptureResponse> {
        let now = Local::now().naive_local();
        let value = self
            .state
            .update_session(session_id, |session| capture_end_time(&mut session.timestamps, now))
            .await?;

        log::info!("⏱️ Sesión {}: fin {}", session_id, value);
        Ok(CaptureResponse {
            field: "end_time",
            value,
        })
    }

    pub async fn submit(&self, session_id: Uuid, form: RecordForm) -> AppResult<SubmitReceipt> {
        let session = self.state.session(session_id).await?;
        let today = Local::now().date_naive();

        let record = build_record(form, &session.timestamps, today).map_err(|e| {
            if let AppError::UnrecognizedCategory { field, value } = &e {
                tracing::warn!(
                    "🚫 Registro rechazado en sesión {}: '{}' no es válido para '{}'",
                    session_id,
                    value,
                    field
                );
            }
            e
        })?;

        self.state.field_capture.submit(record).await
    }

    pub async fn records(&self) -> AppResult<Vec<Record>> {
        self.state.records.read_all().await
    }

    /// Nombre de archivo y bytes del log completo
    pub async fn download(&self) -> AppResult<(String, Vec<u8>)> {
        let bytes = self.state.records.export().await?;
        Ok((self.state.records.file_name(), bytes))
    }

    pub async fn select_navigation(
        &self,
        session_id: Uuid,
        filter: DayFilter,
        index: usize,
    ) -> AppResult<SelectSegmentResponse> {
        let segments = self.filtered_segments(filter).await?;
        let segment = segments.get(index).ok_or_else(|| {
            bad_request_error(&format!(
                "Segment index {} out of range ({} segments for day filter {})",
                index,
                segments.len(),
                filter
            ))
        })?;

        let qr = &self.state.qr;
        let navigation_url = self
            .state
            .update_session(session_id, |session| qr.select_segment(session, segment))
            .await?;

        Ok(SelectSegmentResponse {
            caption: segment.caption(),
            navigation_url,
        })
    }

    pub async fn qr_panel(&self, session_id: Uuid, filter: DayFilter) -> AppResult<QrPanel> {
        let session = self.state.session(session_id).await?;
        let segments = match session.pending_navigation {
            // sin selección no hace falta cargar el reporte
            None => Vec::new(),
            Some(_) => self.filtered_segments(filter).await?,
        };

        self.state
            .qr
            .render_panel(session.pending_navigation.as_deref(), &segments)
            .await
    }

    pub async fn qr_png(&self, session_id: Uuid) -> AppResult<Vec<u8>> {
        let session = self.state.session(session_id).await?;
        let url = session.pending_navigation.ok_or_else(|| {
            AppError::NotFound(format!("Session {} has no navigation selected", session_id))
        })?;
        self.state.qr.render_png(&url)
    }
}
