use axum::{
    extract::{Path, Query, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http::header;
use uuid::Uuid;

use crate::controllers::mission_report_controller::MissionReportController;
use crate::dto::api_response::ApiResponse;
use crate::dto::navigation_dto::{DayQuery, QrPanel, SegmentView, SelectSegmentRequest, SelectSegmentResponse};
use crate::dto::record_dto::{CaptureResponse, FormView, RecordForm, SubmitReceipt};
use crate::models::analytics::MissionOverview;
use crate::models::record::Record;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_mission_report_router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/segments", get(list_segments))
        .route("/records", get(list_records))
        .route("/records/download", get(download_records))
        .route("/sessions/:session_id/form", get(get_form))
        .route("/sessions/:session_id/start-time", post(capture_start_time))
        .route("/sessions/:session_id/end-time", post(capture_end_time))
        .route("/sessions/:session_id/records", post(submit_record))
        .route("/sessions/:session_id/navigation", post(select_navigation))
        .route("/sessions/:session_id/qr-panel", get(get_qr_panel))
        .route("/sessions/:session_id/qr.png", get(get_qr_png))
}

async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<MissionOverview>, AppError> {
    let filter = query.filter()?;
    let controller = MissionReportController::new(state);
    Ok(Json(controller.overview(filter).await?))
}

async fn list_segments(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<SegmentView>>, AppError> {
    let filter = query.filter()?;
    let controller = MissionReportController::new(state);
    Ok(Json(controller.segments(filter).await?))
}

async fn get_form(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<DayQuery>,
) -> Result<Json<FormView>, AppError> {
    let filter = query.filter()?;
    let controller = MissionReportController::new(state);
    Ok(Json(controller.form(session_id, filter).await?))
}

async fn capture_start_time(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CaptureResponse>, AppError> {
    let controller = MissionReportController::new(state);
    Ok(Json(controller.capture_start(session_id).await?))
}

async fn capture_end_time(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CaptureResponse>, AppError> {
    let controller = MissionReportController::new(state);
    Ok(Json(controller.capture_end(session_id).await?))
}

async fn submit_record(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(form): Json<RecordForm>,
) -> Result<Json<ApiResponse<SubmitReceipt>>, AppError> {
    let controller = MissionReportController::new(state);
    let receipt = controller.submit(session_id, form).await?;
    let message = format!("已保存到檔案 {}！", receipt.file_name);
    Ok(Json(ApiResponse::success_with_message(receipt, message)))
}

async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<Record>>, AppError> {
    let controller = MissionReportController::new(state);
    Ok(Json(controller.records().await?))
}

async fn download_records(State(state): State<AppState>) -> Result<Response, AppError> {
    let controller = MissionReportController::new(state);
    let (file_name, bytes) = controller.download().await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .map_err(|e| AppError::Internal(format!("invalid download file name: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn select_navigation(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<DayQuery>,
    Json(request): Json<SelectSegmentRequest>,
) -> Result<Json<SelectSegmentResponse>, AppError> {
    let filter = query.filter()?;
    let controller = MissionReportController::new(state);
    Ok(Json(controller.select_navigation(session_id, filter, request.index).await?))
}

async fn get_qr_panel(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<DayQuery>,
) -> Result<Json<QrPanel>, AppError> {
    let filter = query.filter()?;
    let controller = MissionReportController::new(state);
    Ok(Json(controller.qr_panel(session_id, filter).await?))
}

async fn get_qr_png(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let controller = MissionReportController::new(state);
    let png = controller.qr_png(session_id).await?;
    Ok(([(header::CONTENT_TYPE, HeaderValue::from_static("image/png"))], png).into_response())
}
