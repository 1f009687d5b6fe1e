//! Goods admission HTTP handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::CurrentMember;
use crate::services::admission::{AdmissionService, RecordAdmissionInput};
use crate::AppState;

/// List the current member's admissions
pub async fn list_admissions(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
) -> impl IntoResponse {
    let service = AdmissionService::new(state.db.clone());

    match service.get_admissions(current_member.member_id).await {
        Ok(admissions) => (
            StatusCode::OK,
            Json(serde_json::json!({ "admissions": admissions })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a single admission
pub async fn get_admission(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
    Path(admission_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = AdmissionService::new(state.db.clone());

    match service
        .get_admission(current_member.member_id, admission_id)
        .await
    {
        Ok(admission) => (StatusCode::OK, Json(admission)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record an admission
pub async fn record_admission(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
    Json(input): Json<RecordAdmissionInput>,
) -> impl IntoResponse {
    let service = AdmissionService::new(state.db.clone());

    match service
        .record_admission(current_member.member_id, input)
        .await
    {
        Ok(admission) => (StatusCode::CREATED, Json(admission)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Export the current member's admissions as CSV
pub async fn export_admissions(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
) -> impl IntoResponse {
    let service = AdmissionService::new(state.db.clone());

    match service
        .export_admissions_csv(current_member.member_id)
        .await
    {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"admissions.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
