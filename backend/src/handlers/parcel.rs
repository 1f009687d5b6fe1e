//! Land parcel HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::CurrentMember;
use crate::services::parcel::ParcelService;
use crate::AppState;
use shared::submission::ParcelSubmission;

/// List all parcels for the current member
pub async fn list_parcels(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
) -> impl IntoResponse {
    let service = ParcelService::new(state.db.clone());

    match service.get_parcels(current_member.member_id).await {
        Ok(parcels) => {
            (StatusCode::OK, Json(serde_json::json!({ "parcels": parcels }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Fetch a parcel with its sub parcels and crop rows for the edit form
pub async fn get_parcel(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
    Path(parcel_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ParcelService::new(state.db.clone());

    match service
        .get_parcel_with_children(current_member.member_id, parcel_id)
        .await
    {
        Ok(parcel) => (StatusCode::OK, Json(parcel)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a parcel aggregate
pub async fn create_parcel(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
    Json(submission): Json<ParcelSubmission>,
) -> impl IntoResponse {
    let service = ParcelService::new(state.db.clone());

    match service
        .create_parcel(current_member.member_id, submission)
        .await
    {
        Ok(parcel) => (StatusCode::CREATED, Json(parcel)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a parcel aggregate
pub async fn update_parcel(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
    Path(parcel_id): Path<Uuid>,
    Json(submission): Json<ParcelSubmission>,
) -> impl IntoResponse {
    let service = ParcelService::new(state.db.clone());

    match service
        .update_parcel(current_member.member_id, parcel_id, submission)
        .await
    {
        Ok(parcel) => (StatusCode::OK, Json(parcel)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a parcel
pub async fn delete_parcel(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
    Path(parcel_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ParcelService::new(state.db.clone());

    match service
        .delete_parcel(current_member.member_id, parcel_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
