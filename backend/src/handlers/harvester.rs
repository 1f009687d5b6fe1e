//! Harvester registry HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::CurrentMember;
use crate::services::harvester::{CreateHarvesterInput, HarvesterService, UpdateHarvesterInput};
use crate::AppState;

/// List the current member's harvesters
pub async fn list_harvesters(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
) -> impl IntoResponse {
    let service = HarvesterService::new(state.db.clone());

    match service.get_harvesters(current_member.member_id).await {
        Ok(harvesters) => (
            StatusCode::OK,
            Json(serde_json::json!({ "harvesters": harvesters })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a harvester
pub async fn create_harvester(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
    Json(input): Json<CreateHarvesterInput>,
) -> impl IntoResponse {
    let service = HarvesterService::new(state.db.clone());

    match service
        .create_harvester(current_member.member_id, input)
        .await
    {
        Ok(harvester) => (StatusCode::CREATED, Json(harvester)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a harvester
pub async fn update_harvester(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
    Path(harvester_id): Path<Uuid>,
    Json(input): Json<UpdateHarvesterInput>,
) -> impl IntoResponse {
    let service = HarvesterService::new(state.db.clone());

    match service
        .update_harvester(current_member.member_id, harvester_id, input)
        .await
    {
        Ok(harvester) => (StatusCode::OK, Json(harvester)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Remove a harvester
pub async fn delete_harvester(
    State(state): State<AppState>,
    Extension(current_member): Extension<CurrentMember>,
    Path(harvester_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = HarvesterService::new(state.db.clone());

    match service
        .delete_harvester(current_member.member_id, harvester_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
