//! Crop catalog HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::services::crop::{CreateCropInput, CropService};
use crate::AppState;

/// List crops eligible for turnover assignment
pub async fn list_crops(State(state): State<AppState>) -> impl IntoResponse {
    let service = CropService::new(state.db.clone());

    match service.get_crops().await {
        Ok(crops) => (StatusCode::OK, Json(serde_json::json!({ "crops": crops }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Add a crop to the catalog
pub async fn create_crop(
    State(state): State<AppState>,
    Json(input): Json<CreateCropInput>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone());

    match service.create_crop(input).await {
        Ok(crop) => (StatusCode::CREATED, Json(crop)).into_response(),
        Err(e) => e.into_response(),
    }
}
