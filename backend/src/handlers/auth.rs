//! Authentication HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::services::auth::{AuthService, LoginInput, RefreshInput, RegisterMemberInput};
use crate::AppState;

/// Register a new cooperative member with its owner account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterMemberInput>,
) -> impl IntoResponse {
    let service = AuthService::new(state.db.clone(), &state.config);

    match service.register_member(input).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> impl IntoResponse {
    let service = AuthService::new(state.db.clone(), &state.config);

    match service.login(input).await {
        Ok(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Exchange a refresh token for a fresh token pair
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshInput>,
) -> impl IntoResponse {
    let service = AuthService::new(state.db.clone(), &state.config);

    match service.refresh(input).await {
        Ok(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        Err(e) => e.into_response(),
    }
}
