//! Route definitions for the Organic Farm Records backend

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - land parcel management
        .nest("/parcels", parcel_routes())
        // Protected routes - crop catalog
        .nest("/crops", crop_routes())
        // Protected routes - harvester registry
        .nest("/harvesters", harvester_routes())
        // Protected routes - goods admissions
        .nest("/admissions", admission_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Land parcel routes (protected)
fn parcel_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_parcels).post(handlers::create_parcel))
        .route(
            "/:parcel_id",
            get(handlers::get_parcel)
                .put(handlers::update_parcel)
                .delete(handlers::delete_parcel),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Crop catalog routes (protected)
fn crop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_crops).post(handlers::create_crop))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Harvester registry routes (protected)
fn harvester_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_harvesters).post(handlers::create_harvester),
        )
        .route(
            "/:harvester_id",
            axum::routing::put(handlers::update_harvester).delete(handlers::delete_harvester),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Goods admission routes (protected)
fn admission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_admissions).post(handlers::record_admission),
        )
        .route("/export", get(handlers::export_admissions))
        .route("/:admission_id", get(handlers::get_admission))
        .route_layer(middleware::from_fn(auth_middleware))
}
