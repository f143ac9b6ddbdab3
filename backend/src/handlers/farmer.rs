//! Farmer registry HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::farmer::{CreateFarmerInput, FarmerService, UpdateFarmerInput};
use crate::AppState;

/// List all farmers (staff only)
pub async fn list_farmers(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    if !current_user.0.is_staff() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = FarmerService::new(state.db.clone());

    match service.get_farmers().await {
        Ok(farmers) => (
            StatusCode::OK,
            Json(serde_json::json!({ "farmers": farmers })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a farmer; farmers may only read their own profile
pub async fn get_farmer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !current_user.0.is_staff() && current_user.0.farmer_id != Some(id) {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = FarmerService::new(state.db.clone());

    match service.get_farmer(id).await {
        Ok(farmer) => (StatusCode::OK, Json(farmer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a farmer record without a login (admin only)
pub async fn create_farmer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateFarmerInput>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = FarmerService::new(state.db.clone());

    match service.create_farmer(input).await {
        Ok(farmer) => (StatusCode::CREATED, Json(farmer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a farmer; farmers may update their own profile
pub async fn update_farmer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateFarmerInput>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() && current_user.0.farmer_id != Some(id) {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = FarmerService::new(state.db.clone());

    match service.update_farmer(id, input).await {
        Ok(farmer) => (StatusCode::OK, Json(farmer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a farmer (admin only)
pub async fn delete_farmer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = FarmerService::new(state.db.clone());

    match service.delete_farmer(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
