//! Staff registry HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::staff::{CreateStaffInput, StaffService, UpdateStaffInput};
use crate::AppState;

/// List staff members (staff only; admins use it to pick assignees)
pub async fn list_staff(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    if !current_user.0.is_staff() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = StaffService::new(state.db.clone());

    match service.get_staff().await {
        Ok(staff) => (StatusCode::OK, Json(serde_json::json!({ "staff": staff }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a staff member (staff only)
pub async fn get_staff_member(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !current_user.0.is_staff() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = StaffService::new(state.db.clone());

    match service.get_staff_member(id).await {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a staff member (admin only)
pub async fn create_staff_member(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStaffInput>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = StaffService::new(state.db.clone());

    match service.create_staff_member(input).await {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a staff member (admin only)
pub async fn update_staff_member(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStaffInput>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = StaffService::new(state.db.clone());

    match service.update_staff_member(id, input).await {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a staff member (admin only)
pub async fn delete_staff_member(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = StaffService::new(state.db.clone());

    match service.delete_staff_member(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
