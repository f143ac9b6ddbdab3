//! Service-type catalog HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::service_type::{
    CreateServiceTypeInput, ServiceTypeService, UpdateServiceTypeInput,
};
use crate::AppState;

/// List all service types (any authenticated user; farmers need the
/// catalog to submit)
pub async fn list_service_types(State(state): State<AppState>) -> impl IntoResponse {
    let service = ServiceTypeService::new(state.db.clone());

    match service.get_service_types().await {
        Ok(types) => (
            StatusCode::OK,
            Json(serde_json::json!({ "service_types": types })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a service type
pub async fn get_service_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ServiceTypeService::new(state.db.clone());

    match service.get_service_type(id).await {
        Ok(service_type) => (StatusCode::OK, Json(service_type)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a service type (admin only)
pub async fn create_service_type(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateServiceTypeInput>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = ServiceTypeService::new(state.db.clone());

    match service.create_service_type(input).await {
        Ok(service_type) => (StatusCode::CREATED, Json(service_type)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a service type (admin only)
pub async fn update_service_type(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateServiceTypeInput>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = ServiceTypeService::new(state.db.clone());

    match service.update_service_type(id, input).await {
        Ok(service_type) => (StatusCode::OK, Json(service_type)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a service type (admin only)
pub async fn delete_service_type(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = ServiceTypeService::new(state.db.clone());

    match service.delete_service_type(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
