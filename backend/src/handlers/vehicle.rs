//! Fleet HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::vehicle::{CreateVehicleInput, UpdateVehicleInput, VehicleService};
use crate::AppState;

/// List all vehicles (staff only)
pub async fn list_vehicles(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    if !current_user.0.is_staff() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = VehicleService::new(state.db.clone());

    match service.get_vehicles().await {
        Ok(vehicles) => (
            StatusCode::OK,
            Json(serde_json::json!({ "vehicles": vehicles })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a vehicle (staff only)
pub async fn get_vehicle(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !current_user.0.is_staff() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = VehicleService::new(state.db.clone());

    match service.get_vehicle(id).await {
        Ok(vehicle) => (StatusCode::OK, Json(vehicle)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a vehicle (admin only)
pub async fn create_vehicle(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateVehicleInput>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = VehicleService::new(state.db.clone());

    match service.create_vehicle(input).await {
        Ok(vehicle) => (StatusCode::CREATED, Json(vehicle)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a vehicle (admin only)
pub async fn update_vehicle(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateVehicleInput>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = VehicleService::new(state.db.clone());

    match service.update_vehicle(id, input).await {
        Ok(vehicle) => (StatusCode::OK, Json(vehicle)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a vehicle (admin only)
pub async fn delete_vehicle(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = VehicleService::new(state.db.clone());

    match service.delete_vehicle(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
