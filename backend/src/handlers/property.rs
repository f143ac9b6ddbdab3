//! Rural property HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::property::{CreatePropertyInput, PropertyService, UpdatePropertyInput};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PropertyFilter {
    pub farmer_id: Option<Uuid>,
}

/// List properties; farmers see only their own
pub async fn list_properties(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<PropertyFilter>,
) -> impl IntoResponse {
    let service = PropertyService::new(state.db.clone());

    let farmer_id = if current_user.0.is_staff() {
        filter.farmer_id
    } else {
        current_user.0.farmer_id
    };

    match service.get_properties(farmer_id).await {
        Ok(properties) => (
            StatusCode::OK,
            Json(serde_json::json!({ "properties": properties })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a property; farmers may only read their own
pub async fn get_property(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let service = PropertyService::new(state.db.clone());

    match service.get_property(id).await {
        Ok(property) => {
            if !current_user.0.is_staff() && current_user.0.farmer_id != Some(property.farmer_id) {
                return AppError::InsufficientPermissions.into_response();
            }
            (StatusCode::OK, Json(property)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Register a property; farmers are pinned to their own profile
pub async fn create_property(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(mut input): Json<CreatePropertyInput>,
) -> impl IntoResponse {
    if !current_user.0.is_staff() {
        match current_user.0.farmer_id {
            Some(id) => input.farmer_id = id,
            None => return AppError::InsufficientPermissions.into_response(),
        }
    }
    let service = PropertyService::new(state.db.clone());

    match service.create_property(input).await {
        Ok(property) => (StatusCode::CREATED, Json(property)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a property; farmers may only update their own
pub async fn update_property(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePropertyInput>,
) -> impl IntoResponse {
    let service = PropertyService::new(state.db.clone());

    if !current_user.0.is_staff() {
        match service.get_property(id).await {
            Ok(property) if current_user.0.farmer_id == Some(property.farmer_id) => {}
            Ok(_) => return AppError::InsufficientPermissions.into_response(),
            Err(e) => return e.into_response(),
        }
    }

    match service.update_property(id, input).await {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a property (admin only)
pub async fn delete_property(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !current_user.0.is_admin() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = PropertyService::new(state.db.clone());

    match service.delete_property(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
