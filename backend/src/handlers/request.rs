//! Service-request HTTP handlers
//!
//! Role gating happens here: farmers are always pinned to their own
//! records before the service layer runs, staff-only operations reject
//! other callers up front.

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
use crate::services::request::{
    AssignInput, CancelInput, CompleteInput, CreateRequestInput, RequestFilter, RequestService,
    UpdateRequestInput,
};
use crate::AppState;
use shared::visibility::can_assign;

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    /// Staff may create on behalf of a farmer; farmers are pinned to
    /// their own profile and this field is ignored
    pub farmer_id: Option<Uuid>,
    #[serde(flatten)]
    pub request: CreateRequestInput,
}

/// Pin the filter to the caller's own records where the role demands it.
///
/// A field-staff or farmer token without its linked profile id cannot be
/// pinned to anything, so it gets rejected rather than widened to the
/// full listing.
pub(super) fn scope_filter(
    current_user: &CurrentUser,
    mut filter: RequestFilter,
) -> Result<RequestFilter, AppError> {
    if current_user.0.role.is_field_staff() && filter.assignee_id.is_none() {
        match current_user.0.staff_id {
            Some(staff_id) => filter.assignee_id = Some(staff_id),
            None => return Err(AppError::InsufficientPermissions),
        }
    }
    if !current_user.0.is_staff() {
        match current_user.0.farmer_id {
            Some(farmer_id) => filter.farmer_id = Some(farmer_id),
            None => return Err(AppError::InsufficientPermissions),
        }
    }
    Ok(filter)
}

/// List requests visible to the caller
pub async fn list_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<RequestFilter>,
) -> impl IntoResponse {
    let service = RequestService::new(state.db.clone());
    let filter = match scope_filter(&current_user, filter) {
        Ok(filter) => filter,
        Err(e) => return e.into_response(),
    };

    match service.get_requests(filter).await {
        Ok(requests) => (
            StatusCode::OK,
            Json(serde_json::json!({ "requests": requests })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List requests with foreign keys resolved to display names
pub async fn list_resolved_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<RequestFilter>,
) -> impl IntoResponse {
    let service = RequestService::new(state.db.clone());
    let filter = match scope_filter(&current_user, filter) {
        Ok(filter) => filter,
        Err(e) => return e.into_response(),
    };

    match service.get_resolved_requests(filter).await {
        Ok(requests) => (
            StatusCode::OK,
            Json(serde_json::json!({ "requests": requests })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a single request
pub async fn get_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = RequestService::new(state.db.clone());

    match service.get_request(request_id).await {
        Ok(request) => {
            if !current_user.0.is_staff() && current_user.0.farmer_id != Some(request.farmer_id) {
                return AppError::InsufficientPermissions.into_response();
            }
            (StatusCode::OK, Json(request)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Create a request
pub async fn create_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateRequestBody>,
) -> impl IntoResponse {
    let service = RequestService::new(state.db.clone());

    let farmer_id = if current_user.0.is_staff() {
        match body.farmer_id {
            Some(id) => id,
            None => {
                return AppError::Validation {
                    field: "farmer_id".to_string(),
                    message: "farmer_id is required for staff submissions".to_string(),
                    message_pt: "farmer_id é obrigatório para envios da equipe".to_string(),
                }
                .into_response()
            }
        }
    } else {
        match current_user.0.farmer_id {
            Some(id) => id,
            None => return AppError::InsufficientPermissions.into_response(),
        }
    };

    match service.create_request(farmer_id, body.request).await {
        Ok(request) => (StatusCode::CREATED, Json(request)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Edit a request
pub async fn update_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<UpdateRequestInput>,
) -> impl IntoResponse {
    let service = RequestService::new(state.db.clone());

    match service.update_request(&current_user.0, request_id, input).await {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Assign or unassign a staff member
pub async fn assign_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<AssignInput>,
) -> impl IntoResponse {
    if !can_assign(current_user.0.role.as_str()) {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = RequestService::new(state.db.clone());

    match service.assign(request_id, input).await {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Complete a request
pub async fn complete_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<CompleteInput>,
) -> impl IntoResponse {
    if !current_user.0.is_staff() {
        return AppError::InsufficientPermissions.into_response();
    }
    let service = RequestService::new(state.db.clone());

    match service.complete(&current_user.0, request_id, input).await {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Cancel a request
pub async fn cancel_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<CancelInput>,
) -> impl IntoResponse {
    let service = RequestService::new(state.db.clone());

    match service.cancel(&current_user.0, request_id, input).await {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(e) => e.into_response(),
    }
}
