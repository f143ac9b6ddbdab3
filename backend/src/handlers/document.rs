//! Document HTTP handlers: protocols, completion reports, CSV exports

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::request::{RequestFilter, RequestService};
use crate::services::DocumentService;
use crate::AppState;

/// Generate the submission protocol for a request
pub async fn generate_protocol(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> impl IntoResponse {
    let requests = RequestService::new(state.db.clone());

    let (request, resolved) = match requests.get_resolved_request(request_id).await {
        Ok(pair) => pair,
        Err(e) => return e.into_response(),
    };
    if !current_user.0.is_staff() && current_user.0.farmer_id != Some(request.farmer_id) {
        return AppError::InsufficientPermissions.into_response();
    }

    let documents = DocumentService::new(state.db.clone());
    match documents.generate_protocol(&request, &resolved).await {
        Ok(doc) => (StatusCode::CREATED, Json(doc)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Generate the completion report for a concluded request
pub async fn generate_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> impl IntoResponse {
    let requests = RequestService::new(state.db.clone());

    let (request, resolved) = match requests.get_resolved_request(request_id).await {
        Ok(pair) => pair,
        Err(e) => return e.into_response(),
    };
    if !current_user.0.is_staff() && current_user.0.farmer_id != Some(request.farmer_id) {
        return AppError::InsufficientPermissions.into_response();
    }

    let documents = DocumentService::new(state.db.clone());
    match documents.generate_report(&request, &resolved).await {
        Ok(doc) => (StatusCode::CREATED, Json(doc)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Export requests as CSV (staff only)
pub async fn export_requests_csv(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<RequestFilter>,
) -> impl IntoResponse {
    if !current_user.0.is_staff() {
        return AppError::InsufficientPermissions.into_response();
    }
    // Field staff export their own agenda, same scoping as the listing
    let filter = match super::request::scope_filter(&current_user, filter) {
        Ok(filter) => filter,
        Err(e) => return e.into_response(),
    };
    let requests = RequestService::new(state.db.clone());

    let resolved = match requests.get_resolved_requests(filter).await {
        Ok(resolved) => resolved,
        Err(e) => return e.into_response(),
    };

    let documents = DocumentService::new(state.db.clone());
    match documents.export_csv(&resolved).await {
        Ok(doc) => (StatusCode::CREATED, Json(doc)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List the documents generated for a request
pub async fn list_request_documents(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> impl IntoResponse {
    let requests = RequestService::new(state.db.clone());

    let request = match requests.get_request(request_id).await {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    if !current_user.0.is_staff() && current_user.0.farmer_id != Some(request.farmer_id) {
        return AppError::InsufficientPermissions.into_response();
    }

    let documents = DocumentService::new(state.db.clone());
    match documents.get_request_documents(request_id).await {
        Ok(docs) => (
            StatusCode::OK,
            Json(serde_json::json!({ "documents": docs })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Download a stored document's bytes
pub async fn download_document(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(document_id): Path<Uuid>,
) -> impl IntoResponse {
    let documents = DocumentService::new(state.db.clone());

    let doc = match documents.get_document(document_id).await {
        Ok(doc) => doc,
        Err(e) => return e.into_response(),
    };

    // Farmers may only download documents tied to their own requests
    if !current_user.0.is_staff() {
        let requests = RequestService::new(state.db.clone());
        match requests.get_request(doc.request_id).await {
            Ok(request) if current_user.0.farmer_id == Some(request.farmer_id) => {}
            _ => return AppError::InsufficientPermissions.into_response(),
        }
    }

    let extension = if doc.kind == "csv_export" { "csv" } else { "txt" };
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, doc.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}-{}.{}\"",
                    doc.kind, document_id, extension
                ),
            ),
        ],
        doc.content,
    )
        .into_response()
}
