//! Notification HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::NotificationService;
use crate::AppState;

/// List the caller's notifications with the unread count
pub async fn get_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = NotificationService::new(state.db.clone());

    match service.get_notifications(current_user.0.user_id).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mark one notification as read
pub async fn mark_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = NotificationService::new(state.db.clone());

    match service
        .mark_read(current_user.0.user_id, notification_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mark all of the caller's notifications as read
pub async fn mark_all_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = NotificationService::new(state.db.clone());

    match service.mark_all_read(current_user.0.user_id).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(serde_json::json!({ "updated": updated })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
