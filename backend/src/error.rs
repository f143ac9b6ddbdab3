//! Error handling for RuralGest
//!
//! Provides consistent error responses in English and Portuguese with
//! stable machine-readable codes; the front-end classifies on the code,
//! never the wording.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_pt: String,
    },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// The farmer already has an open request for the same property and
    /// service; surfaced as a warning, distinguishable from generic
    /// conflicts
    #[error("Duplicate open request")]
    DuplicateOpenRequest,

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_pt: String,
    },

    /// Optimistic-concurrency rejection: the record changed since the
    /// client read it
    #[error("Stale version: expected {expected}, found {found}")]
    StaleVersion { expected: i32, found: i32 },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business rule errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Completion gate: the service type mandates an assignee
    #[error("Assignment required before completion")]
    AssignmentRequired,

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_pt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Map the error to its HTTP status and wire-format detail
    pub fn response_parts(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_CREDENTIALS".to_string(),
                    message_en: "Invalid email or password".to_string(),
                    message_pt: "E-mail ou senha incorretos".to_string(),
                    field: None,
                },
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "TOKEN_EXPIRED".to_string(),
                    message_en: "Token has expired".to_string(),
                    message_pt: "Sessão expirada, entre novamente".to_string(),
                    field: None,
                },
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_TOKEN".to_string(),
                    message_en: "Invalid token".to_string(),
                    message_pt: "Token inválido".to_string(),
                    field: None,
                },
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "INSUFFICIENT_PERMISSIONS".to_string(),
                    message_en: "You do not have permission to perform this action".to_string(),
                    message_pt: "Você não tem permissão para esta ação".to_string(),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_pt,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_pt: message_pt.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message_en: format!("A record with this {} already exists", field),
                    message_pt: format!("Já existe um registro com este {}", field),
                    field: Some(field.clone()),
                },
            ),
            AppError::DuplicateOpenRequest => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_OPEN_REQUEST".to_string(),
                    message_en: "An open request for this property and service already exists"
                        .to_string(),
                    message_pt:
                        "Já existe uma solicitação em aberto para esta propriedade e serviço"
                            .to_string(),
                    field: None,
                },
            ),
            AppError::Conflict {
                resource,
                message,
                message_pt,
            } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message_en: message.clone(),
                    message_pt: message_pt.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::StaleVersion { expected, found } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "STALE_VERSION".to_string(),
                    message_en: format!(
                        "The record changed since it was read (expected version {}, found {})",
                        expected, found
                    ),
                    message_pt: "O registro foi alterado por outro usuário, recarregue a página"
                        .to_string(),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_pt: format!("{} não encontrado(a)", resource),
                    field: None,
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message_en: msg.clone(),
                    message_pt: format!("Mudança de status não permitida: {}", msg),
                    field: None,
                },
            ),
            AppError::AssignmentRequired => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "ASSIGNMENT_REQUIRED".to_string(),
                    message_en: "A staff member must be assigned before completion".to_string(),
                    message_pt: "Atribua um funcionário antes de concluir a solicitação"
                        .to_string(),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_pt: "Erro de banco de dados".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_pt: "Erro interno do servidor".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_pt: "Erro interno do servidor".to_string(),
                    field: None,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.response_parts();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.response_parts().0
    }

    fn code_of(err: AppError) -> String {
        err.response_parts().1.code
    }

    #[test]
    fn test_conflict_family_maps_to_409_with_distinct_codes() {
        let conflicts = [
            AppError::DuplicateOpenRequest,
            AppError::StaleVersion {
                expected: 1,
                found: 2,
            },
            AppError::DuplicateEntry("name".to_string()),
        ];
        for err in &conflicts {
            assert_eq!(err.response_parts().0, StatusCode::CONFLICT);
        }

        // The front-end tells these apart by code alone
        assert_eq!(code_of(AppError::DuplicateOpenRequest), "DUPLICATE_OPEN_REQUEST");
        assert_eq!(
            code_of(AppError::StaleVersion {
                expected: 1,
                found: 2
            }),
            "STALE_VERSION"
        );
        assert_eq!(
            code_of(AppError::DuplicateEntry("name".to_string())),
            "DUPLICATE_ENTRY"
        );
    }

    #[test]
    fn test_lifecycle_rejections_map_to_422() {
        assert_eq!(
            status_of(AppError::AssignmentRequired),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::InvalidStateTransition("not pending".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_auth_rejections_map_to_401_and_403() {
        assert_eq!(
            status_of(AppError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(AppError::TokenExpired), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AppError::InsufficientPermissions),
            StatusCode::FORBIDDEN
        );
    }
}
