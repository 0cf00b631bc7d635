/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Error as AnyhowError;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jobbergate_core::consts::FOREIGN_KEY_ERROR_MESSAGE;
use jobbergate_core::input::InputError;
use jobbergate_core::permission::IdentityError;
use jobbergate_core::render::RenderError;
use jobbergate_core::service::ServiceError;
use jobbergate_core::storage::StorageError;
use jobbergate_core::types::BaseResponse;
use sea_orm::DbErr;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum WebError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    ForeignKey { table: String, pk_id: i32 },
    PayloadTooLarge(u64),
    UnprocessableEntity(String),
    Database(DbErr),
    Storage(StorageError),
    InputValidation(InputError),
    Render(RenderError),
    JsonParsing(JsonRejection),
    Multipart(MultipartError),
    Internal(AnyhowError),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            WebError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            WebError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            WebError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            WebError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            WebError::ForeignKey { table, pk_id } => write!(
                f,
                "{} (table {}, id {})",
                FOREIGN_KEY_ERROR_MESSAGE, table, pk_id
            ),
            WebError::PayloadTooLarge(limit) => {
                write!(f, "Payload Too Large: limit is {} bytes", limit)
            }
            WebError::UnprocessableEntity(msg) => write!(f, "Unprocessable Entity: {}", msg),
            WebError::Database(err) => write!(f, "Database error: {}", err),
            WebError::Storage(err) => write!(f, "Storage error: {}", err),
            WebError::InputValidation(err) => write!(f, "Input validation error: {}", err),
            WebError::Render(err) => write!(f, "Render error: {}", err),
            WebError::JsonParsing(err) => write!(f, "JSON parsing error: {}", err),
            WebError::Multipart(err) => write!(f, "Multipart error: {}", err),
            WebError::Internal(err) => write!(f, "Internal error: {}", err),
        }
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WebError::Database(err) => Some(err),
            WebError::Storage(err) => Some(err),
            WebError::InputValidation(err) => Some(err),
            WebError::Render(err) => Some(err),
            WebError::JsonParsing(err) => Some(err),
            WebError::Multipart(err) => Some(err),
            WebError::Internal(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<DbErr> for WebError {
    fn from(err: DbErr) -> Self {
        WebError::Database(err)
    }
}

impl From<ServiceError> for WebError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(label) => WebError::not_found(&label),
            ServiceError::Conflict(msg) => WebError::Conflict(msg),
            ServiceError::ForeignKey { table, pk_id } => WebError::ForeignKey { table, pk_id },
            e @ (ServiceError::InvalidSortField(_) | ServiceError::InvalidPagination(_)) => {
                WebError::UnprocessableEntity(e.to_string())
            }
            ServiceError::Storage(err) => WebError::from(err),
            ServiceError::Database(err) => WebError::Database(err),
        }
    }
}

impl From<StorageError> for WebError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => WebError::NotFound(format!("File {} not found", key)),
            err => WebError::Storage(err),
        }
    }
}

impl From<InputError> for WebError {
    fn from(err: InputError) -> Self {
        WebError::InputValidation(err)
    }
}

impl From<RenderError> for WebError {
    fn from(err: RenderError) -> Self {
        WebError::Render(err)
    }
}

impl From<IdentityError> for WebError {
    fn from(err: IdentityError) -> Self {
        WebError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for WebError {
    fn from(err: JsonRejection) -> Self {
        WebError::JsonParsing(err)
    }
}

impl From<MultipartError> for WebError {
    fn from(err: MultipartError) -> Self {
        WebError::Multipart(err)
    }
}

impl From<AnyhowError> for WebError {
    fn from(err: AnyhowError) -> Self {
        WebError::Internal(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
            WebError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!(msg)),
            WebError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!(msg)),
            WebError::NotFound(msg) => (StatusCode::NOT_FOUND, json!(msg)),
            WebError::Conflict(msg) => (StatusCode::CONFLICT, json!(msg)),
            WebError::ForeignKey { table, pk_id } => (
                StatusCode::CONFLICT,
                json!({
                    "message": FOREIGN_KEY_ERROR_MESSAGE,
                    "table": table,
                    "pk_id": pk_id,
                }),
            ),
            WebError::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!(format!("Uploaded files cannot exceed {} bytes", limit)),
            ),
            WebError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, json!(msg)),
            WebError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, json!("Database error"))
            }
            WebError::Storage(err) => {
                tracing::error!("Storage error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, json!("Storage error"))
            }
            WebError::InputValidation(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!(err.to_string()))
            }
            WebError::Render(err) => (StatusCode::UNPROCESSABLE_ENTITY, json!(err.to_string())),
            WebError::JsonParsing(err) => (
                StatusCode::BAD_REQUEST,
                json!(format!("Invalid JSON: {}", err)),
            ),
            WebError::Multipart(err) => (err.status(), json!(err.body_text())),
            WebError::Internal(err) => {
                tracing::error!("Internal error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!("Internal server error"),
                )
            }
        };

        let body = Json(BaseResponse {
            error: true,
            message,
        });

        (status, body).into_response()
    }
}

pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    pub fn not_found(resource: &str) -> Self {
        WebError::NotFound(format!("{} not found", resource))
    }

    pub fn missing_permission(permission: &str) -> Self {
        WebError::Forbidden(format!("Missing permission {}", permission))
    }

    pub fn missing_client_id() -> Self {
        WebError::BadRequest(
            "Could not find a client_id in the request body or auth token".to_string(),
        )
    }
}
