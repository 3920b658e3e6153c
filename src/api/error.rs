use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{error, warn};

use crate::api::validation::ErrorResponse;
use crate::db::RepositoryError;
use crate::storage::StorageError;

/// Service-level errors
///
/// Client errors carry a message that is returned to the caller. Server
/// errors are logged in full and answered with a generic message.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request was well-formed JSON but semantically invalid
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Deliberately carries no detail
    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(#[from] RepositoryError),

    /// Blob store operation failed
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::ValidationError(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::DatabaseError(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            ServiceError::DatabaseError(_)
            | ServiceError::StorageError(_)
            | ServiceError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error, message) = match self {
            ServiceError::ValidationError(msg) => {
                warn!("Validation error: {}", msg);
                ("Validation failed", msg.clone())
            }
            ServiceError::Unauthorized(msg) => {
                warn!("Unauthorized: {}", msg);
                ("Unauthorized", msg.clone())
            }
            ServiceError::Forbidden => ("Forbidden", "Forbidden".to_string()),
            ServiceError::NotFound(what) => {
                warn!("Not found: {}", what);
                ("Not found", format!("{} not found", what))
            }
            ServiceError::Conflict(msg) => {
                warn!("Conflict: {}", msg);
                ("Conflict", msg.clone())
            }
            ServiceError::DatabaseError(RepositoryError::Conflict(msg)) => {
                warn!("Conflict: {}", msg);
                ("Conflict", msg.clone())
            }
            ServiceError::DatabaseError(e) => {
                error!("Database error: {}", e);
                ("Failed to process request", "Database error occurred".to_string())
            }
            ServiceError::StorageError(e) => {
                error!("Storage error: {}", e);
                ("Failed to process request", "Storage error occurred".to_string())
            }
            ServiceError::InternalError(e) => {
                error!("Internal error: {}", e);
                ("Failed to process request", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error.to_string(),
            fields: serde_json::json!({ "message": message }),
        })
    }
}

impl From<actix_web::error::BlockingError> for ServiceError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        ServiceError::InternalError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: ServiceError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn client_errors_are_descriptive() {
        let (status, body) = body_of(ServiceError::validation("Missing jobId")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"]["message"], "Missing jobId");
    }

    #[actix_web::test]
    async fn server_errors_are_generic() {
        let err = ServiceError::StorageError(StorageError::OperationFailed(
            "bucket job-board unreachable at 10.0.0.7".into(),
        ));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("10.0.0.7"));
    }

    #[actix_web::test]
    async fn repository_conflicts_map_to_409() {
        let err = ServiceError::from(RepositoryError::Conflict("email already exists".into()));
        let (status, _) = body_of(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
