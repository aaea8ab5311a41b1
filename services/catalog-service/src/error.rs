use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use storage::StorageError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Storage failure surfaced to an HTTP caller
#[derive(Debug)]
pub struct ApiError(pub StorageError);

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
            StorageError::Validation(_) => StatusCode::BAD_REQUEST,
            StorageError::Duplicate { .. } => StatusCode::CONFLICT,
            StorageError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            StorageError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StorageError::Cancelled { .. } | StorageError::Decode { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
