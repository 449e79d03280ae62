//! Mapping from domain errors to HTTP responses wrapped in the envelope.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use passdesk_core::{ApiEnvelope, PassdeskError, ResponseMetadata};
use tracing::{debug, error};
use uuid::Uuid;

pub type ApiResult<T> = Result<Json<ApiEnvelope<T>>, ApiError>;

/// A failed request: status code plus the failure envelope sent to the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub envelope: ApiEnvelope<()>,
}

impl ApiError {
    pub fn new(err: PassdeskError, metadata: ResponseMetadata) -> Self {
        let status = match &err {
            PassdeskError::Validation(_) => StatusCode::BAD_REQUEST,
            PassdeskError::NotFound(_) => StatusCode::NOT_FOUND,
            PassdeskError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PassdeskError::Config(_)
            | PassdeskError::Serialization(_)
            | PassdeskError::Io(_)
            | PassdeskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details stay in the logs.
        let message = if status.is_server_error() {
            error!(error = %err, request_id = %metadata.request_id, "Request failed");
            "Internal processing error".to_string()
        } else {
            err.to_string()
        };

        metrics::counter!("api.errors", "code" => err.code()).increment(1);

        Self {
            status,
            envelope: ApiEnvelope::failure(err.code(), message, metadata),
        }
    }
}

impl ApiError {
    /// Request rejected before reaching a handler.
    fn rejected(message: String) -> Self {
        debug!(message = %message, "Request rejected");
        Self::new(
            PassdeskError::Validation(message),
            ResponseMetadata::new(Uuid::new_v4(), None),
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
