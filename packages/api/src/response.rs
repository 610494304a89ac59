// ABOUTME: Shared API response types and error handling
// ABOUTME: Provides consistent success and error bodies across all API endpoints

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use testdesk_ai::GenerationError;
use testdesk_core::ValidationError;
use testdesk_storage::StorageError;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// `200 OK` with the standard success body
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, ResponseJson(ApiResponse::success(data))).into_response()
}

/// `201 Created` with the standard success body
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, ResponseJson(ApiResponse::success(data))).into_response()
}

/// JSON request body whose rejections use the standard error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Every failure a handler can return
#[derive(Debug)]
pub enum ApiError {
    /// Body could not be read as the expected JSON; carries the extractor's status
    Rejected { status: StatusCode, message: String },
    Storage(StorageError),
    Generation(GenerationError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Storage(e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Storage(StorageError::Validation(e))
    }
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        ApiError::Generation(e)
    }
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
    request_id: String,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            ApiError::Rejected { status, message } if *status == StatusCode::PAYLOAD_TOO_LARGE => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                message.clone(),
                None,
            ),
            ApiError::Rejected { message, .. } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                message.clone(),
                None,
            ),
            ApiError::Storage(StorageError::Validation(e)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                e.to_string(),
                None,
            ),
            ApiError::Storage(StorageError::NotFound(what)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Not found: {}", what),
                None,
            ),
            ApiError::Storage(StorageError::DuplicateName(name)) => (
                StatusCode::CONFLICT,
                "DUPLICATE_NAME",
                format!("A tab named '{}' already exists", name),
                Some(json!({ "name": name })),
            ),
            ApiError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Database error".to_string(),
                None,
            ),
            ApiError::Generation(e) if e.is_unavailable() => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AI_SERVER_UNAVAILABLE",
                "Test case generation service is unavailable".to_string(),
                None,
            ),
            ApiError::Generation(_) => (
                StatusCode::BAD_GATEWAY,
                "AI_SERVER_ERROR",
                "Test case generation failed".to_string(),
                None,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();
        let request_id = nanoid::nanoid!(12);

        match &self {
            ApiError::Storage(e) if status.is_server_error() => {
                error!(request_id = %request_id, "Storage failure: {}", e);
            }
            ApiError::Generation(e) => {
                error!(request_id = %request_id, "Generation failure: {}", e);
            }
            ApiError::Storage(e) => {
                warn!(request_id = %request_id, "Request rejected: {}", e);
            }
            ApiError::Rejected { message, .. } => {
                warn!(request_id = %request_id, "Request body rejected: {}", message);
            }
        }

        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code,
                message,
                details,
            },
            request_id,
        };

        (status, ResponseJson(body)).into_response()
    }
}

pub type ApiResult = Result<Response, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_storage_errors() {
        let cases = [
            (
                StorageError::Validation(ValidationError::Missing("projectId")),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                StorageError::NotFound("tab x".to_string()),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                StorageError::DuplicateName("Smoke".to_string()),
                StatusCode::CONFLICT,
                "DUPLICATE_NAME",
            ),
            (
                StorageError::Database("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            let (got_status, got_code, _, _) = ApiError::from(error).parts();
            assert_eq!(got_status, status);
            assert_eq!(got_code, code);
        }
    }

    #[test]
    fn duplicate_name_carries_details() {
        let (_, _, _, details) =
            ApiError::from(StorageError::DuplicateName("Smoke".to_string())).parts();
        assert_eq!(details, Some(json!({"name": "Smoke"})));
    }

    #[test]
    fn maps_generation_errors() {
        let (status, code, _, _) =
            ApiError::from(GenerationError::Unavailable("refused".to_string())).parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "AI_SERVER_UNAVAILABLE");

        let (status, code, _, _) =
            ApiError::from(GenerationError::InvalidResponse("no result".to_string())).parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "AI_SERVER_ERROR");
    }

    #[test]
    fn maps_body_rejections() {
        let too_large = ApiError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".to_string(),
        };
        let (status, code, _, _) = too_large.parts();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(code, "PAYLOAD_TOO_LARGE");

        let unsupported = ApiError::Rejected {
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            message: "expected application/json".to_string(),
        };
        let (status, code, _, _) = unsupported.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let (_, _, message, _) =
            ApiError::from(StorageError::Database("secret path".to_string())).parts();
        assert!(!message.contains("secret"));
    }
}
