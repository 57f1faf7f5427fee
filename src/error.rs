use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error codes for categorizing errors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ErrorCode {
    // Authentication errors (1xxx)
    #[serde(rename = "AUTH_1001")]
    SignatureMissing,
    #[serde(rename = "AUTH_1002")]
    SignatureMismatch,

    // Request errors (3xxx)
    #[serde(rename = "VAL_3001")]
    InvalidJson,
    #[serde(rename = "VAL_3002")]
    MethodNotAllowed,
    #[serde(rename = "VAL_3003")]
    PayloadTooLarge,

    // External service errors (8xxx)
    #[serde(rename = "EXT_8001")]
    ExternalServiceUnavailable,

    // Internal errors (9xxx)
    #[serde(rename = "INT_9999")]
    InternalServerError,
    #[serde(rename = "INT_9998")]
    ConfigurationError,
}

impl ErrorCode {
    /// Get numeric code
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::SignatureMissing => 1001,
            ErrorCode::SignatureMismatch => 1002,
            ErrorCode::InvalidJson => 3001,
            ErrorCode::MethodNotAllowed => 3002,
            ErrorCode::PayloadTooLarge => 3003,
            ErrorCode::ExternalServiceUnavailable => 8001,
            ErrorCode::InternalServerError => 9999,
            ErrorCode::ConfigurationError => 9998,
        }
    }

    /// Get user-friendly message
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::SignatureMissing => "Missing webhook signature",
            ErrorCode::SignatureMismatch => "Invalid webhook signature",
            ErrorCode::InvalidJson => "Request body is not valid JSON",
            ErrorCode::MethodNotAllowed => "Method not allowed",
            ErrorCode::PayloadTooLarge => "Request body exceeds the size limit",
            ErrorCode::ExternalServiceUnavailable => "Task API request failed",
            ErrorCode::InternalServerError => "An internal server error occurred",
            ErrorCode::ConfigurationError => "Server configuration error",
        }
    }
}

/// Structured error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorDetail,
    pub request_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub code_number: u16,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing signature header")]
    MissingSignature,

    #[error("Signature mismatch")]
    InvalidSignature,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Helper: a required setting is not configured
    pub fn missing_config(name: &str) -> Self {
        ApiError::Configuration(format!("{} is not configured", name))
    }

    /// Get error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::MissingSignature => ErrorCode::SignatureMissing,
            ApiError::InvalidSignature => ErrorCode::SignatureMismatch,
            ApiError::MalformedPayload(_) => ErrorCode::InvalidJson,
            ApiError::MethodNotAllowed(_) => ErrorCode::MethodNotAllowed,
            ApiError::PayloadTooLarge(_) => ErrorCode::PayloadTooLarge,
            ApiError::Configuration(_) => ErrorCode::ConfigurationError,
            ApiError::ExternalService(_) => ErrorCode::ExternalServiceUnavailable,
            ApiError::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    /// Get status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingSignature | ApiError::InvalidSignature => StatusCode::UNAUTHORIZED,
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            ApiError::Configuration(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Details are only exposed for client errors; server-side causes stay in the logs.
    fn error_details(&self) -> Option<String> {
        match self {
            ApiError::MalformedPayload(reason) | ApiError::PayloadTooLarge(reason) => {
                Some(reason.clone())
            }
            ApiError::MethodNotAllowed(method) => Some(format!("{} is not accepted, use POST", method)),
            _ => None,
        }
    }

    /// Log error with appropriate level
    fn log_error(&self, request_id: &str) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    request_id = %request_id,
                    error = %self,
                    "Server error occurred"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    request_id = %request_id,
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status_code();
        let code = self.error_code();

        self.log_error(&request_id);

        let error_response = ErrorResponse {
            ok: false,
            error: ErrorDetail {
                code,
                code_number: code.code(),
                message: code.message().to_string(),
                details: self.error_details(),
            },
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}
