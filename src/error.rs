//! Application error types and handling
//!
//! This module provides a unified error handling system for the cabin
//! reservation backend. All errors are converted to appropriate HTTP
//! responses with consistent JSON format.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Consistent JSON error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "validation_error", "not_found")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level error details (for validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl ErrorResponse {
    /// Create a new error response without details
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a new error response with field-level details
    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    #[error("Database query error: {0}")]
    DatabaseQuery(String),

    // Redis errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis connection error: {0}")]
    RedisConnection(String),

    #[error("Cache miss: {0}")]
    CacheMiss(String),

    // Admin authorization errors
    #[error("Missing admin credentials")]
    MissingAdminAuth,

    #[error("Invalid admin credentials")]
    InvalidAdminAuth,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation errors")]
    ValidationWithDetails {
        message: String,
        details: HashMap<String, Vec<String>>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    #[error("Cabin not found: {0}")]
    CabinNotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Reservation domain errors
    #[error("A hold already exists for this cabin and date range")]
    HoldAlreadyExists,

    #[error("Cabin {cabin} is on hold for {check_in} to {check_out}")]
    CabinOnHold {
        cabin: String,
        check_in: String,
        check_out: String,
    },

    #[error("Cabin {cabin} is already booked for {check_in} to {check_out}")]
    CabinBusy {
        cabin: String,
        check_in: String,
        check_out: String,
    },

    #[error("Hold id does not match cabin and date range supplied")]
    HoldMismatch,

    #[error("Hold {0} has expired or does not exist")]
    HoldNotFound(String),

    #[error("I didn't understand that request")]
    IntentNotUnderstood,

    // Request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Too many requests, retry after {0} seconds")]
    TooManyRequests(u64),

    // External service errors
    #[error("Calendar gateway error: {0}")]
    CalendarUnreachable(String),

    #[error("Calendar gateway rejected the request: {0}")]
    CalendarForbidden(String),

    #[error("Payment gateway error: {0}")]
    PaymentGatewayError(String),

    #[error("Webhook signature verification failed")]
    InvalidWebhookSignature,

    #[error("Email service error: {0}")]
    EmailService(String),

    #[error("External service unavailable: {0}")]
    ExternalServiceUnavailable(String),

    #[error("External service timeout: {0}")]
    ExternalServiceTimeout(String),

    // HTTP client errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic anyhow wrapper for unexpected errors
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "database_error",
            Self::DatabaseConnection(_) => "database_connection_error",
            Self::DatabaseQuery(_) => "database_query_error",

            Self::Redis(_) => "redis_error",
            Self::RedisConnection(_) => "redis_connection_error",
            Self::CacheMiss(_) => "cache_miss",

            Self::MissingAdminAuth => "missing_admin_auth",
            Self::InvalidAdminAuth => "invalid_admin_auth",

            Self::Validation(_) => "validation_error",
            Self::ValidationWithDetails { .. } => "validation_error",
            Self::InvalidInput(_) => "invalid_input",

            Self::NotFound(_) => "not_found",
            Self::CabinNotFound(_) => "cabin_not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Conflict(_) => "conflict",

            Self::HoldAlreadyExists => "hold_already_exists",
            Self::CabinOnHold { .. } => "cabin_on_hold",
            Self::CabinBusy { .. } => "cabin_busy",
            Self::HoldMismatch => "hold_mismatch",
            Self::HoldNotFound(_) => "hold_not_found",
            Self::IntentNotUnderstood => "intent_not_understood",

            Self::BadRequest(_) => "bad_request",
            Self::MissingField(_) => "missing_field",
            Self::InvalidFormat(_) => "invalid_format",
            Self::PayloadTooLarge => "payload_too_large",

            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::TooManyRequests(_) => "too_many_requests",

            Self::CalendarUnreachable(_) => "calendar_unreachable",
            Self::CalendarForbidden(_) => "calendar_forbidden",
            Self::PaymentGatewayError(_) => "payment_gateway_error",
            Self::InvalidWebhookSignature => "invalid_webhook_signature",
            Self::EmailService(_) => "email_service_error",
            Self::ExternalServiceUnavailable(_) => "external_service_unavailable",
            Self::ExternalServiceTimeout(_) => "external_service_timeout",

            Self::HttpRequest(_) => "http_request_error",

            Self::Internal(_) => "internal_error",
            Self::Configuration(_) => "configuration_error",
            Self::Serialization(_) => "serialization_error",

            Self::Anyhow(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatabaseQuery(_) => StatusCode::INTERNAL_SERVER_ERROR,

            Self::Redis(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RedisConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::CacheMiss(_) => StatusCode::NOT_FOUND,

            Self::MissingAdminAuth => StatusCode::UNAUTHORIZED,
            Self::InvalidAdminAuth => StatusCode::FORBIDDEN,

            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ValidationWithDetails { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,

            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::CabinNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Conflict(_) => StatusCode::CONFLICT,

            Self::HoldAlreadyExists => StatusCode::CONFLICT,
            Self::CabinOnHold { .. } => StatusCode::CONFLICT,
            Self::CabinBusy { .. } => StatusCode::CONFLICT,
            Self::HoldMismatch => StatusCode::CONFLICT,
            Self::HoldNotFound(_) => StatusCode::NOT_FOUND,
            Self::IntentNotUnderstood => StatusCode::UNPROCESSABLE_ENTITY,

            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,

            // §7: calendar and payment gateway failures are grouped under
            // DependencyUnavailable (503), not a generic upstream-gateway code.
            Self::CalendarUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::CalendarForbidden(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::PaymentGatewayError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidWebhookSignature => StatusCode::UNAUTHORIZED,
            Self::EmailService(_) => StatusCode::BAD_GATEWAY,
            Self::ExternalServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            // Raised only for calendar/payment gateway transport timeouts,
            // which §7 also buckets under DependencyUnavailable.
            Self::ExternalServiceTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,

            Self::HttpRequest(_) => StatusCode::BAD_GATEWAY,

            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,

            Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create a user-facing message (hides internal details for security)
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(_) => "A database error occurred".to_string(),
            Self::DatabaseConnection(_) => "Database is temporarily unavailable".to_string(),
            Self::DatabaseQuery(_) => "A database error occurred".to_string(),
            Self::Redis(_) => "A cache error occurred".to_string(),
            Self::RedisConnection(_) => "Cache service is temporarily unavailable".to_string(),
            Self::CacheMiss(key) => format!("Cache key not found: {}", key),

            Self::MissingAdminAuth => "Admin credentials required".to_string(),
            Self::InvalidAdminAuth => "Invalid admin credentials".to_string(),

            Self::Validation(msg) => msg.clone(),
            Self::ValidationWithDetails { message, .. } => message.clone(),
            Self::InvalidInput(msg) => msg.clone(),

            Self::NotFound(resource) => format!("{} not found", resource),
            Self::CabinNotFound(cabin) => format!("Cabin {} not found", cabin),
            Self::AlreadyExists(msg) => msg.clone(),
            Self::Conflict(msg) => msg.clone(),

            Self::HoldAlreadyExists => {
                "This cabin is already on hold for these dates".to_string()
            },
            Self::CabinOnHold {
                cabin,
                check_in,
                check_out,
            } => format!(
                "{} is on hold for {} to {}",
                cabin, check_in, check_out
            ),
            Self::CabinBusy {
                cabin,
                check_in,
                check_out,
            } => format!(
                "{} is already booked for {} to {}",
                cabin, check_in, check_out
            ),
            Self::HoldMismatch => {
                "That hold doesn't match this cabin and date range".to_string()
            },
            Self::HoldNotFound(id) => format!("Hold {} has expired or does not exist", id),
            Self::IntentNotUnderstood => {
                "I'm not sure what you're asking - could you rephrase that?".to_string()
            },

            Self::BadRequest(msg) => msg.clone(),
            Self::MissingField(field) => format!("Missing required field: {}", field),
            Self::InvalidFormat(msg) => msg.clone(),
            Self::PayloadTooLarge => "Request payload is too large".to_string(),

            Self::RateLimitExceeded => "Too many requests, please try again later".to_string(),
            Self::TooManyRequests(seconds) => {
                format!("Too many requests, please retry after {} seconds", seconds)
            },

            Self::CalendarUnreachable(_) => "Calendar service is temporarily unavailable".to_string(),
            Self::CalendarForbidden(_) => "Calendar service rejected the request".to_string(),
            Self::PaymentGatewayError(_) => "Payment processing is temporarily unavailable".to_string(),
            Self::InvalidWebhookSignature => "Webhook signature verification failed".to_string(),
            Self::EmailService(_) => "Email service temporarily unavailable".to_string(),
            Self::ExternalServiceUnavailable(service) => {
                format!("{} is temporarily unavailable", service)
            },
            Self::ExternalServiceTimeout(service) => {
                format!("{} request timed out", service)
            },

            Self::HttpRequest(_) => "External service error".to_string(),

            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Configuration(_) => "Server configuration error".to_string(),
            Self::Serialization(_) => "Data processing error".to_string(),

            Self::Anyhow(_) => "An unexpected error occurred".to_string(),
        }
    }

    /// Log the full error details (for server-side logging)
    pub fn log_message(&self) -> String {
        format!("{}", self)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error for debugging (full details)
        tracing::error!(
            error_code = self.error_code(),
            status = %self.status_code(),
            details = %self.log_message(),
            "Request error"
        );

        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.user_message();

        // Build the response based on error type
        let body = match &self {
            AppError::ValidationWithDetails { details, .. } => {
                ErrorResponse::with_details(error_code, message, details.clone())
            },
            _ => ErrorResponse::new(error_code, message),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Helper trait for converting Option to AppError::NotFound
pub trait OptionExt<T> {
    fn ok_or_not_found(self, resource: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, resource: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(resource.into()))
    }
}

/// Conversion from validator errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: HashMap<String, Vec<String>> = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            details.insert(field.to_string(), messages);
        }

        AppError::ValidationWithDetails {
            message: "Validation failed".to_string(),
            details,
        }
    }
}

/// Conversion from serde_json errors
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_new() {
        let response = ErrorResponse::new("test_error", "Test message");
        assert_eq!(response.error, "test_error");
        assert_eq!(response.message, "Test message");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_error_response_with_details() {
        let mut details = HashMap::new();
        details.insert(
            "email".to_string(),
            vec!["Invalid email format".to_string()],
        );

        let response =
            ErrorResponse::with_details("validation_error", "Validation failed", details);
        assert_eq!(response.error, "validation_error");
        assert!(response.details.is_some());
        assert!(response.details.unwrap().contains_key("email"));
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::HoldAlreadyExists.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::CabinNotFound("ZB01".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::HoldNotFound("abc".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_app_error_codes() {
        assert_eq!(
            AppError::HoldAlreadyExists.error_code(),
            "hold_already_exists"
        );
        assert_eq!(
            AppError::NotFound("test".to_string()).error_code(),
            "not_found"
        );
        assert_eq!(
            AppError::RateLimitExceeded.error_code(),
            "rate_limit_exceeded"
        );
        assert_eq!(
            AppError::IntentNotUnderstood.error_code(),
            "intent_not_understood"
        );
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let internal_error = AppError::Internal("SQL syntax error at line 42".to_string());
        assert_eq!(internal_error.user_message(), "An internal error occurred");

        let not_found = AppError::NotFound("Customer".to_string());
        assert_eq!(not_found.user_message(), "Customer not found");
    }

    #[test]
    fn test_option_ext_ok_or_not_found() {
        let some_value: Option<i32> = Some(42);
        assert!(some_value.ok_or_not_found("Value").is_ok());

        let none_value: Option<i32> = None;
        let result = none_value.ok_or_not_found("Value");
        assert!(result.is_err());

        if let Err(AppError::NotFound(msg)) = result {
            assert_eq!(msg, "Value");
        } else {
            panic!("Expected NotFound error");
        }
    }
}
