//! Centralized API error handling for PinStock
//!
//! This module provides a unified error type for API responses with proper
//! HTTP status code mapping and JSON error responses. Domain failures from
//! the reservation, settlement and funding engines each map to a stable
//! machine-checkable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Account is deactivated")]
    AccountInactive,

    #[error("Provider account is deactivated")]
    ProviderInactive,

    #[error("Price does not belong to your provider")]
    TenantMismatch,

    #[error("No active price found for this plan")]
    PriceNotFound,

    #[error("Not enough stock available for the requested quantity")]
    OutOfStock,

    #[error("Wallet balance is insufficient")]
    InsufficientBalance { wallet_amount: i64 },

    #[error("No held units match this token")]
    HoldNotFound,

    #[error("Hold expired and the units were returned to stock")]
    HoldExpired,

    #[error("Stock batch is currently unavailable")]
    ArchiveUnavailable,

    #[error("Only a quantity of 1 is supported for this account")]
    UnsupportedQuantity,

    #[error("Quantity exceeds the bulk purchase limit")]
    QuantityLimitExceeded,

    #[error("Another transfer for this seller is already in progress")]
    TransactionInProgress,

    #[error("No transfer lock is active for this seller")]
    NoActiveHold,

    #[error("Transaction failed and was rolled back, retry is safe")]
    TransactionFailed,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    /// Current balance, echoed on insufficient-balance failures so clients
    /// can show the shortfall without a second request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_amount: Option<i64>,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::AccountInactive => "ACCOUNT_INACTIVE",
            ApiError::ProviderInactive => "PROVIDER_INACTIVE",
            ApiError::TenantMismatch => "TENANT_MISMATCH",
            ApiError::PriceNotFound => "PRICE_NOT_FOUND",
            ApiError::OutOfStock => "OUT_OF_STOCK",
            ApiError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            ApiError::HoldNotFound => "HOLD_NOT_FOUND",
            ApiError::HoldExpired => "HOLD_EXPIRED",
            ApiError::ArchiveUnavailable => "ARCHIVE_UNAVAILABLE",
            ApiError::UnsupportedQuantity => "UNSUPPORTED_QUANTITY",
            ApiError::QuantityLimitExceeded => "QUANTITY_LIMIT_EXCEEDED",
            ApiError::TransactionInProgress => "TRANSACTION_IN_PROGRESS",
            ApiError::NoActiveHold => "NO_ACTIVE_HOLD",
            ApiError::TransactionFailed => "TRANSACTION_FAILED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AccountInactive => StatusCode::FORBIDDEN,
            ApiError::ProviderInactive => StatusCode::FORBIDDEN,
            ApiError::TenantMismatch => StatusCode::FORBIDDEN,
            ApiError::PriceNotFound => StatusCode::NOT_FOUND,
            ApiError::OutOfStock => StatusCode::CONFLICT,
            ApiError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            ApiError::HoldNotFound => StatusCode::NOT_FOUND,
            ApiError::HoldExpired => StatusCode::GONE,
            ApiError::ArchiveUnavailable => StatusCode::CONFLICT,
            ApiError::UnsupportedQuantity => StatusCode::BAD_REQUEST,
            ApiError::QuantityLimitExceeded => StatusCode::BAD_REQUEST,
            ApiError::TransactionInProgress => StatusCode::CONFLICT,
            ApiError::NoActiveHold => StatusCode::CONFLICT,
            ApiError::TransactionFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn wallet_amount(&self) -> Option<i64> {
        match self {
            ApiError::InsufficientBalance { wallet_amount } => Some(*wallet_amount),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let wallet_amount = self.wallet_amount();
        let message = self.to_string();

        // Log server errors
        match &self {
            ApiError::InternalError(_)
            | ApiError::DatabaseError(_)
            | ApiError::TransactionFailed => {
                tracing::error!(error = %message, code = %error_code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %message, code = %error_code, "Client error occurred");
            }
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                wallet_amount,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Convenience conversions from common error types

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            _ => ApiError::DatabaseError(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}
