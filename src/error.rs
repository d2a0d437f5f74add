use alloy_primitives::{Address, U256};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Insufficient token balance: {required} base units required, {available} available")]
    InsufficientBalance { required: U256, available: U256 },

    #[error("Insufficient native balance for fees: {estimated} wei estimated, {available} available")]
    InsufficientFee { estimated: U256, available: U256 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Wallet provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Wallet connection rejected: {0}")]
    UserRejected(String),

    #[error("Transfer to {recipient} failed: {reason}")]
    TransferFailed { recipient: Address, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidInput(_) | AppError::Config(_) | AppError::UserRejected(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::InsufficientBalance { .. } | AppError::InsufficientFee { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::ProviderUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Network(_) | AppError::TransferFailed { .. } => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
