// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{blockchain::ContractArtifactError, blockchain::LedgerError, config::ConfigError};

/// Failure classification carried by every failed outcome.
///
/// The class is only surfaced to callers as the prefix of the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad or missing input, detected before any ledger I/O.
    Validation,
    /// Missing or malformed signing secret for a self-authorizing operation.
    InvalidCredential,
    /// Node unreachable, malformed call, or pre-flight rejection.
    Submission,
    /// The ledger included the transaction but the contract rejected it.
    ContractRevert,
    /// Confirmation wait exceeded its bound. Ledger-side outcome unknown.
    Timeout,
}

impl ErrorClass {
    pub fn label(self) -> &'static str {
        match self {
            ErrorClass::Validation => "validation error",
            ErrorClass::InvalidCredential => "invalid credential",
            ErrorClass::Submission => "submission error",
            ErrorClass::ContractRevert => "contract reverted",
            ErrorClass::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised before a request reaches the relay.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidCredential(String),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation(message.into())
    }

    pub fn invalid_credential(message: impl Into<String>) -> Self {
        GatewayError::InvalidCredential(message.into())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            GatewayError::Validation(_) => ErrorClass::Validation,
            GatewayError::InvalidCredential(_) => ErrorClass::InvalidCredential,
        }
    }
}

/// Fatal errors during process startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("contract artifacts: {0}")]
    Artifacts(#[from] ContractArtifactError),

    #[error("ledger client: {0}")]
    Ledger(#[from] LedgerError),

    #[error("server I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response returned by every failing endpoint.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// JSON body of an error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `"error"`.
    #[schema(example = "error")]
    pub status: String,
    /// Classification label followed by details.
    #[schema(example = "contract reverted: insufficient collateral")]
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Every failure class maps to the same status; the class is only
    /// visible through the message prefix.
    pub fn from_class(class: ErrorClass, detail: impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{class}: {detail}"),
        )
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::from_class(err.class(), err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            status: "error".to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}
