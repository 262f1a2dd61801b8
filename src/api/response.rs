// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Maps transaction outcomes to HTTP responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::{
    error::{ApiError, ErrorClass},
    models::{DefaultCheckResponse, LoanListResponse, OperationKind, TxSuccessResponse},
    relay::TransactionOutcome,
};

pub fn to_response(kind: OperationKind, outcome: TransactionOutcome) -> Result<Response, ApiError> {
    let (tx_hash, payload) = match outcome {
        TransactionOutcome::Confirmed { tx_hash, payload } => (tx_hash, payload),
        TransactionOutcome::Failed {
            classification,
            message,
        } => return Err(ApiError::from_class(classification, message)),
    };

    let response = match kind {
        OperationKind::CheckDefault => Json(DefaultCheckResponse {
            status: "checked".to_string(),
            result: payload.unwrap_or(Value::Null),
        })
        .into_response(),
        OperationKind::ListByBorrower => Json(LoanListResponse {
            loans: payload.unwrap_or(Value::Null),
        })
        .into_response(),
        OperationKind::Create
        | OperationKind::Disburse
        | OperationKind::Repay
        | OperationKind::ReclaimCollateral => {
            let tx_hash = tx_hash.ok_or_else(|| {
                ApiError::from_class(ErrorClass::Submission, "confirmed without a transaction hash")
            })?;
            Json(TxSuccessResponse {
                status: "success".to_string(),
                tx_hash: tx_hash.to_string(),
            })
            .into_response()
        }
    };
    Ok(response)
}
