// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Loan lifecycle endpoints.
//!
//! Bodies are taken as raw bytes and decoded by the validator so that
//! malformed JSON is reported like any other validation failure.

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Response,
};

use super::response::to_response;
use crate::{
    error::{ApiError, ErrorBody},
    models::{
        CreateLoanBody, DefaultCheckResponse, LoanListResponse, LoanRequest,
        ReclaimCollateralBody, RepayLoanBody, TxSuccessResponse,
    },
    state::AppState,
    validation,
};

async fn dispatch(state: &AppState, request: LoanRequest) -> Result<Response, ApiError> {
    let kind = request.kind();
    let outcome = state.gateway.process(request).await;
    to_response(kind, outcome)
}

#[utoipa::path(
    post,
    path = "/create_loan",
    request_body = CreateLoanBody,
    tag = "Loans",
    responses(
        (status = 200, description = "Loan created and confirmed", body = TxSuccessResponse),
        (status = 500, description = "Validation, submission, revert or timeout", body = ErrorBody)
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body: CreateLoanBody = validation::parse_body(&body)?;
    let request = validation::create_loan(body)?;
    dispatch(&state, request).await
}

#[utoipa::path(
    post,
    path = "/disburse_loan/{loan_id}",
    params(("loan_id" = String, Path, description = "On-chain loan identifier")),
    tag = "Loans",
    responses(
        (status = 200, description = "Loan disbursed", body = TxSuccessResponse),
        (status = 500, description = "Failure", body = ErrorBody)
    )
)]
pub async fn disburse_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<String>,
) -> Result<Response, ApiError> {
    let request = validation::disburse_loan(&loan_id)?;
    dispatch(&state, request).await
}

#[utoipa::path(
    post,
    path = "/repay_loan",
    request_body = RepayLoanBody,
    tag = "Loans",
    responses(
        (status = 200, description = "Repayment confirmed", body = TxSuccessResponse),
        (status = 500, description = "Failure", body = ErrorBody)
    )
)]
pub async fn repay_loan(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body: RepayLoanBody = validation::parse_body(&body)?;
    let request = validation::repay_loan(body)?;
    dispatch(&state, request).await
}

#[utoipa::path(
    get,
    path = "/check_for_default/{loan_id}",
    params(("loan_id" = String, Path, description = "On-chain loan identifier")),
    tag = "Loans",
    responses(
        (status = 200, description = "Default status", body = DefaultCheckResponse),
        (status = 500, description = "Failure", body = ErrorBody)
    )
)]
pub async fn check_for_default(
    State(state): State<AppState>,
    Path(loan_id): Path<String>,
) -> Result<Response, ApiError> {
    let request = validation::check_for_default(&loan_id)?;
    dispatch(&state, request).await
}

#[utoipa::path(
    post,
    path = "/reclaim_collateral/{loan_id}",
    params(("loan_id" = String, Path, description = "On-chain loan identifier")),
    request_body = ReclaimCollateralBody,
    tag = "Loans",
    responses(
        (status = 200, description = "Collateral reclaimed", body = TxSuccessResponse),
        (status = 500, description = "Failure", body = ErrorBody)
    )
)]
pub async fn reclaim_collateral(
    State(state): State<AppState>,
    Path(loan_id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body: ReclaimCollateralBody = validation::parse_body(&body)?;
    let request = validation::reclaim_collateral(&loan_id, body)?;
    dispatch(&state, request).await
}

#[utoipa::path(
    get,
    path = "/get_loans/{address}",
    params(("address" = String, Path, description = "Borrower account address")),
    tag = "Loans",
    responses(
        (status = 200, description = "Loans of the borrower", body = LoanListResponse),
        (status = 500, description = "Failure", body = ErrorBody)
    )
)]
pub async fn get_loans(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Response, ApiError> {
    let request = validation::get_loans(&address)?;
    dispatch(&state, request).await
}
