// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    models::{
        CreateLoanBody, DefaultCheckResponse, LoanListResponse, ReclaimCollateralBody,
        RepayLoanBody, TxSuccessResponse,
    },
    state::AppState,
};

pub mod health;
pub mod loans;
pub mod response;

pub fn router(state: AppState) -> Router {
    let loan_routes = Router::new()
        .route("/create_loan", post(loans::create_loan))
        .route("/disburse_loan/{loan_id}", post(loans::disburse_loan))
        .route("/repay_loan", post(loans::repay_loan))
        .route("/check_for_default/{loan_id}", get(loans::check_for_default))
        .route(
            "/reclaim_collateral/{loan_id}",
            post(loans::reclaim_collateral),
        )
        .route("/get_loans/{address}", get(loans::get_loans))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .merge(loan_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        loans::create_loan,
        loans::disburse_loan,
        loans::repay_loan,
        loans::check_for_default,
        loans::reclaim_collateral,
        loans::get_loans,
        health::health,
        health::readiness,
        health::liveness
    ),
    components(
        schemas(
            CreateLoanBody,
            RepayLoanBody,
            ReclaimCollateralBody,
            TxSuccessResponse,
            DefaultCheckResponse,
            LoanListResponse,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Loans", description = "Loan lifecycle operations relayed to the loan contract"),
        (name = "Health", description = "Liveness and ledger reachability")
    )
)]
struct ApiDoc;
