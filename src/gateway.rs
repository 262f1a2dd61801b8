// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request pipeline: identity resolution followed by relay.

use crate::{
    error::ErrorClass,
    identity::IdentityResolver,
    models::LoanRequest,
    relay::{TransactionOutcome, TransactionRelay},
};

#[derive(Clone)]
pub struct LoanGateway {
    resolver: IdentityResolver,
    relay: TransactionRelay,
}

impl LoanGateway {
    pub fn new(resolver: IdentityResolver, relay: TransactionRelay) -> Self {
        Self { resolver, relay }
    }

    /// Process a validated request to its terminal outcome.
    ///
    /// The relay runs on its own task, so a submitted transaction is still
    /// awaited and logged if the caller goes away.
    pub async fn process(&self, mut request: LoanRequest) -> TransactionOutcome {
        let kind = request.kind();
        if let LoanRequest::Create { amount, .. } | LoanRequest::Repay { amount, .. } = &request {
            tracing::debug!(operation = %kind, amount = %amount, "Relaying request");
        }
        let secret = request.take_secret();
        let identity = match self.resolver.resolve(kind, secret) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::info!(operation = %kind, error = %e, "Signing identity rejected");
                return e.into();
            }
        };

        let relay = self.relay.clone();
        let task = tokio::spawn(async move { relay.execute(&request, &identity).await });
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(operation = %kind, error = %e, "Relay task failed");
                TransactionOutcome::failed(ErrorClass::Submission, "relay task failed")
            }
        }
    }
}
