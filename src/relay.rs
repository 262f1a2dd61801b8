// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Transaction Relay
//!
//! Drives a resolved request through the ledger:
//!
//! ```text
//! Resolved -> Submitted -> Awaiting -> Confirmed | Reverted
//! Resolved -> read -> Confirmed                    (read-only)
//! ```
//!
//! Every terminal state is expressed as a [`TransactionOutcome`]. Nothing is
//! retried; a transaction that outlives the confirmation bound is reported as
//! a timeout with unknown ledger-side status.

use std::{sync::Arc, time::Duration};

use alloy::primitives::TxHash;
use serde_json::Value;

use crate::{
    blockchain::{methods, CallArg, LedgerCall, LedgerClient, SigningIdentity},
    error::{ErrorClass, GatewayError},
    models::LoanRequest,
};

/// Terminal result of one relayed request.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionOutcome {
    Confirmed {
        /// Present for submitted transactions, absent for reads.
        tx_hash: Option<TxHash>,
        /// Decoded return value of a read.
        payload: Option<Value>,
    },
    Failed {
        classification: ErrorClass,
        message: String,
    },
}

impl TransactionOutcome {
    pub fn failed(classification: ErrorClass, message: impl Into<String>) -> Self {
        TransactionOutcome::Failed {
            classification,
            message: message.into(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransactionOutcome::Confirmed { .. })
    }
}

impl From<GatewayError> for TransactionOutcome {
    fn from(err: GatewayError) -> Self {
        TransactionOutcome::failed(err.class(), err.to_string())
    }
}

/// Contract method and ordered arguments for a request.
pub fn resolve_call(request: &LoanRequest) -> LedgerCall {
    match request {
        LoanRequest::Create {
            borrower,
            amount,
            loan_type,
            collateral_deed_id,
        } => LedgerCall::new(
            methods::CREATE_LOAN,
            vec![
                CallArg::Address(*borrower),
                CallArg::Uint(amount.base_units()),
                CallArg::Text(loan_type.clone()),
                CallArg::Text(collateral_deed_id.clone()),
            ],
        ),
        LoanRequest::Disburse { loan_id } => {
            LedgerCall::new(methods::DISBURSE_LOAN, vec![CallArg::Uint(loan_id.value())])
        }
        LoanRequest::Repay {
            loan_id, amount, ..
        } => LedgerCall::new(
            methods::REPAY_LOAN,
            vec![
                CallArg::Uint(loan_id.value()),
                CallArg::Uint(amount.base_units()),
            ],
        ),
        LoanRequest::CheckDefault { loan_id } => LedgerCall::new(
            methods::CHECK_FOR_DEFAULT,
            vec![CallArg::Uint(loan_id.value())],
        ),
        LoanRequest::ReclaimCollateral { loan_id, .. } => LedgerCall::new(
            methods::RECLAIM_COLLATERAL,
            vec![CallArg::Uint(loan_id.value())],
        ),
        LoanRequest::ListByBorrower { borrower } => LedgerCall::new(
            methods::GET_LOANS_BY_BORROWER,
            vec![CallArg::Address(*borrower)],
        ),
    }
}

/// Submits calls and awaits their confirmation within a fixed bound.
#[derive(Clone)]
pub struct TransactionRelay {
    ledger: Arc<dyn LedgerClient>,
    confirmation_timeout: Duration,
}

impl TransactionRelay {
    pub fn new(ledger: Arc<dyn LedgerClient>, confirmation_timeout: Duration) -> Self {
        Self {
            ledger,
            confirmation_timeout,
        }
    }

    pub async fn execute(
        &self,
        request: &LoanRequest,
        identity: &SigningIdentity,
    ) -> TransactionOutcome {
        let kind = request.kind();
        let call = resolve_call(request);

        if kind.is_read_only() {
            return match self.ledger.read(&call).await {
                Ok(payload) => {
                    tracing::debug!(operation = %kind, method = call.method, "Read call returned");
                    TransactionOutcome::Confirmed {
                        tx_hash: None,
                        payload: Some(payload),
                    }
                }
                Err(e) => {
                    tracing::warn!(operation = %kind, method = call.method, error = %e, "Read call failed");
                    TransactionOutcome::failed(ErrorClass::Submission, e.to_string())
                }
            };
        }

        let pending = match self.ledger.submit(&call, identity).await {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!(
                    operation = %kind,
                    method = call.method,
                    signer = %identity.address(),
                    error = %e,
                    "Transaction submission failed"
                );
                return TransactionOutcome::failed(ErrorClass::Submission, e.to_string());
            }
        };

        tracing::info!(
            operation = %kind,
            method = call.method,
            signer = %pending.from,
            tx_hash = %pending.tx_hash,
            "Transaction submitted"
        );

        let wait = self.ledger.wait_for_receipt(&call, &pending);
        match tokio::time::timeout(self.confirmation_timeout, wait).await {
            Err(_) => {
                tracing::warn!(
                    operation = %kind,
                    tx_hash = %pending.tx_hash,
                    timeout_secs = self.confirmation_timeout.as_secs(),
                    "Confirmation wait expired"
                );
                TransactionOutcome::failed(
                    ErrorClass::Timeout,
                    format!(
                        "transaction {} not confirmed within {}s, status unknown",
                        pending.tx_hash,
                        self.confirmation_timeout.as_secs()
                    ),
                )
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    operation = %kind,
                    tx_hash = %pending.tx_hash,
                    error = %e,
                    "Receipt retrieval failed"
                );
                TransactionOutcome::failed(
                    ErrorClass::Submission,
                    format!("transaction {}: {e}", pending.tx_hash),
                )
            }
            Ok(Ok(receipt)) if receipt.success => {
                tracing::info!(
                    operation = %kind,
                    tx_hash = %receipt.tx_hash,
                    block_number = receipt.block_number,
                    gas_used = receipt.gas_used,
                    "Transaction confirmed"
                );
                TransactionOutcome::Confirmed {
                    tx_hash: Some(receipt.tx_hash),
                    payload: None,
                }
            }
            Ok(Ok(receipt)) => {
                let reason = receipt
                    .revert_reason
                    .unwrap_or_else(|| format!("transaction {} reverted", receipt.tx_hash));
                tracing::warn!(
                    operation = %kind,
                    tx_hash = %receipt.tx_hash,
                    block_number = receipt.block_number,
                    reason = %reason,
                    "Transaction reverted"
                );
                TransactionOutcome::failed(ErrorClass::ContractRevert, reason)
            }
        }
    }
}
