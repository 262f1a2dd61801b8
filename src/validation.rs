// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request validation.
//!
//! Each function turns raw path segments and body fields into a
//! [`LoanRequest`], or explains what is wrong with them. Nothing here touches
//! the ledger.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::GatewayError,
    models::{
        parse_address, Amount, CreateLoanBody, LoanId, LoanRequest, ReclaimCollateralBody,
        RepayLoanBody, SigningSecret,
    },
};

/// Parse a JSON request body. An empty body is treated as `{}`.
pub fn parse_body<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, GatewayError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| GatewayError::validation(format!("request body is not valid JSON: {e}")))
}

/// Read a required scalar field given either as a string or a number.
fn scalar(field: &str, value: Option<Value>) -> Result<String, GatewayError> {
    match value {
        None | Some(Value::Null) => Err(GatewayError::validation(format!("{field} is required"))),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(GatewayError::validation(format!(
            "{field} must be a string or a number"
        ))),
    }
}

fn non_empty(field: &str, value: Option<Value>) -> Result<String, GatewayError> {
    let text = scalar(field, value)?;
    if text.trim().is_empty() {
        return Err(GatewayError::validation(format!("{field} must not be empty")));
    }
    Ok(text)
}

/// Secrets are passed through untouched; the identity resolver judges them.
fn secret(value: Option<Value>) -> Option<SigningSecret> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(SigningSecret::new(s)),
        Some(other) => Some(SigningSecret::new(other.to_string())),
    }
}

pub fn create_loan(body: CreateLoanBody) -> Result<LoanRequest, GatewayError> {
    let borrower = parse_address(&scalar("borrower", body.borrower)?)?;
    let amount = Amount::parse(&scalar("amount", body.amount)?)?;
    let loan_type = non_empty("loan_type", body.loan_type)?;
    let collateral_deed_id = non_empty("collateral_deed_id", body.collateral_deed_id)?;

    Ok(LoanRequest::Create {
        borrower,
        amount,
        loan_type,
        collateral_deed_id,
    })
}

pub fn disburse_loan(loan_id: &str) -> Result<LoanRequest, GatewayError> {
    Ok(LoanRequest::Disburse {
        loan_id: LoanId::parse(loan_id)?,
    })
}

pub fn repay_loan(body: RepayLoanBody) -> Result<LoanRequest, GatewayError> {
    let loan_id = LoanId::parse(&scalar("loan_id", body.loan_id)?)?;
    let amount = Amount::parse(&scalar("repayment_amount", body.repayment_amount)?)?;

    Ok(LoanRequest::Repay {
        loan_id,
        amount,
        secret: secret(body.private_key),
    })
}

pub fn check_for_default(loan_id: &str) -> Result<LoanRequest, GatewayError> {
    Ok(LoanRequest::CheckDefault {
        loan_id: LoanId::parse(loan_id)?,
    })
}

pub fn reclaim_collateral(
    loan_id: &str,
    body: ReclaimCollateralBody,
) -> Result<LoanRequest, GatewayError> {
    Ok(LoanRequest::ReclaimCollateral {
        loan_id: LoanId::parse(loan_id)?,
        secret: secret(body.private_key),
    })
}

pub fn get_loans(address: &str) -> Result<LoanRequest, GatewayError> {
    Ok(LoanRequest::ListByBorrower {
        borrower: parse_address(address)?,
    })
}
