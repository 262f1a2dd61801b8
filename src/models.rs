// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Loan Request Models
//!
//! Request bodies as accepted over HTTP, and the validated [`LoanRequest`]
//! they are turned into.
//!
//! Raw bodies keep every field as an optional JSON value so that a missing or
//! mistyped field surfaces as a validation error instead of a deserializer
//! rejection. Callers may send scalars either as strings or as numbers.
//!
//! ## Fixed-Point Amounts
//!
//! [`Amount`] holds the ledger's 18-decimal integer representation. Parsing
//! never rounds: fractional digits past the 18th are rejected unless they are
//! zeros.

use std::str::FromStr;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::GatewayError;

/// Decimal places of the ledger's base unit.
pub const LEDGER_DECIMALS: u8 = 18;

// =============================================================================
// Operations
// =============================================================================

/// The six loan operations exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Disburse,
    Repay,
    CheckDefault,
    ReclaimCollateral,
    ListByBorrower,
}

/// Who authorizes an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// Platform-administered state change, signed by the operator.
    Operator,
    /// Self-authorizing action, signed with the caller's own key.
    Borrower,
    /// Read-only call; nothing is signed.
    ReadOnly,
}

impl OperationKind {
    pub fn authority(self) -> Authority {
        match self {
            OperationKind::Create | OperationKind::Disburse => Authority::Operator,
            OperationKind::Repay | OperationKind::ReclaimCollateral => Authority::Borrower,
            OperationKind::CheckDefault | OperationKind::ListByBorrower => Authority::ReadOnly,
        }
    }

    pub fn is_read_only(self) -> bool {
        self.authority() == Authority::ReadOnly
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Create => "create_loan",
            OperationKind::Disburse => "disburse_loan",
            OperationKind::Repay => "repay_loan",
            OperationKind::CheckDefault => "check_for_default",
            OperationKind::ReclaimCollateral => "reclaim_collateral",
            OperationKind::ListByBorrower => "get_loans",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Validated Request
// =============================================================================

/// A validated loan request. Each variant carries only what its operation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanRequest {
    Create {
        borrower: Address,
        amount: Amount,
        loan_type: String,
        collateral_deed_id: String,
    },
    Disburse {
        loan_id: LoanId,
    },
    Repay {
        loan_id: LoanId,
        amount: Amount,
        secret: Option<SigningSecret>,
    },
    CheckDefault {
        loan_id: LoanId,
    },
    ReclaimCollateral {
        loan_id: LoanId,
        secret: Option<SigningSecret>,
    },
    ListByBorrower {
        borrower: Address,
    },
}

impl LoanRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            LoanRequest::Create { .. } => OperationKind::Create,
            LoanRequest::Disburse { .. } => OperationKind::Disburse,
            LoanRequest::Repay { .. } => OperationKind::Repay,
            LoanRequest::CheckDefault { .. } => OperationKind::CheckDefault,
            LoanRequest::ReclaimCollateral { .. } => OperationKind::ReclaimCollateral,
            LoanRequest::ListByBorrower { .. } => OperationKind::ListByBorrower,
        }
    }

    /// Move the signing secret out of the request, leaving `None` behind.
    pub fn take_secret(&mut self) -> Option<SigningSecret> {
        match self {
            LoanRequest::Repay { secret, .. } | LoanRequest::ReclaimCollateral { secret, .. } => {
                secret.take()
            }
            _ => None,
        }
    }
}

// =============================================================================
// Scalar Types
// =============================================================================

/// Monetary value in the ledger's 18-decimal fixed-point unit. Always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(U256);

impl Amount {
    /// Parse a human-scale decimal string such as `"1000.50"`.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(GatewayError::validation("amount must not be empty"));
        }
        if raw.starts_with('-') {
            return Err(GatewayError::validation("amount must be greater than zero"));
        }

        let (whole, fraction) = match raw.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (raw, ""),
        };
        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction)
        {
            return Err(GatewayError::validation(format!(
                "amount `{raw}` is not a decimal number"
            )));
        }

        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > LEDGER_DECIMALS as usize {
            return Err(GatewayError::validation(format!(
                "amount `{raw}` has more than {LEDGER_DECIMALS} decimal places"
            )));
        }

        let overflow = || GatewayError::validation(format!("amount `{raw}` is too large"));
        let whole = if whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole, 10).map_err(|_| overflow())?
        };
        let fraction = if fraction.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{:0<width$}", fraction, width = LEDGER_DECIMALS as usize);
            U256::from_str_radix(&padded, 10).map_err(|_| overflow())?
        };

        let base = U256::from(10u64).pow(U256::from(LEDGER_DECIMALS));
        let total = whole
            .checked_mul(base)
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(overflow)?;

        if total.is_zero() {
            return Err(GatewayError::validation("amount must be greater than zero"));
        }
        Ok(Self(total))
    }

    /// The fixed-point integer sent to the ledger.
    pub fn base_units(&self) -> U256 {
        self.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let divisor = U256::from(10u64).pow(U256::from(LEDGER_DECIMALS));
        let whole = self.0 / divisor;
        let remainder = self.0 % divisor;

        if remainder.is_zero() {
            return write!(f, "{whole}");
        }
        let decimal_str = format!("{:0>width$}", remainder, width = LEDGER_DECIMALS as usize);
        write!(f, "{}.{}", whole, decimal_str.trim_end_matches('0'))
    }
}

/// On-chain loan identifier: a non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoanId(U256);

impl LoanId {
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let raw = raw.trim();
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GatewayError::validation(format!(
                "loan id `{raw}` is not a non-negative integer"
            )));
        }
        U256::from_str_radix(raw, 10)
            .map(Self)
            .map_err(|_| GatewayError::validation(format!("loan id `{raw}` is too large")))
    }

    pub fn value(&self) -> U256 {
        self.0
    }
}

impl From<u64> for LoanId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a ledger account address (`0x` followed by 40 hex characters).
pub fn parse_address(raw: &str) -> Result<Address, GatewayError> {
    let raw = raw.trim();
    if !raw.starts_with("0x") {
        return Err(GatewayError::validation("address must start with 0x"));
    }
    if raw.len() != 42 {
        return Err(GatewayError::validation(
            "address must be 42 characters (0x + 40 hex)",
        ));
    }
    if !raw[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GatewayError::validation(
            "address must contain only hex characters",
        ));
    }
    Address::from_str(raw).map_err(|e| GatewayError::validation(format!("invalid address: {e}")))
}

/// A caller-supplied private signing key, as received in a request body.
///
/// `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Body of `POST /create_loan`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateLoanBody {
    /// Borrower account address.
    #[schema(value_type = String, example = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8")]
    pub borrower: Option<Value>,
    /// Principal in human-scale units.
    #[schema(value_type = String, example = "1000.50")]
    pub amount: Option<Value>,
    /// Loan product type, passed to the contract as-is.
    #[schema(value_type = String, example = "standard")]
    pub loan_type: Option<Value>,
    /// Collateral title deed reference.
    #[schema(value_type = String, example = "7")]
    pub collateral_deed_id: Option<Value>,
}

/// Body of `POST /repay_loan`.
#[derive(Deserialize, Default, ToSchema)]
pub struct RepayLoanBody {
    #[schema(value_type = String, example = "1")]
    pub loan_id: Option<Value>,
    /// Repayment in human-scale units.
    #[schema(value_type = String, example = "250")]
    pub repayment_amount: Option<Value>,
    /// Borrower's hex-encoded private key, used for this request only.
    #[schema(value_type = String)]
    pub private_key: Option<Value>,
}

/// Body of `POST /reclaim_collateral/{loanId}`.
#[derive(Deserialize, Default, ToSchema)]
pub struct ReclaimCollateralBody {
    /// Borrower's hex-encoded private key, used for this request only.
    #[schema(value_type = String)]
    pub private_key: Option<Value>,
}

// =============================================================================
// Response Bodies
// =============================================================================

/// Successful write operation.
#[derive(Debug, Serialize, ToSchema)]
pub struct TxSuccessResponse {
    #[schema(example = "success")]
    pub status: String,
    /// Hash of the confirmed transaction.
    #[serde(rename = "txHash")]
    pub tx_hash: String,
}

/// Result of `GET /check_for_default/{loanId}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DefaultCheckResponse {
    #[schema(example = "checked")]
    pub status: String,
    /// Decoded contract return value, passed through unchanged.
    #[schema(value_type = Object)]
    pub result: Value,
}

/// Result of `GET /get_loans/{address}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoanListResponse {
    /// Decoded contract return value, passed through unchanged.
    #[schema(value_type = Object)]
    pub loans: Value,
}
