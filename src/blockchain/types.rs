// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger call and receipt types.

use alloy::primitives::{Address, TxHash, U256};

/// Contract method names of the deployed loan contract.
pub mod methods {
    pub const CREATE_LOAN: &str = "createLoan";
    pub const DISBURSE_LOAN: &str = "disburseLoan";
    pub const REPAY_LOAN: &str = "repayLoan";
    pub const CHECK_FOR_DEFAULT: &str = "checkForDefault";
    pub const RECLAIM_COLLATERAL: &str = "reclaimCollateral";
    pub const GET_LOANS_BY_BORROWER: &str = "getLoansByBorrower";

    /// Every method the gateway calls, with its expected input count.
    pub const REQUIRED: [(&str, usize); 6] = [
        (CREATE_LOAN, 4),
        (DISBURSE_LOAN, 1),
        (REPAY_LOAN, 2),
        (CHECK_FOR_DEFAULT, 1),
        (RECLAIM_COLLATERAL, 1),
        (GET_LOANS_BY_BORROWER, 1),
    ];
}

/// A single contract call argument.
///
/// The concrete ABI type is decided by the contract's interface descriptor
/// when the call is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Address(Address),
    Uint(U256),
    Text(String),
}

impl std::fmt::Display for CallArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallArg::Address(addr) => write!(f, "{addr}"),
            CallArg::Uint(value) => write!(f, "{value}"),
            CallArg::Text(text) => f.write_str(text),
        }
    }
}

/// A contract method and its ordered arguments, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCall {
    pub method: &'static str,
    pub args: Vec<CallArg>,
}

impl LedgerCall {
    pub fn new(method: &'static str, args: Vec<CallArg>) -> Self {
        Self { method, args }
    }
}

/// Handle for a transaction accepted by the node but not yet included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTx {
    pub tx_hash: TxHash,
    /// Account that signed the transaction.
    pub from: Address,
}

/// Transaction receipt after inclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    /// Whether contract execution succeeded
    pub success: bool,
    /// Revert reason, when the node exposes one
    pub revert_reason: Option<String>,
}
