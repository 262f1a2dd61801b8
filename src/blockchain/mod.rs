// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger integration for the deployed loan contract.
//!
//! This module provides functionality for:
//! - Loading the contract address and ABI
//! - Signing and submitting contract calls
//! - Awaiting receipts and read-only calls

pub mod client;
pub mod contract;
#[cfg(test)]
pub mod mock;
pub mod signing;
pub mod types;

pub use client::{LedgerClient, LedgerError, RpcLedgerClient};
pub use contract::{ContractArtifactError, ContractBinding};
pub use signing::{signer_from_hex, signer_from_pem_file, SigningIdentity};
pub use types::*;
