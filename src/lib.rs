// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Loan Gateway - HTTP relay for on-chain loan lifecycle operations
//!
//! Accepts loan requests over HTTP, signs them as the platform operator or as
//! the borrower, submits them to the deployed loan contract and answers once
//! the ledger has confirmed or rejected them.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Ledger client, contract binding and signing identities
//! - `identity` - Operation to signing identity mapping
//! - `validation` - Request validation
//! - `relay` - Submission and bounded confirmation wait

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod logging;
pub mod models;
pub mod relay;
pub mod state;
pub mod validation;
