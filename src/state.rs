// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{blockchain::LedgerClient, gateway::LoanGateway};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<LoanGateway>,
    /// Used directly only by health checks.
    pub ledger: Arc<dyn LedgerClient>,
}

impl AppState {
    pub fn new(gateway: LoanGateway, ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            gateway: Arc::new(gateway),
            ledger,
        }
    }
}
