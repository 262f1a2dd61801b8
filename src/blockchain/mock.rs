// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recording ledger double for tests.

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Mutex,
};

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use serde_json::Value;

use super::client::{LedgerClient, LedgerError};
use super::signing::SigningIdentity;
use super::types::{LedgerCall, PendingTx, TxReceipt};

/// How the double answers a receipt wait.
#[derive(Debug, Clone)]
pub enum ReceiptBehavior {
    Confirm,
    Revert(Option<String>),
    /// Never produce a receipt.
    Hang,
}

/// How the double answers `block_number`.
#[derive(Debug, Clone, Copy)]
pub enum NodeBehavior {
    Up,
    Down,
    /// Never answer.
    Stalled,
}

/// One recorded submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub call: LedgerCall,
    pub signer: Address,
    pub by_operator: bool,
}

pub struct MockLedger {
    receipts: ReceiptBehavior,
    submit_error: Option<String>,
    read_result: Result<Value, String>,
    node: NodeBehavior,
    submissions: Mutex<Vec<Submission>>,
    reads: Mutex<Vec<LedgerCall>>,
    waits: AtomicUsize,
    next_hash: AtomicU64,
}

impl MockLedger {
    /// Accepts and confirms every submission; reads return `false`.
    pub fn confirming() -> Self {
        Self {
            receipts: ReceiptBehavior::Confirm,
            submit_error: None,
            read_result: Ok(Value::Bool(false)),
            node: NodeBehavior::Up,
            submissions: Mutex::new(Vec::new()),
            reads: Mutex::new(Vec::new()),
            waits: AtomicUsize::new(0),
            next_hash: AtomicU64::new(1),
        }
    }

    pub fn reverting(reason: &str) -> Self {
        Self {
            receipts: ReceiptBehavior::Revert(Some(reason.to_string())),
            ..Self::confirming()
        }
    }

    /// Mines every transaction as failed without exposing a reason.
    pub fn reverting_without_reason() -> Self {
        Self {
            receipts: ReceiptBehavior::Revert(None),
            ..Self::confirming()
        }
    }

    pub fn hanging() -> Self {
        Self {
            receipts: ReceiptBehavior::Hang,
            ..Self::confirming()
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            submit_error: Some(reason.to_string()),
            ..Self::confirming()
        }
    }

    pub fn with_read_result(mut self, result: Result<Value, String>) -> Self {
        self.read_result = result;
        self
    }

    pub fn with_node(mut self, node: NodeBehavior) -> Self {
        self.node = node;
        self
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn reads(&self) -> Vec<LedgerCall> {
        self.reads.lock().unwrap().clone()
    }

    pub fn waits(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }

    /// Total number of ledger invocations of any kind.
    pub fn invocations(&self) -> usize {
        self.submissions.lock().unwrap().len() + self.reads.lock().unwrap().len() + self.waits()
    }
}

fn hash_from(n: u64) -> TxHash {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&n.to_be_bytes());
    TxHash::from(bytes)
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn submit(
        &self,
        call: &LedgerCall,
        identity: &SigningIdentity,
    ) -> Result<PendingTx, LedgerError> {
        self.submissions.lock().unwrap().push(Submission {
            call: call.clone(),
            signer: identity.address(),
            by_operator: identity.is_operator(),
        });
        if let Some(reason) = &self.submit_error {
            return Err(LedgerError::Reverted(reason.clone()));
        }
        Ok(PendingTx {
            tx_hash: hash_from(self.next_hash.fetch_add(1, Ordering::SeqCst)),
            from: identity.address(),
        })
    }

    async fn wait_for_receipt(
        &self,
        _call: &LedgerCall,
        pending: &PendingTx,
    ) -> Result<TxReceipt, LedgerError> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        let (success, revert_reason) = match &self.receipts {
            ReceiptBehavior::Confirm => (true, None),
            ReceiptBehavior::Revert(reason) => (false, reason.clone()),
            ReceiptBehavior::Hang => std::future::pending().await,
        };
        Ok(TxReceipt {
            tx_hash: pending.tx_hash,
            block_number: 1,
            gas_used: 21_000,
            success,
            revert_reason,
        })
    }

    async fn read(&self, call: &LedgerCall) -> Result<Value, LedgerError> {
        self.reads.lock().unwrap().push(call.clone());
        self.read_result.clone().map_err(LedgerError::RpcError)
    }

    async fn block_number(&self) -> Result<u64, LedgerError> {
        match self.node {
            NodeBehavior::Up => Ok(42),
            NodeBehavior::Down => Err(LedgerError::RpcError("connection refused".to_string())),
            NodeBehavior::Stalled => std::future::pending().await,
        }
    }
}
