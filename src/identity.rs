// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Maps an operation to the identity that signs it.

use std::sync::Arc;

use alloy::{primitives::Address, signers::local::PrivateKeySigner};

use crate::{
    blockchain::{signer_from_hex, LedgerError, SigningIdentity},
    error::GatewayError,
    models::{Authority, OperationKind, SigningSecret},
};

/// Resolves signing identities from the operation's authority.
#[derive(Clone)]
pub struct IdentityResolver {
    operator: Arc<PrivateKeySigner>,
}

impl IdentityResolver {
    pub fn new(operator: PrivateKeySigner) -> Self {
        Self {
            operator: Arc::new(operator),
        }
    }

    pub fn operator_address(&self) -> Address {
        self.operator.address()
    }

    /// Operator-authorized and read-only operations always get the operator,
    /// whatever secret was supplied. Borrower operations need a usable secret.
    pub fn resolve(
        &self,
        kind: OperationKind,
        secret: Option<SigningSecret>,
    ) -> Result<SigningIdentity, GatewayError> {
        match kind.authority() {
            Authority::Operator | Authority::ReadOnly => {
                Ok(SigningIdentity::Operator(Arc::clone(&self.operator)))
            }
            Authority::Borrower => {
                let secret = secret.filter(|s| !s.is_blank()).ok_or_else(|| {
                    GatewayError::invalid_credential(format!("private_key is required for {kind}"))
                })?;
                let signer = signer_from_hex(secret.expose()).map_err(|e| match e {
                    LedgerError::InvalidPrivateKey(reason) => {
                        GatewayError::invalid_credential(format!("private_key rejected: {reason}"))
                    }
                    _ => GatewayError::invalid_credential("private_key rejected"),
                })?;
                Ok(SigningIdentity::Caller(signer))
            }
        }
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("operator", &self.operator.address())
            .finish()
    }
}
