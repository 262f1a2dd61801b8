// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing identities and key parsing.
//!
//! A [`SigningIdentity`] is the capability to sign one ledger call. The
//! operator identity is loaded once at startup and shared read-only; a caller
//! identity is built from a request's secret and owned by that request alone.

use std::{path::Path, sync::Arc};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use k256::SecretKey;

use super::client::LedgerError;

#[derive(Clone)]
pub enum SigningIdentity {
    /// Process-lifetime platform operator key.
    Operator(Arc<PrivateKeySigner>),
    /// Per-request borrower key. Never stored outside the request.
    Caller(PrivateKeySigner),
}

impl SigningIdentity {
    pub fn signer(&self) -> &PrivateKeySigner {
        match self {
            SigningIdentity::Operator(signer) => signer,
            SigningIdentity::Caller(signer) => signer,
        }
    }

    pub fn address(&self) -> Address {
        self.signer().address()
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, SigningIdentity::Operator(_))
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_operator() { "Operator" } else { "Caller" };
        f.debug_tuple(kind).field(&self.address()).finish()
    }
}

/// Create a signer from a hex-encoded private key, with or without `0x`.
///
/// Error messages never include key material.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, LedgerError> {
    let trimmed = private_key_hex.trim();
    let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if hex.len() != 64 {
        return Err(LedgerError::InvalidPrivateKey(
            "expected 32 bytes of hex (64 characters)".to_string(),
        ));
    }

    let key_bytes = alloy::hex::decode(hex)
        .map_err(|_| LedgerError::InvalidPrivateKey("key is not valid hex".to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes).map_err(|_| {
        LedgerError::InvalidPrivateKey("key is not a valid secp256k1 scalar".to_string())
    })
}

/// Parse a PEM-encoded secp256k1 key (SEC1 or PKCS#8) into a signer.
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, LedgerError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| LedgerError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| LedgerError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| {
            use k256::pkcs8::DecodePrivateKey;
            SecretKey::from_pkcs8_der(pem.contents())
        })
        .map_err(|_| LedgerError::InvalidPrivateKey("unsupported key format".to_string()))?;

    PrivateKeySigner::from_slice(&secret_key.to_bytes())
        .map_err(|e| LedgerError::InvalidPrivateKey(e.to_string()))
}

/// Read the operator key from a PEM file.
pub fn signer_from_pem_file(path: &Path) -> Result<PrivateKeySigner, LedgerError> {
    let bytes = std::fs::read(path).map_err(|e| {
        LedgerError::InvalidPrivateKey(format!("cannot read {}: {}", path.display(), e))
    })?;
    signer_from_pem(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::pkcs8::{EncodePrivateKey, LineEnding};

    /// Well-known development key (first default account of a local node).
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn hex_key_with_and_without_prefix() {
        let plain = signer_from_hex(DEV_KEY).unwrap();
        let prefixed = signer_from_hex(&format!("0x{DEV_KEY}")).unwrap();
        assert_eq!(plain.address(), prefixed.address());
        assert_eq!(plain.address(), DEV_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn malformed_hex_keys_are_rejected_without_echoing_them() {
        let non_hex = format!("{}zz", &DEV_KEY[..62]);
        for bad in ["", "1234", non_hex.as_str()] {
            let err = signer_from_hex(bad).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidPrivateKey(_)));
            if !bad.is_empty() {
                assert!(!err.to_string().contains(bad));
            }
        }
        // Zero is not a valid scalar.
        assert!(signer_from_hex(&"0".repeat(64)).is_err());
    }

    #[test]
    fn pkcs8_pem_round_trips_to_the_same_address() {
        let key_bytes = alloy::hex::decode(DEV_KEY).unwrap();
        let secret = SecretKey::from_slice(&key_bytes).unwrap();
        let pem = secret.to_pkcs8_pem(LineEnding::LF).unwrap();

        let signer = signer_from_pem(pem.as_bytes()).unwrap();
        assert_eq!(signer.address(), DEV_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn pem_file_is_read_from_disk() {
        let key_bytes = alloy::hex::decode(DEV_KEY).unwrap();
        let pem = SecretKey::from_slice(&key_bytes)
            .unwrap()
            .to_pkcs8_pem(LineEnding::LF)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operator.pem");
        std::fs::write(&path, pem.as_bytes()).unwrap();

        assert!(signer_from_pem_file(&path).is_ok());
        assert!(signer_from_pem_file(&dir.path().join("missing.pem")).is_err());
    }

    #[test]
    fn garbage_pem_is_rejected() {
        assert!(signer_from_pem(b"not a pem").is_err());
    }

    #[test]
    fn debug_shows_address_only() {
        let identity = SigningIdentity::Caller(signer_from_hex(DEV_KEY).unwrap());
        let rendered = format!("{identity:?}");
        assert!(rendered.starts_with("Caller("));
        assert!(!rendered.contains(DEV_KEY));
    }
}
