// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`GatewayConfig`] loaded from them at startup. Any invalid value is fatal.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `LEDGER_RPC_URL` | Ledger node JSON-RPC endpoint | `http://127.0.0.1:8545` |
//! | `CONTRACT_ADDRESS_PATH` | Deployed loan contract address record | `ignition/deployed_contracts/NEEFLoanContract_address.json` |
//! | `CONTRACT_ABI_PATH` | Loan contract ABI | `ignition/deployed_contracts/NEEFLoanContract_abi.json` |
//! | `OPERATOR_PRIVATE_KEY` | Operator signing key (hex) | One of the two key variables is required |
//! | `OPERATOR_KEY_PEM_PATH` | Operator signing key (PEM file) | One of the two key variables is required |
//! | `CONFIRMATION_TIMEOUT_SECS` | Upper bound on the confirmation wait | `120` |
//! | `RECEIPT_POLL_INTERVAL_MS` | Receipt polling interval | `1000` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM certificate chain and key; both enable HTTPS | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf, time::Duration};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LEDGER_RPC_URL_ENV: &str = "LEDGER_RPC_URL";
pub const CONTRACT_ADDRESS_PATH_ENV: &str = "CONTRACT_ADDRESS_PATH";
pub const CONTRACT_ABI_PATH_ENV: &str = "CONTRACT_ABI_PATH";

/// Hex-encoded operator key. Never logged.
pub const OPERATOR_PRIVATE_KEY_ENV: &str = "OPERATOR_PRIVATE_KEY";

/// Path to a PKCS#8 or SEC1 PEM file holding the operator key.
pub const OPERATOR_KEY_PEM_PATH_ENV: &str = "OPERATOR_KEY_PEM_PATH";

pub const CONFIRMATION_TIMEOUT_SECS_ENV: &str = "CONFIRMATION_TIMEOUT_SECS";
pub const RECEIPT_POLL_INTERVAL_MS_ENV: &str = "RECEIPT_POLL_INTERVAL_MS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LEDGER_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_CONTRACT_ADDRESS_PATH: &str =
    "ignition/deployed_contracts/NEEFLoanContract_address.json";
pub const DEFAULT_CONTRACT_ABI_PATH: &str = "ignition/deployed_contracts/NEEFLoanContract_abi.json";
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Where the operator signing key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum OperatorKeySource {
    Hex(String),
    PemFile(PathBuf),
}

impl std::fmt::Debug for OperatorKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatorKeySource::Hex(_) => f.write_str("Hex(<redacted>)"),
            OperatorKeySource::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub ledger_rpc_url: String,
    pub contract_address_path: PathBuf,
    pub contract_abi_path: PathBuf,
    pub operator_key: OperatorKeySource,
    pub confirmation_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub tls: Option<TlsPaths>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("missing operator key: set OPERATOR_PRIVATE_KEY or OPERATOR_KEY_PEM_PATH")]
    MissingOperatorKey,

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let ledger_rpc_url =
            get(LEDGER_RPC_URL_ENV).unwrap_or_else(|| DEFAULT_LEDGER_RPC_URL.to_string());
        url::Url::parse(&ledger_rpc_url).map_err(|e| ConfigError::InvalidValue {
            name: LEDGER_RPC_URL_ENV,
            reason: e.to_string(),
        })?;

        let operator_key = match (get(OPERATOR_PRIVATE_KEY_ENV), get(OPERATOR_KEY_PEM_PATH_ENV)) {
            (Some(hex), _) => OperatorKeySource::Hex(hex.trim().to_string()),
            (None, Some(path)) => OperatorKeySource::PemFile(PathBuf::from(path)),
            (None, None) => return Err(ConfigError::MissingOperatorKey),
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        Ok(Self {
            bind_addr,
            ledger_rpc_url,
            contract_address_path: get(CONTRACT_ADDRESS_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTRACT_ADDRESS_PATH)),
            contract_abi_path: get(CONTRACT_ABI_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTRACT_ABI_PATH)),
            operator_key,
            confirmation_timeout: duration_var(
                get(CONFIRMATION_TIMEOUT_SECS_ENV),
                CONFIRMATION_TIMEOUT_SECS_ENV,
                Duration::from_secs,
                DEFAULT_CONFIRMATION_TIMEOUT,
            )?,
            receipt_poll_interval: duration_var(
                get(RECEIPT_POLL_INTERVAL_MS_ENV),
                RECEIPT_POLL_INTERVAL_MS_ENV,
                Duration::from_millis,
                DEFAULT_RECEIPT_POLL_INTERVAL,
            )?,
            tls,
        })
    }
}

fn duration_var(
    raw: Option<String>,
    name: &'static str,
    unit: fn(u64) -> Duration,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            name,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(unit(value)),
        Err(e) => Err(ConfigError::InvalidValue {
            name,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_operator_key_is_set() {
        let config =
            GatewayConfig::from_lookup(lookup(&[(OPERATOR_PRIVATE_KEY_ENV, "abcd")])).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.ledger_rpc_url, DEFAULT_LEDGER_RPC_URL);
        assert_eq!(
            config.contract_abi_path,
            PathBuf::from(DEFAULT_CONTRACT_ABI_PATH)
        );
        assert_eq!(config.confirmation_timeout, Duration::from_secs(120));
        assert_eq!(config.receipt_poll_interval, Duration::from_millis(1000));
        assert_eq!(config.operator_key, OperatorKeySource::Hex("abcd".into()));
        assert!(config.tls.is_none());
    }

    #[test]
    fn operator_key_is_required() {
        assert_eq!(
            GatewayConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingOperatorKey
        );
    }

    #[test]
    fn pem_path_is_used_when_hex_key_is_absent() {
        let config = GatewayConfig::from_lookup(lookup(&[(
            OPERATOR_KEY_PEM_PATH_ENV,
            "/secrets/operator.pem",
        )]))
        .unwrap();
        assert_eq!(
            config.operator_key,
            OperatorKeySource::PemFile(PathBuf::from("/secrets/operator.pem"))
        );
    }

    #[test]
    fn rejects_zero_and_non_numeric_timeouts() {
        let zero = GatewayConfig::from_lookup(lookup(&[
            (OPERATOR_PRIVATE_KEY_ENV, "abcd"),
            (CONFIRMATION_TIMEOUT_SECS_ENV, "0"),
        ]));
        assert!(matches!(zero, Err(ConfigError::InvalidValue { .. })));

        let garbage = GatewayConfig::from_lookup(lookup(&[
            (OPERATOR_PRIVATE_KEY_ENV, "abcd"),
            (RECEIPT_POLL_INTERVAL_MS_ENV, "soon"),
        ]));
        assert!(matches!(garbage, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn tls_paths_must_come_in_pairs() {
        let result = GatewayConfig::from_lookup(lookup(&[
            (OPERATOR_PRIVATE_KEY_ENV, "abcd"),
            (TLS_CERT_PATH_ENV, "/tls/cert.pem"),
        ]));
        assert_eq!(result.unwrap_err(), ConfigError::IncompleteTls);
    }

    #[test]
    fn rejects_malformed_rpc_url() {
        let result = GatewayConfig::from_lookup(lookup(&[
            (OPERATOR_PRIVATE_KEY_ENV, "abcd"),
            (LEDGER_RPC_URL_ENV, "not a url"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: LEDGER_RPC_URL_ENV,
                ..
            })
        ));
    }

    #[test]
    fn operator_key_debug_is_redacted() {
        let source = OperatorKeySource::Hex("deadbeef".into());
        assert!(!format!("{source:?}").contains("deadbeef"));
    }

    #[test]
    fn log_format_parses_json_case_insensitively() {
        assert_eq!(LogFormat::parse(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
    }
}
