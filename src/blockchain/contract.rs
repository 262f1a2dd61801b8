// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Loan contract binding.
//!
//! The contract address record and its interface descriptor (ABI) are loaded
//! once at startup. Argument types are taken from the ABI, so a [`LedgerCall`]
//! only names the method and supplies values in signature order.

use std::{fs, path::Path, str::FromStr};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier},
    json_abi::{Function, JsonAbi},
    primitives::{Address, Bytes},
    rpc::types::TransactionRequest,
};
use serde_json::Value;

use super::client::LedgerError;
use super::types::{methods, CallArg, LedgerCall};

/// Errors loading the deployed contract's artifacts. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ContractArtifactError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid contract address record: {0}")]
    InvalidAddress(String),

    #[error("invalid contract ABI: {0}")]
    InvalidAbi(String),

    #[error("contract ABI has no `{method}` taking {inputs} argument(s)")]
    MissingMethod { method: &'static str, inputs: usize },
}

/// Deployed loan contract: address plus interface descriptor.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    address: Address,
    abi: JsonAbi,
}

impl ContractBinding {
    /// Bind to a contract, checking that the ABI declares every loan method.
    pub fn new(address: Address, abi: JsonAbi) -> Result<Self, ContractArtifactError> {
        for (method, inputs) in methods::REQUIRED {
            let declared = abi
                .function(method)
                .is_some_and(|overloads| overloads.iter().any(|f| f.inputs.len() == inputs));
            if !declared {
                return Err(ContractArtifactError::MissingMethod { method, inputs });
            }
        }
        Ok(Self { address, abi })
    }

    /// Load the address record and ABI from the deployment output files.
    pub fn load(address_path: &Path, abi_path: &Path) -> Result<Self, ContractArtifactError> {
        let address = parse_address_record(&read_json(address_path)?)?;
        let abi = parse_abi(read_json(abi_path)?)?;
        Self::new(address, abi)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Build an unsigned transaction request targeting the contract.
    pub fn transaction(&self, call: &LedgerCall) -> Result<TransactionRequest, LedgerError> {
        let data = self.encode(call)?;
        Ok(TransactionRequest::default()
            .to(self.address)
            .input(data.into()))
    }

    /// ABI-encode a call, selector included.
    pub fn encode(&self, call: &LedgerCall) -> Result<Bytes, LedgerError> {
        let function = self.function(call)?;
        let values = function
            .inputs
            .iter()
            .zip(&call.args)
            .map(|(param, arg)| {
                let ty = param
                    .resolve()
                    .map_err(|e| LedgerError::Encoding(format!("{}: {}", param.name, e)))?;
                coerce_arg(&ty, arg)
                    .map_err(|e| LedgerError::Encoding(format!("{} `{}`: {}", param.name, arg, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        function
            .abi_encode_input(&values)
            .map(Bytes::from)
            .map_err(|e| LedgerError::Encoding(e.to_string()))
    }

    /// Decode a read call's return data into JSON.
    ///
    /// A single return value is unwrapped; several become an array.
    pub fn decode_output(&self, call: &LedgerCall, data: &[u8]) -> Result<Value, LedgerError> {
        let function = self.function(call)?;
        let mut values = function
            .abi_decode_output(data)
            .map_err(|e| LedgerError::Decoding(e.to_string()))?;

        Ok(match values.len() {
            0 => Value::Null,
            1 => sol_value_to_json(&values.remove(0)),
            _ => Value::Array(values.iter().map(sol_value_to_json).collect()),
        })
    }

    fn function(&self, call: &LedgerCall) -> Result<&Function, LedgerError> {
        self.abi
            .function(call.method)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == call.args.len()))
            .ok_or_else(|| LedgerError::UnknownMethod(call.method.to_string()))
    }
}

fn coerce_arg(ty: &DynSolType, arg: &CallArg) -> Result<DynSolValue, String> {
    match (ty, arg) {
        (DynSolType::Address, CallArg::Address(addr)) => Ok(DynSolValue::Address(*addr)),
        (DynSolType::Uint(bits), CallArg::Uint(value)) => {
            if *bits < 256 && value.bit_len() > *bits {
                return Err(format!("does not fit in uint{bits}"));
            }
            Ok(DynSolValue::Uint(*value, *bits))
        }
        (DynSolType::String, CallArg::Text(text)) => Ok(DynSolValue::String(text.clone())),
        (ty, arg) => ty.coerce_str(&arg.to_string()).map_err(|e| e.to_string()),
    }
}

/// Render a decoded ABI value as JSON. Integers become decimal strings so no
/// precision is lost.
fn sol_value_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::Address(addr) => Value::String(addr.to_checksum(None)),
        DynSolValue::FixedBytes(word, size) => {
            Value::String(format!("0x{}", alloy::hex::encode(&word[..*size])))
        }
        DynSolValue::Bytes(bytes) => Value::String(format!("0x{}", alloy::hex::encode(bytes))),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(sol_value_to_json).collect())
        }
        other => Value::String(format!("{other:?}")),
    }
}

fn read_json(path: &Path) -> Result<Value, ContractArtifactError> {
    let display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ContractArtifactError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ContractArtifactError::Json {
        path: display,
        source,
    })
}

/// Accepts either a bare JSON string or `{"address": "0x..."}`.
fn parse_address_record(record: &Value) -> Result<Address, ContractArtifactError> {
    let raw = match record {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("address")
            .and_then(Value::as_str)
            .ok_or_else(|| ContractArtifactError::InvalidAddress("missing `address` field".into()))?,
        _ => {
            return Err(ContractArtifactError::InvalidAddress(
                "expected a string or an object".into(),
            ))
        }
    };
    Address::from_str(raw.trim()).map_err(|e| ContractArtifactError::InvalidAddress(e.to_string()))
}

/// Accepts a bare ABI array or a build artifact object with an `abi` field.
fn parse_abi(value: Value) -> Result<JsonAbi, ContractArtifactError> {
    let abi = match value {
        Value::Object(mut map) if map.contains_key("abi") => map.remove("abi").unwrap_or_default(),
        other => other,
    };
    serde_json::from_value(abi).map_err(|e| ContractArtifactError::InvalidAbi(e.to_string()))
}
