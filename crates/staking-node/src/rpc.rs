//! `stakingToken()` over Ethereum JSON-RPC.

use alloy_primitives::{hex, keccak256, Address};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use staking_core::{address_hex, ContractReadError, TokenAddressSource};
use std::time::Duration;
use tracing::debug;

const STAKING_TOKEN_SIGNATURE: &str = "stakingToken()";

/// Blocking `eth_call` client for the staking contract's token getter.
#[derive(Debug, Clone)]
pub struct RpcTokenAddressSource {
    rpc_url: String,
    client: Client,
}

impl RpcTokenAddressSource {
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, ContractReadError> {
        let rpc_url = rpc_url.into();
        if rpc_url.trim().is_empty() {
            return Err(ContractReadError::Config("ethereum.rpc_url is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContractReadError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { rpc_url, client })
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

pub fn staking_token_selector() -> [u8; 4] {
    let hash = keccak256(STAKING_TOKEN_SIGNATURE.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// An address return value is one ABI word: 12 zero bytes, then the address.
pub fn decode_address_word(result: &str) -> Result<Address, ContractReadError> {
    let bytes = hex::decode(result)
        .map_err(|e| ContractReadError::Serialization(format!("invalid hex in eth_call result: {e}")))?;
    if bytes.len() != 32 {
        return Err(ContractReadError::Protocol(format!(
            "expected a 32-byte word, got {} bytes",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes[12..]))
}

impl TokenAddressSource for RpcTokenAddressSource {
    fn staking_token(&self, staking_contract: Address) -> Result<Address, ContractReadError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": address_hex(&staking_contract),
                    "data": hex::encode_prefixed(staking_token_selector()),
                },
                "latest"
            ],
        });
        debug!(contract = %address_hex(&staking_contract), "eth_call stakingToken()");

        let resp = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .map_err(|e| ContractReadError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ContractReadError::Network(format!("rpc returned http {status}")));
        }
        let parsed: RpcResponse = resp
            .json()
            .map_err(|e| ContractReadError::Serialization(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(ContractReadError::Protocol(format!(
                "eth_call failed ({}): {}",
                err.code, err.message
            )));
        }
        let result = parsed
            .result
            .ok_or_else(|| ContractReadError::Protocol("eth_call returned no result".to_string()))?;
        decode_address_word(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_low_twenty_bytes() {
        let word = format!("0x{}{}", "00".repeat(12), "ab".repeat(20));
        assert_eq!(decode_address_word(&word).unwrap(), Address::repeat_byte(0xab));
    }

    #[test]
    fn rejects_short_results() {
        let err = decode_address_word("0x").unwrap_err();
        assert!(matches!(err, ContractReadError::Protocol(_)), "{err}");
        let err = decode_address_word("0xzz").unwrap_err();
        assert!(matches!(err, ContractReadError::Serialization(_)), "{err}");
    }

    #[test]
    fn empty_url_is_a_config_error() {
        let err = RpcTokenAddressSource::new(" ", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ContractReadError::Config(_)));
    }
}
