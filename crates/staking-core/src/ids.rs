//! Canonical entity identifiers.
//!
//! Every id is derived from typed on-chain values, never from the raw text
//! an event source happened to use. Two spellings of the same address
//! (checksummed, upper-case, lower-case) therefore always resolve to the
//! same `User`.

use alloy_primitives::{Address, B256};
use std::str::FromStr;

/// Fixed key of the global statistics singleton.
pub const GLOBAL_STATS_ID: &str = "global";

/// Mint/burn sentinel in token transfers.
pub const ZERO_ADDRESS: Address = Address::ZERO;

/// Separator between transaction hash and log index. Never a hex digit.
const LOG_INDEX_SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("invalid address {0:?}")]
    Address(String),
    #[error("invalid transaction hash {0:?}")]
    TxHash(String),
}

/// Lowercase `0x`-prefixed hex of an address.
pub fn address_hex(address: &Address) -> String {
    format!("{address:#x}")
}

pub fn user_id(address: &Address) -> String {
    address_hex(address)
}

/// Lowercase `0x`-prefixed hex of the transaction hash.
pub fn tx_id(hash: &B256) -> String {
    format!("{hash:#x}")
}

/// `{txHash}-{logIndex}`; unique per emitted log.
pub fn activity_id(hash: &B256, log_index: u64) -> String {
    format!("{}{LOG_INDEX_SEPARATOR}{log_index}", tx_id(hash))
}

pub fn parse_address(s: &str) -> Result<Address, IdError> {
    Address::from_str(s.trim()).map_err(|_| IdError::Address(s.to_string()))
}

pub fn parse_tx_hash(s: &str) -> Result<B256, IdError> {
    B256::from_str(s.trim()).map_err(|_| IdError::TxHash(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn differently_cased_addresses_share_one_user_id() {
        let checksummed = parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        let lower = parse_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let upper = parse_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
        assert_eq!(user_id(&checksummed), user_id(&lower));
        assert_eq!(user_id(&upper), user_id(&lower));
        assert_eq!(
            user_id(&lower),
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
        );
    }

    #[test]
    fn zero_address_renders_as_forty_zeros() {
        assert_eq!(
            user_id(&ZERO_ADDRESS),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn activity_ids_differ_by_log_index() {
        let hash = B256::repeat_byte(0xab);
        let a = activity_id(&hash, 0);
        let b = activity_id(&hash, 1);
        assert_ne!(a, b);
        assert!(a.starts_with(&tx_id(&hash)));
        assert!(a.ends_with("-0"));
        assert_eq!(tx_id(&hash), tx_id(&hash).to_lowercase());
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(parse_address("0x1234"), Err(IdError::Address(_))));
        assert!(matches!(parse_tx_hash("nothex"), Err(IdError::TxHash(_))));
    }
}
