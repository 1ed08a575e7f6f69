//! Auxiliary contract read: the staking contract's configured token.

use alloy_primitives::Address;

#[derive(Debug, thiserror::Error)]
pub enum ContractReadError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Resolves `stakingToken()` of a staking contract. Called at most once per
/// index, on the first Staked event.
pub trait TokenAddressSource {
    fn staking_token(&self, staking_contract: Address) -> Result<Address, ContractReadError>;
}

impl<T: TokenAddressSource + ?Sized> TokenAddressSource for &T {
    fn staking_token(&self, staking_contract: Address) -> Result<Address, ContractReadError> {
        (**self).staking_token(staking_contract)
    }
}

/// Answers every lookup with a configured address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTokenAddress(pub Address);

impl TokenAddressSource for FixedTokenAddress {
    fn staking_token(&self, _staking_contract: Address) -> Result<Address, ContractReadError> {
        Ok(self.0)
    }
}
