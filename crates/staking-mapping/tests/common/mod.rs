#![allow(dead_code)]

use staking_core::{
    Address, Amount, ContractEvent, ContractReadError, IndexedEvent, Timestamp, TokenAddressSource,
    B256,
};
use std::cell::Cell;

pub fn staking_contract() -> Address {
    Address::repeat_byte(0x51)
}

pub fn token_contract() -> Address {
    Address::repeat_byte(0x70)
}

/// Builds events in log order, one transaction per event unless told otherwise.
pub struct EventLog {
    block: u64,
    log_index: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            block: 1,
            log_index: 0,
        }
    }

    pub fn next(&mut self, at: u64, event: ContractEvent) -> IndexedEvent {
        self.block += 1;
        self.log_index = 0;
        let tx = B256::from(hash_for_block(self.block));
        self.build(at, tx, event)
    }

    /// Another log in the same transaction as the previous event.
    pub fn same_tx(&mut self, prev: &IndexedEvent, event: ContractEvent) -> IndexedEvent {
        self.log_index += 1;
        let mut ev = self.build(prev.block_timestamp.0, prev.tx_hash, event);
        ev.block_number = prev.block_number;
        ev
    }

    fn build(&self, at: u64, tx_hash: B256, event: ContractEvent) -> IndexedEvent {
        let contract = match event {
            ContractEvent::Transfer { .. }
            | ContractEvent::TokensMinted { .. }
            | ContractEvent::TokensBurned { .. } => token_contract(),
            _ => staking_contract(),
        };
        IndexedEvent {
            block_number: self.block,
            block_timestamp: Timestamp(at),
            tx_hash,
            log_index: self.log_index,
            contract,
            event,
        }
    }
}

fn hash_for_block(n: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&n.to_be_bytes());
    out
}

pub fn amount(v: u64) -> Amount {
    Amount::from_u64(v)
}

pub fn staked(user: Address, v: u64) -> ContractEvent {
    ContractEvent::Staked {
        user,
        amount: amount(v),
    }
}

pub fn withdrawn(user: Address, v: u64) -> ContractEvent {
    ContractEvent::Withdrawn {
        user,
        amount: amount(v),
    }
}

pub fn transfer(from: Address, to: Address, v: u64) -> ContractEvent {
    ContractEvent::Transfer {
        from,
        to,
        amount: amount(v),
    }
}

/// Answers with the token contract and counts lookups.
#[derive(Default)]
pub struct CountingTokenSource {
    pub calls: Cell<u32>,
}

impl TokenAddressSource for CountingTokenSource {
    fn staking_token(&self, _staking_contract: Address) -> Result<Address, ContractReadError> {
        self.calls.set(self.calls.get() + 1);
        Ok(token_contract())
    }
}

pub struct UnreachableNode;

impl TokenAddressSource for UnreachableNode {
    fn staking_token(&self, _staking_contract: Address) -> Result<Address, ContractReadError> {
        Err(ContractReadError::Network("connection refused".to_string()))
    }
}

pub fn signed(v: i64) -> staking_core::SignedAmount {
    v.to_string().parse().expect("valid signed amount")
}
