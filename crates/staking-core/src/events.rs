//! Decoded contract events and their delivery envelope.

use crate::amount::Amount;
use crate::entities::Timestamp;
use crate::serde_util::dec_u64;
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block context shared by every log in a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockContext {
    pub number: u64,
    pub timestamp: Timestamp,
}

/// Position of an event in the log. Ordered by block, then log index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventCursor {
    #[serde(with = "dec_u64")]
    pub block_number: u64,
    #[serde(with = "dec_u64")]
    pub log_index: u64,
}

impl fmt::Display for EventCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {} log {}", self.block_number, self.log_index)
    }
}

/// Events emitted by the staking contract and its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContractEvent {
    Staked {
        user: Address,
        amount: Amount,
    },
    Withdrawn {
        user: Address,
        amount: Amount,
    },
    RewardClaimed {
        user: Address,
        amount: Amount,
    },
    RewardRateUpdated {
        new_rate: Amount,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    TokensMinted {
        to: Address,
        amount: Amount,
    },
    TokensBurned {
        from: Address,
        amount: Amount,
    },
}

impl ContractEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            ContractEvent::Staked { .. } => "Staked",
            ContractEvent::Withdrawn { .. } => "Withdrawn",
            ContractEvent::RewardClaimed { .. } => "RewardClaimed",
            ContractEvent::RewardRateUpdated { .. } => "RewardRateUpdated",
            ContractEvent::Transfer { .. } => "Transfer",
            ContractEvent::TokensMinted { .. } => "TokensMinted",
            ContractEvent::TokensBurned { .. } => "TokensBurned",
        }
    }
}

/// One decoded log plus the envelope the event source delivers with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEvent {
    #[serde(with = "dec_u64")]
    pub block_number: u64,
    pub block_timestamp: Timestamp,
    pub tx_hash: B256,
    #[serde(with = "dec_u64")]
    pub log_index: u64,
    /// Emitting contract.
    pub contract: Address,
    pub event: ContractEvent,
}

impl IndexedEvent {
    pub fn block(&self) -> BlockContext {
        BlockContext {
            number: self.block_number,
            timestamp: self.block_timestamp,
        }
    }

    pub fn cursor(&self) -> EventCursor {
        EventCursor {
            block_number: self.block_number,
            log_index: self.log_index,
        }
    }
}
