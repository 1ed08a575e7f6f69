#![forbid(unsafe_code)]
#![deny(clippy::float_arithmetic)]
#![deny(clippy::float_cmp)]
#![deny(clippy::cast_possible_truncation)]
#![deny(clippy::cast_sign_loss)]

//! Shared types for the staking/token event indexer.
//!
//! The indexer consumes decoded events from two contracts (a staking
//! contract and its ERC-20 style token) and reduces them into a small
//! entity graph: users, transactions, staking activities, transfers and a
//! single global statistics record. This crate holds everything the reducer
//! and its collaborators agree on:
//!
//! - canonical identifiers ([`ids`])
//! - 256-bit amounts with decimal-string wire encoding ([`amount`])
//! - entity records and their mutation rules ([`entities`])
//! - decoded event envelopes ([`events`])
//! - the entity store seam ([`store`]) and the auxiliary contract read
//!   seam ([`contract`])

pub mod amount;
pub mod contract;
pub mod entities;
pub mod events;
pub mod ids;
pub mod serde_util;
pub mod store;

pub use alloy_primitives::{Address, B256};
pub use amount::{Amount, ArithmeticError, SignedAmount};
pub use contract::{ContractReadError, FixedTokenAddress, TokenAddressSource};
pub use entities::{
    ActivityKind, Entity, EntityKind, GlobalStats, StakingActivity, Timestamp, Transaction,
    Transfer, User,
};
pub use events::{BlockContext, ContractEvent, EventCursor, IndexedEvent};
pub use ids::{
    activity_id, address_hex, parse_address, parse_tx_hash, tx_id, user_id, IdError,
    GLOBAL_STATS_ID, ZERO_ADDRESS,
};
pub use store::{decode_entity, encode_entity, load, EntityStore, StoreError, WriteBatch};
