//! Indexed entities.
//!
//! Balances and totals are private; they only move through the methods on
//! each record, which is where the stake/withdraw/claim rules live. Log
//! records (`StakingActivity`, `Transfer`) have constructors and getters
//! only.

use crate::amount::{Amount, ArithmeticError, SignedAmount};
use crate::events::BlockContext;
use crate::ids::GLOBAL_STATS_ID;
use crate::serde_util::{dec_u64, U64Visitor};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block timestamp (unix seconds), serialized as a decimal string.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(U64Visitor).map(Timestamp)
    }
}

/// Keyspace of a persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    User,
    Transaction,
    StakingActivity,
    Transfer,
    GlobalStats,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Transaction => "transaction",
            EntityKind::StakingActivity => "staking_activity",
            EntityKind::Transfer => "transfer",
            EntityKind::GlobalStats => "global_stats",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record stored under a string key in its own keyspace.
pub trait Entity: Serialize + DeserializeOwned {
    const KIND: EntityKind;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: String,
    token_balance: SignedAmount,
    staked_amount: SignedAmount,
    total_rewards_claimed: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_reward_claimed: Option<Timestamp>,
    /// Present iff `staked_amount > 0` under in-order delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    staked_at: Option<Timestamp>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token_balance: SignedAmount::ZERO,
            staked_amount: SignedAmount::ZERO,
            total_rewards_claimed: Amount::ZERO,
            last_reward_claimed: None,
            staked_at: None,
        }
    }

    pub fn token_balance(&self) -> SignedAmount {
        self.token_balance
    }

    pub fn staked_amount(&self) -> SignedAmount {
        self.staked_amount
    }

    pub fn total_rewards_claimed(&self) -> Amount {
        self.total_rewards_claimed
    }

    pub fn last_reward_claimed(&self) -> Option<Timestamp> {
        self.last_reward_claimed
    }

    pub fn staked_at(&self) -> Option<Timestamp> {
        self.staked_at
    }

    /// Adds to the stake and restarts the stake clock, even when a stake
    /// is already open.
    pub fn stake(&mut self, amount: Amount, at: Timestamp) -> Result<(), ArithmeticError> {
        self.staked_amount = self.staked_amount.checked_add_amount(amount)?;
        self.staked_at = Some(at);
        Ok(())
    }

    /// Removes from the stake. The stake clock is cleared only when the
    /// stake lands exactly on zero; no lower bound is enforced.
    pub fn withdraw(&mut self, amount: Amount) -> Result<(), ArithmeticError> {
        self.staked_amount = self.staked_amount.checked_sub_amount(amount)?;
        if self.staked_amount.is_zero() {
            self.staked_at = None;
        }
        Ok(())
    }

    pub fn claim(&mut self, amount: Amount, at: Timestamp) -> Result<(), ArithmeticError> {
        self.total_rewards_claimed = self.total_rewards_claimed.checked_add(amount)?;
        self.last_reward_claimed = Some(at);
        Ok(())
    }

    pub fn credit_tokens(&mut self, amount: Amount) -> Result<(), ArithmeticError> {
        self.token_balance = self.token_balance.checked_add_amount(amount)?;
        Ok(())
    }

    pub fn debit_tokens(&mut self, amount: Amount) -> Result<(), ArithmeticError> {
        self.token_balance = self.token_balance.checked_sub_amount(amount)?;
        Ok(())
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Block metadata of the first event seen from a transaction. Write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: String,
    #[serde(with = "dec_u64")]
    block_number: u64,
    timestamp: Timestamp,
}

impl Transaction {
    pub fn new(id: impl Into<String>, block: &BlockContext) -> Self {
        Self {
            id: id.into(),
            block_number: block.number,
            timestamp: block.timestamp,
        }
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl Entity for Transaction {
    const KIND: EntityKind = EntityKind::Transaction;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Stake,
    Withdraw,
    Claim,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingActivity {
    id: String,
    user: String,
    #[serde(rename = "type")]
    kind: ActivityKind,
    amount: Amount,
    timestamp: Timestamp,
    transaction: String,
}

impl StakingActivity {
    pub fn new(
        id: impl Into<String>,
        user: &User,
        kind: ActivityKind,
        amount: Amount,
        timestamp: Timestamp,
        transaction: &Transaction,
    ) -> Self {
        Self {
            id: id.into(),
            user: user.id().to_string(),
            kind,
            amount,
            timestamp,
            transaction: transaction.id().to_string(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn kind(&self) -> ActivityKind {
        self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn transaction(&self) -> &str {
        &self.transaction
    }
}

impl Entity for StakingActivity {
    const KIND: EntityKind = EntityKind::StakingActivity;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    id: String,
    from: String,
    to: String,
    amount: Amount,
    timestamp: Timestamp,
    transaction: String,
}

impl Transfer {
    pub fn new(
        id: impl Into<String>,
        from: &User,
        to: &User,
        amount: Amount,
        timestamp: Timestamp,
        transaction: &Transaction,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.id().to_string(),
            to: to.id().to_string(),
            amount,
            timestamp,
            transaction: transaction.id().to_string(),
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn transaction(&self) -> &str {
        &self.transaction
    }
}

impl Entity for Transfer {
    const KIND: EntityKind = EntityKind::Transfer;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Protocol-wide aggregate, stored once under [`GLOBAL_STATS_ID`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    id: String,
    total_token_supply: SignedAmount,
    total_staked: SignedAmount,
    total_rewards_paid: Amount,
    /// Empty until the first Staked event.
    staking_contract_address: String,
    /// Empty until the first Staked event.
    token_contract_address: String,
    reward_rate: Amount,
    updated_at: Timestamp,
}

impl GlobalStats {
    pub fn new() -> Self {
        Self {
            id: GLOBAL_STATS_ID.to_string(),
            total_token_supply: SignedAmount::ZERO,
            total_staked: SignedAmount::ZERO,
            total_rewards_paid: Amount::ZERO,
            staking_contract_address: String::new(),
            token_contract_address: String::new(),
            reward_rate: Amount::ZERO,
            updated_at: Timestamp(0),
        }
    }

    pub fn total_token_supply(&self) -> SignedAmount {
        self.total_token_supply
    }

    pub fn total_staked(&self) -> SignedAmount {
        self.total_staked
    }

    pub fn total_rewards_paid(&self) -> Amount {
        self.total_rewards_paid
    }

    pub fn staking_contract_address(&self) -> &str {
        &self.staking_contract_address
    }

    pub fn token_contract_address(&self) -> &str {
        &self.token_contract_address
    }

    pub fn reward_rate(&self) -> Amount {
        self.reward_rate
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn contracts_bound(&self) -> bool {
        !self.staking_contract_address.is_empty()
    }

    /// First write wins. Returns `false` (and changes nothing) once bound.
    pub fn bind_contracts(&mut self, staking: &str, token: &str) -> bool {
        if self.contracts_bound() {
            return false;
        }
        self.staking_contract_address = staking.to_string();
        self.token_contract_address = token.to_string();
        true
    }

    pub fn add_staked(&mut self, amount: Amount) -> Result<(), ArithmeticError> {
        self.total_staked = self.total_staked.checked_add_amount(amount)?;
        Ok(())
    }

    pub fn sub_staked(&mut self, amount: Amount) -> Result<(), ArithmeticError> {
        self.total_staked = self.total_staked.checked_sub_amount(amount)?;
        Ok(())
    }

    pub fn add_rewards_paid(&mut self, amount: Amount) -> Result<(), ArithmeticError> {
        self.total_rewards_paid = self.total_rewards_paid.checked_add(amount)?;
        Ok(())
    }

    pub fn mint_supply(&mut self, amount: Amount) -> Result<(), ArithmeticError> {
        self.total_token_supply = self.total_token_supply.checked_add_amount(amount)?;
        Ok(())
    }

    pub fn burn_supply(&mut self, amount: Amount) -> Result<(), ArithmeticError> {
        self.total_token_supply = self.total_token_supply.checked_sub_amount(amount)?;
        Ok(())
    }

    /// Overwrites; rates are configuration, not a running sum.
    pub fn set_reward_rate(&mut self, rate: Amount) {
        self.reward_rate = rate;
    }

    pub fn touch(&mut self, at: Timestamp) {
        self.updated_at = at;
    }
}

impl Default for GlobalStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for GlobalStats {
    const KIND: EntityKind = EntityKind::GlobalStats;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(v: u64) -> Amount {
        Amount::from_u64(v)
    }

    #[test]
    fn restake_refreshes_stake_clock() {
        let mut u = User::new("0xaa");
        u.stake(amt(10), Timestamp(100)).unwrap();
        u.stake(amt(5), Timestamp(200)).unwrap();
        assert_eq!(u.staked_at(), Some(Timestamp(200)));
        assert_eq!(u.staked_amount().to_string(), "15");
    }

    #[test]
    fn partial_withdraw_keeps_clock_full_withdraw_clears_it() {
        let mut u = User::new("0xaa");
        u.stake(amt(100), Timestamp(1000)).unwrap();
        u.withdraw(amt(40)).unwrap();
        assert_eq!(u.staked_at(), Some(Timestamp(1000)));
        u.withdraw(amt(60)).unwrap();
        assert!(u.staked_amount().is_zero());
        assert_eq!(u.staked_at(), None);
    }

    #[test]
    fn over_withdraw_goes_negative_without_clamping() {
        let mut u = User::new("0xaa");
        u.stake(amt(10), Timestamp(1)).unwrap();
        u.withdraw(amt(15)).unwrap();
        assert_eq!(u.staked_amount().to_string(), "-5");
        assert_eq!(u.staked_at(), Some(Timestamp(1)));
    }

    #[test]
    fn claim_accumulates_and_records_time() {
        let mut u = User::new("0xaa");
        assert_eq!(u.last_reward_claimed(), None);
        u.claim(amt(3), Timestamp(7)).unwrap();
        u.claim(amt(4), Timestamp(9)).unwrap();
        assert_eq!(u.total_rewards_claimed(), amt(7));
        assert_eq!(u.last_reward_claimed(), Some(Timestamp(9)));
    }

    #[test]
    fn contract_binding_is_first_write_wins() {
        let mut s = GlobalStats::new();
        assert!(!s.contracts_bound());
        assert!(s.bind_contracts("0xstaking", "0xtoken"));
        assert!(!s.bind_contracts("0xother", "0xother"));
        assert_eq!(s.staking_contract_address(), "0xstaking");
        assert_eq!(s.token_contract_address(), "0xtoken");
    }

    #[test]
    fn user_json_uses_camel_case_and_decimal_strings() {
        let mut u = User::new("0xaa");
        u.stake(amt(100), Timestamp(1000)).unwrap();
        let v = serde_json::to_value(&u).unwrap();
        assert_eq!(v["stakedAmount"], "100");
        assert_eq!(v["stakedAt"], "1000");
        assert_eq!(v["tokenBalance"], "0");
        assert!(v.get("lastRewardClaimed").is_none());
    }

    #[test]
    fn activity_kind_serializes_upper_case() {
        let json = serde_json::to_string(&ActivityKind::Withdraw).unwrap();
        assert_eq!(json, "\"WITHDRAW\"");
    }
}
